use super::types::ThresholdPolicy;
use image::{GrayImage, Luma, RgbImage};
use imageproc::contrast::otsu_level;

/// Foreground value of the binarized frame
pub const FOREGROUND: u8 = 255;

/// Preprocessor turning a colour frame into a binary foreground mask
#[derive(Debug, Clone)]
pub struct Preprocessor {
    contrast_gain: f32,
    threshold: ThresholdPolicy,
}

impl Preprocessor {
    pub fn new(contrast_gain: f32, threshold: ThresholdPolicy) -> Self {
        Self {
            contrast_gain,
            threshold,
        }
    }

    /// Convert an RGB frame to intensity with BT.601 luma weights
    pub fn to_gray(frame: &RgbImage) -> GrayImage {
        let _span = tracing::debug_span!("grayscale").entered();

        let (width, height) = frame.dimensions();
        GrayImage::from_fn(width, height, |x, y| {
            let pixel = frame.get_pixel(x, y);
            Luma([luma(pixel[0], pixel[1], pixel[2])])
        })
    }

    /// Linear contrast stretch: `gray * gain`, clamped and truncated to 8 bits
    pub fn stretch_contrast(&self, gray: &GrayImage) -> GrayImage {
        let _span = tracing::debug_span!("contrast").entered();

        let (width, height) = gray.dimensions();
        GrayImage::from_fn(width, height, |x, y| {
            let value = gray.get_pixel(x, y)[0] as f32 * self.contrast_gain;
            Luma([value.clamp(0.0, 255.0) as u8])
        })
    }

    /// Threshold level for this gray frame under the configured policy
    pub fn threshold_level(&self, gray: &GrayImage) -> u8 {
        match self.threshold {
            ThresholdPolicy::Manual(level) => level,
            ThresholdPolicy::Otsu => otsu_level(gray),
        }
    }

    /// Inverted binarization: pixels above the level become 0, the rest 255
    ///
    /// Returns the level used together with the mask.
    pub fn binarize(&self, gray: &GrayImage) -> (u8, GrayImage) {
        let _span = tracing::debug_span!("threshold").entered();

        let level = self.threshold_level(gray);
        tracing::debug!("Threshold {:?} resolved to level {}", self.threshold, level);

        let mask = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            if gray.get_pixel(x, y)[0] > level {
                Luma([0])
            } else {
                Luma([FOREGROUND])
            }
        });

        (level, mask)
    }
}

/// BT.601 luma, rounded to the nearest integer
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    y.round().clamp(0.0, 255.0) as u8
}
