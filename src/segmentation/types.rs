use image::{Rgb, RgbImage};
use ndarray::Array2;

/// Colour frame: 3 x 8-bit channels, dimensions fixed per input
pub type Frame = RgbImage;

/// Per-pixel distance to the nearest background pixel, indexed `[[y, x]]`
pub type DistanceMap = Array2<f32>;

/// Marker label for pixels not yet assigned to a region
pub const UNKNOWN: i32 = 0;
/// Marker label for the background region
pub const BACKGROUND: i32 = 1;
/// Marker label written by flooding where two regions meet
pub const BOUNDARY: i32 = -1;

/// Integer-labelled grid with the same spatial dimensions as the frame
///
/// Labels: 0 = unknown, 1 = background, >= 2 = candidate foreground
/// component, -1 = watershed boundary (after flooding only).
pub type MarkerMap = Array2<i32>;

/// Object category index reserved for the Toucan recording, whose dark beak
/// is lost by automatic thresholding
pub const TOUCAN_CATEGORY: ObjectCategory = ObjectCategory(1);

/// Fixed threshold used for the Toucan recording
pub const TOUCAN_MANUAL_THRESHOLD: u8 = 135;

/// Index of the video/object a frame comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectCategory(pub i32);

impl ObjectCategory {
    /// Threshold policy used for frames of this category
    pub fn threshold_policy(self) -> ThresholdPolicy {
        if self == TOUCAN_CATEGORY {
            ThresholdPolicy::Manual(TOUCAN_MANUAL_THRESHOLD)
        } else {
            ThresholdPolicy::Otsu
        }
    }
}

/// How the stretched gray frame is binarized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdPolicy {
    /// Level picked from the bimodal histogram (Otsu's method)
    Otsu,
    /// Fixed level
    Manual(u8),
}

/// Tunable constants of the watershed pipeline
///
/// The defaults were tuned on recordings of a handful of fixed objects on a
/// pedestal; other footage may need different values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmenterConfig {
    /// Linear gain applied to the gray frame (no offset)
    pub contrast_gain: f32,
    /// Fraction of the maximum distance above which a pixel is sure foreground
    pub sure_foreground_ratio: f32,
    pub threshold: ThresholdPolicy,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            contrast_gain: 1.2,
            sure_foreground_ratio: 0.75,
            threshold: ThresholdPolicy::Otsu,
        }
    }
}

impl SegmenterConfig {
    pub fn for_category(category: ObjectCategory) -> Self {
        Self {
            threshold: category.threshold_policy(),
            ..Self::default()
        }
    }
}

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Trait for frame segmenters
/// Lets the dispatcher run any segmenter across a worker pool
pub trait SegmentationModel {
    /// Consume a frame and return its binary segmentation
    ///
    /// # Returns
    /// * Frame of the same dimensions containing only white (background)
    ///   and black (object + pedestal + table) pixels
    fn segment(&self, frame: Frame) -> Frame;
}
