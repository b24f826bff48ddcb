use super::flood;
use super::markers::{distance_map, seed_markers, sure_foreground, unknown_region};
use super::preprocess::Preprocessor;
use super::trace::SegmentationTrace;
use super::types::{
    Frame, MarkerMap, ObjectCategory, SegmentationModel, SegmenterConfig, ThresholdPolicy,
    BACKGROUND, BLACK, WHITE,
};
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology;

/// Marker-controlled watershed segmenter
///
/// Separates the object, its pedestal and the table (black) from the upper
/// background (white). The configuration is fixed at construction, so a
/// single instance can be shared by reference across worker threads.
#[derive(Debug, Clone)]
pub struct WatershedSegmenter {
    config: SegmenterConfig,
}

impl WatershedSegmenter {
    /// Create a segmenter for frames of the given object category
    pub fn new(category: ObjectCategory) -> Self {
        Self::with_config(SegmenterConfig::for_category(category))
    }

    pub fn with_config(config: SegmenterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    fn preprocessor(&self) -> Preprocessor {
        Preprocessor::new(self.config.contrast_gain, self.config.threshold)
    }

    /// Segment a frame, keeping every intermediate image
    pub fn segment_traced(&self, mut frame: Frame) -> SegmentationTrace {
        let _span = tracing::debug_span!("watershed_segment").entered();

        if frame.width() == 0 || frame.height() == 0 {
            let level = match self.config.threshold {
                ThresholdPolicy::Manual(level) => level,
                ThresholdPolicy::Otsu => 0,
            };
            return SegmentationTrace::empty(frame, level);
        }

        let preprocessor = self.preprocessor();
        let gray = Preprocessor::to_gray(&frame);
        let stretched = preprocessor.stretch_contrast(&gray);
        let (threshold_level, binary) = preprocessor.binarize(&stretched);

        let distances = distance_map(&binary);
        let sure = sure_foreground(&distances, self.config.sure_foreground_ratio);
        let unknown = unknown_region(&binary, &sure);

        let seeds = seed_markers(&sure, &unknown);
        let mut flooded = seeds.clone();
        flood::watershed(&frame, &mut flooded);

        let mask = open_background(&flooded);
        for (x, y, pixel) in frame.enumerate_pixels_mut() {
            *pixel = if mask.get_pixel(x, y)[0] > 0 { WHITE } else { BLACK };
        }

        SegmentationTrace {
            gray,
            stretched,
            threshold_level,
            binary,
            distances,
            sure_foreground: sure,
            unknown,
            seeds,
            flooded,
            output: frame,
        }
    }
}

impl SegmentationModel for WatershedSegmenter {
    fn segment(&self, frame: Frame) -> Frame {
        self.segment_traced(frame).output
    }
}

/// Segment a single frame of the given object category
pub fn watershed_segmentation(frame: Frame, category: ObjectCategory) -> Frame {
    WatershedSegmenter::new(category).segment(frame)
}

/// Background/boundary mask of the flooded markers after a 3x3 opening
fn open_background(markers: &MarkerMap) -> GrayImage {
    let _span = tracing::debug_span!("opening").entered();

    let (height, width) = markers.dim();
    let background = GrayImage::from_fn(width as u32, height as u32, |x, y| {
        if markers[[y as usize, x as usize]] <= BACKGROUND {
            Luma([255])
        } else {
            Luma([0])
        }
    });

    // An L-infinity ball of radius 1 is the 3x3 all-ones element.
    morphology::open(&background, Norm::LInf, 1)
}
