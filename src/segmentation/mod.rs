mod flood;
mod markers;
mod preprocess;
mod trace;
pub mod types;
mod watershed;

pub use trace::SegmentationTrace;
pub use types::{ObjectCategory, SegmentationModel, SegmenterConfig, ThresholdPolicy};
pub use watershed::{watershed_segmentation, WatershedSegmenter};

/// Create the segmenter for a category, optionally overriding its tuning
pub fn create_segmenter(
    category: ObjectCategory,
    contrast_gain: Option<f32>,
    sure_foreground_ratio: Option<f32>,
    manual_threshold: Option<u8>,
) -> WatershedSegmenter {
    let defaults = SegmenterConfig::for_category(category);
    let config = SegmenterConfig {
        contrast_gain: contrast_gain.unwrap_or(defaults.contrast_gain),
        sure_foreground_ratio: sure_foreground_ratio.unwrap_or(defaults.sure_foreground_ratio),
        threshold: manual_threshold.map_or(defaults.threshold, ThresholdPolicy::Manual),
    };
    tracing::debug!("Segmenter config for category {}: {:?}", category.0, config);
    WatershedSegmenter::with_config(config)
}
