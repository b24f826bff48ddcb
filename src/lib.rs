//! Marker-controlled watershed segmentation of video frames.
//!
//! Each frame is reduced to a black (object, pedestal and table) and white
//! (background) image. [`segmentation::WatershedSegmenter`] runs the pipeline,
//! [`dispatch`] spreads frames over a worker pool and [`plotter`] lays
//! intermediate images out in a grid for inspection.

pub mod capture;
pub mod dispatch;
pub mod output;
pub mod plotter;
pub mod segmentation;
