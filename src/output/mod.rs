mod directory;

pub use directory::ImageDirectoryOutput;

use anyhow::Result;
use image::RgbImage;

/// Trait for output destinations
pub trait OutputSink {
    /// Write a frame to the output
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;

    /// Number of frames written so far
    fn frames_written(&self) -> usize;
}
