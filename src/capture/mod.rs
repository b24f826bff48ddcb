mod sequence;

pub use sequence::ImageSequence;

use anyhow::Result;
use image::RgbImage;

/// Trait for frame sources
pub trait FrameSource {
    /// Decode the next frame, or `None` once the source is exhausted
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;

    /// Total number of frames the source yields
    fn frame_count(&self) -> usize;

    /// Read every remaining frame, in order
    fn collect_frames(&mut self) -> Result<Vec<RgbImage>> {
        let mut frames = Vec::with_capacity(self.frame_count());
        while let Some(frame) = self.next_frame()? {
            frames.push(frame);
        }
        Ok(frames)
    }
}
