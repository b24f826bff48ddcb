use super::OutputSink;
use anyhow::{Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Writes frames as numbered PNG files into a directory
pub struct ImageDirectoryOutput {
    directory: PathBuf,
    written: usize,
}

impl ImageDirectoryOutput {
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref();
        tracing::info!("Writing segmented frames to {}", directory.display());

        std::fs::create_dir_all(directory).with_context(|| {
            format!("Failed to create output directory {}", directory.display())
        })?;

        Ok(Self {
            directory: directory.to_path_buf(),
            written: 0,
        })
    }

    fn frame_path(&self, index: usize) -> PathBuf {
        self.directory.join(format!("frame_{:06}.png", index))
    }
}

impl OutputSink for ImageDirectoryOutput {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        let path = self.frame_path(self.written);
        frame
            .save(&path)
            .with_context(|| format!("Failed to write frame to {}", path.display()))?;
        self.written += 1;
        Ok(())
    }

    fn frames_written(&self) -> usize {
        self.written
    }
}
