use super::FrameSource;
use anyhow::{bail, Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

const EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "tif", "tiff", "pnm", "ppm", "webp",
];

/// Frames read from image files, in file-name order
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    position: usize,
}

impl ImageSequence {
    /// Open a directory of frame images, or a single image file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let paths = if path.is_dir() {
            let mut paths = Vec::new();
            let entries = std::fs::read_dir(path)
                .with_context(|| format!("Failed to read frame directory {}", path.display()))?;
            for entry in entries {
                let entry_path = entry
                    .with_context(|| format!("Failed to list {}", path.display()))?
                    .path();
                if entry_path.is_file() && is_image(&entry_path) {
                    paths.push(entry_path);
                }
            }
            paths.sort();
            paths
        } else if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            bail!("No such frame file or directory: {}", path.display());
        };

        tracing::info!("Found {} frames in {}", paths.len(), path.display());

        Ok(Self { paths, position: 0 })
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(path) = self.paths.get(self.position) else {
            return Ok(None);
        };
        self.position += 1;

        let frame = image::open(path)
            .with_context(|| format!("Failed to decode frame {}", path.display()))?
            .to_rgb8();
        tracing::debug!("Decoded {} ({}x{})", path.display(), frame.width(), frame.height());

        Ok(Some(frame))
    }

    fn frame_count(&self) -> usize {
        self.paths.len()
    }
}
