//! Grid plots of intermediate images, for checking each stage by eye.

use image::{imageops, DynamicImage, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of images per grid row
pub const COLUMNS: u32 = 3;

/// Spacing between grid cells and around the grid, in pixels
const GUTTER: u32 = 4;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("no images to plot")]
    Empty,

    #[error("failed to save plot to {}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Stores images and plots them in a single grid
#[derive(Debug, Default, Clone)]
pub struct ImagesPlotter {
    images: Vec<RgbImage>,
}

impl ImagesPlotter {
    pub fn new(images: Vec<RgbImage>) -> Self {
        Self { images }
    }

    /// Store a copy of the image, so later changes to it are not plotted
    pub fn push<I>(&mut self, image: &I)
    where
        I: Clone + Into<DynamicImage>,
    {
        self.images.push(to_rgb(image));
    }

    /// Replace the stored images
    pub fn load_list(&mut self, images: Vec<RgbImage>) {
        self.images = images;
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn render(&self) -> Result<RgbImage, PlotError> {
        compose_grid(&self.images.iter().collect::<Vec<_>>())
    }

    /// Render the grid and save it as an image file
    pub fn plot_images<P: AsRef<Path>>(&self, path: P) -> Result<(), PlotError> {
        save(&self.render()?, path.as_ref())
    }
}

/// Stores images along with a title each and plots them in a single grid
#[derive(Debug, Default, Clone)]
pub struct TitledImagesPlotter {
    entries: Vec<(RgbImage, String)>,
}

impl TitledImagesPlotter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<I>(&mut self, image: &I, title: impl Into<String>)
    where
        I: Clone + Into<DynamicImage>,
    {
        self.entries.push((to_rgb(image), title.into()));
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, title)| title.as_str())
    }

    pub fn render(&self) -> Result<RgbImage, PlotError> {
        compose_grid(&self.entries.iter().map(|(image, _)| image).collect::<Vec<_>>())
    }

    /// Render the grid, save it and log which cell holds which title
    pub fn plot_images<P: AsRef<Path>>(&self, path: P) -> Result<(), PlotError> {
        let path = path.as_ref();
        save(&self.render()?, path)?;

        for (index, title) in self.titles().enumerate() {
            let index = index as u32;
            tracing::info!(
                "{}: row {}, column {}: {}",
                path.display(),
                index / COLUMNS,
                index % COLUMNS,
                title
            );
        }
        Ok(())
    }
}

fn to_rgb<I>(image: &I) -> RgbImage
where
    I: Clone + Into<DynamicImage>,
{
    image.clone().into().to_rgb8()
}

/// Lay images out row-major, each top-left aligned in a cell as large as the
/// largest image, on a white canvas
fn compose_grid(images: &[&RgbImage]) -> Result<RgbImage, PlotError> {
    if images.is_empty() {
        return Err(PlotError::Empty);
    }

    let cell_width = images.iter().map(|image| image.width()).max().unwrap_or(0);
    let cell_height = images.iter().map(|image| image.height()).max().unwrap_or(0);
    let rows = (images.len() as u32).div_ceil(COLUMNS);

    let width = COLUMNS * cell_width + (COLUMNS + 1) * GUTTER;
    let height = rows * cell_height + (rows + 1) * GUTTER;
    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));

    for (index, image) in images.iter().enumerate() {
        let index = index as u32;
        let x = GUTTER + (index % COLUMNS) * (cell_width + GUTTER);
        let y = GUTTER + (index / COLUMNS) * (cell_height + GUTTER);
        imageops::replace(&mut canvas, *image, x as i64, y as i64);
    }

    Ok(canvas)
}

fn save(canvas: &RgbImage, path: &Path) -> Result<(), PlotError> {
    canvas.save(path).map_err(|source| PlotError::Save {
        path: path.to_path_buf(),
        source,
    })
}
