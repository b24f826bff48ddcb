use super::types::{DistanceMap, Frame, MarkerMap, BACKGROUND, BOUNDARY, UNKNOWN};
use crate::plotter::{PlotError, TitledImagesPlotter};
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::path::Path;

/// Every intermediate image of one watershed segmentation
#[derive(Debug, Clone)]
pub struct SegmentationTrace {
    pub gray: GrayImage,
    /// Gray frame after the linear contrast stretch
    pub stretched: GrayImage,
    /// Level the binarization used, whichever policy picked it
    pub threshold_level: u8,
    /// Inverted threshold: 255 where the stretched frame is at or below the level
    pub binary: GrayImage,
    pub distances: DistanceMap,
    pub sure_foreground: GrayImage,
    pub unknown: GrayImage,
    /// Markers handed to flooding
    pub seeds: MarkerMap,
    /// Markers after flooding, boundaries included
    pub flooded: MarkerMap,
    pub output: Frame,
}

impl SegmentationTrace {
    /// Trace of a frame with no pixels
    pub(crate) fn empty(output: Frame, threshold_level: u8) -> Self {
        Self {
            gray: GrayImage::new(0, 0),
            stretched: GrayImage::new(0, 0),
            threshold_level,
            binary: GrayImage::new(0, 0),
            distances: DistanceMap::zeros((0, 0)),
            sure_foreground: GrayImage::new(0, 0),
            unknown: GrayImage::new(0, 0),
            seeds: MarkerMap::zeros((0, 0)),
            flooded: MarkerMap::zeros((0, 0)),
            output,
        }
    }

    /// Stage images in pipeline order, titled
    pub fn stages(&self) -> TitledImagesPlotter {
        let mut plotter = TitledImagesPlotter::new();
        plotter.push(&self.gray, "gray");
        plotter.push(&self.stretched, "contrast");
        plotter.push(
            &self.binary,
            format!("threshold (level {})", self.threshold_level),
        );
        plotter.push(&distances_to_gray(&self.distances), "distance transform");
        plotter.push(&self.sure_foreground, "sure foreground");
        plotter.push(&self.unknown, "unknown");
        plotter.push(&markers_to_rgb(&self.seeds), "markers");
        plotter.push(&markers_to_rgb(&self.flooded), "watershed");
        plotter.push(&self.output, "output");
        plotter
    }

    pub fn plot_stages<P: AsRef<Path>>(&self, path: P) -> Result<(), PlotError> {
        self.stages().plot_images(path)
    }
}

/// Distance map scaled so its maximum is white
pub fn distances_to_gray(distances: &DistanceMap) -> GrayImage {
    let max = distances.iter().copied().fold(0.0f32, f32::max);
    let scale = if max > 0.0 { 255.0 / max } else { 0.0 };

    let (height, width) = distances.dim();
    GrayImage::from_fn(width as u32, height as u32, |x, y| {
        let value = distances[[y as usize, x as usize]] * scale;
        Luma([value.clamp(0.0, 255.0) as u8])
    })
}

/// False-colour rendering of a marker map
///
/// Unknown is black, background gray, boundaries red and each foreground
/// component gets its own hue.
pub fn markers_to_rgb(markers: &MarkerMap) -> RgbImage {
    let (height, width) = markers.dim();
    RgbImage::from_fn(width as u32, height as u32, |x, y| {
        match markers[[y as usize, x as usize]] {
            UNKNOWN => Rgb([0, 0, 0]),
            BACKGROUND => Rgb([128, 128, 128]),
            BOUNDARY => Rgb([255, 0, 0]),
            label => component_color(label),
        }
    })
}

fn component_color(label: i32) -> Rgb<u8> {
    // Golden-angle hue steps keep neighbouring labels apart.
    let hue = (label as f32 * 137.507_77) % 360.0;
    let sector = hue / 60.0;
    let fraction = sector.fract();
    let rising = (fraction * 255.0) as u8;
    let falling = 255 - rising;

    match sector as u32 {
        0 => Rgb([255, rising, 0]),
        1 => Rgb([falling, 255, 0]),
        2 => Rgb([0, 255, rising]),
        3 => Rgb([0, falling, 255]),
        4 => Rgb([rising, 0, 255]),
        _ => Rgb([255, 0, falling]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::types::ObjectCategory;
    use crate::segmentation::WatershedSegmenter;

    #[test]
    fn test_distances_scaled_to_full_range() {
        let mut distances = DistanceMap::zeros((1, 3));
        distances[[0, 1]] = 2.0;
        distances[[0, 2]] = 4.0;
        let gray = distances_to_gray(&distances);
        assert_eq!(gray.get_pixel(0, 0)[0], 0);
        assert_eq!(gray.get_pixel(1, 0)[0], 127);
        assert_eq!(gray.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_zero_distances_render_black() {
        let gray = distances_to_gray(&DistanceMap::zeros((2, 2)));
        assert!(gray.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_marker_colours() {
        let markers = MarkerMap::from_shape_vec((1, 5), vec![UNKNOWN, BACKGROUND, BOUNDARY, 2, 3])
            .unwrap();
        let rgb = markers_to_rgb(&markers);
        assert_eq!(*rgb.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*rgb.get_pixel(1, 0), Rgb([128, 128, 128]));
        assert_eq!(*rgb.get_pixel(2, 0), Rgb([255, 0, 0]));
        assert_ne!(rgb.get_pixel(3, 0), rgb.get_pixel(4, 0));
    }

    #[test]
    fn test_stages_cover_the_pipeline() {
        let frame = RgbImage::from_fn(40, 30, |x, _| {
            if x < 20 {
                Rgb([30, 30, 30])
            } else {
                Rgb([220, 220, 220])
            }
        });
        let trace = WatershedSegmenter::new(ObjectCategory(0)).segment_traced(frame);
        let stages = trace.stages();
        let titles: Vec<_> = stages.titles().collect();

        assert_eq!(titles.len(), 9);
        assert_eq!(titles[0], "gray");
        assert!(titles[2].contains(&trace.threshold_level.to_string()));
        assert_eq!(titles[8], "output");
        assert!(stages.render().is_ok());
    }
}
