use super::preprocess::FOREGROUND;
use super::types::{DistanceMap, MarkerMap, BACKGROUND, UNKNOWN};
use image::{GrayImage, Luma};
use imageproc::distance_transform::euclidean_squared_distance_transform;
use imageproc::region_labelling::{connected_components, Connectivity};

/// Euclidean distance from each foreground pixel to the nearest background pixel
///
/// Distances are exact, not the 5x5 chamfer approximation, so pixels lying
/// right on the sure-foreground cut may fall on the other side of it.
///
/// Background pixels map to 0. Pixels outside the frame do not count as
/// background, so a mask with no background at all is uniformly farther away
/// than any in-frame distance: every pixel gets the frame diagonal.
pub fn distance_map(binary: &GrayImage) -> DistanceMap {
    let _span = tracing::debug_span!("distance_transform").entered();

    let (width, height) = binary.dimensions();
    let mut distances = DistanceMap::zeros((height as usize, width as usize));

    if !binary.pixels().any(|p| p[0] != FOREGROUND) {
        let unbounded = (width as f32).hypot(height as f32);
        tracing::debug!("No background pixel, all distances set to {:.2}", unbounded);
        distances.fill(unbounded);
        return distances;
    }

    // imageproc measures distance to the nearest non-zero pixel, so feed it
    // the background as the non-zero set.
    let background = GrayImage::from_fn(width, height, |x, y| {
        if binary.get_pixel(x, y)[0] == FOREGROUND {
            Luma([0])
        } else {
            Luma([255])
        }
    });
    let squared = euclidean_squared_distance_transform(&background);

    for (x, y, pixel) in squared.enumerate_pixels() {
        distances[[y as usize, x as usize]] = pixel[0].sqrt() as f32;
    }

    distances
}

/// Pixels whose distance exceeds `ratio` of the maximum distance
///
/// A zero maximum gives a zero cut, which no pixel exceeds.
pub fn sure_foreground(distances: &DistanceMap, ratio: f32) -> GrayImage {
    let _span = tracing::debug_span!("sure_foreground").entered();

    let max = distances.iter().copied().fold(0.0f32, f32::max);
    let cut = ratio * max;
    tracing::debug!("Sure foreground cut at {:.2} (max distance {:.2})", cut, max);

    let (height, width) = distances.dim();
    GrayImage::from_fn(width as u32, height as u32, |x, y| {
        if distances[[y as usize, x as usize]] > cut {
            Luma([FOREGROUND])
        } else {
            Luma([0])
        }
    })
}

/// Foreground pixels that are not sure foreground
pub fn unknown_region(binary: &GrayImage, sure: &GrayImage) -> GrayImage {
    GrayImage::from_fn(binary.width(), binary.height(), |x, y| {
        Luma([binary.get_pixel(x, y)[0].saturating_sub(sure.get_pixel(x, y)[0])])
    })
}

/// Seed markers for flooding
///
/// Sure-foreground components get labels from 2 upwards, everything else 1,
/// then the unknown region is cleared back to 0.
pub fn seed_markers(sure: &GrayImage, unknown: &GrayImage) -> MarkerMap {
    let _span = tracing::debug_span!("markers").entered();

    let components = connected_components(sure, Connectivity::Eight, Luma([0u8]));
    let (width, height) = sure.dimensions();
    let mut markers = MarkerMap::zeros((height as usize, width as usize));

    let mut components_found = 0;
    for (x, y, label) in components.enumerate_pixels() {
        let label = label[0] as i32;
        components_found = components_found.max(label);
        markers[[y as usize, x as usize]] = if unknown.get_pixel(x, y)[0] == FOREGROUND {
            UNKNOWN
        } else {
            label + BACKGROUND
        };
    }
    tracing::debug!("Found {} sure foreground components", components_found);

    markers
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 30x30 frame with a filled foreground disk of radius 10 and a lone
    /// foreground pixel in the corner
    fn disk_mask() -> GrayImage {
        GrayImage::from_fn(30, 30, |x, y| {
            let dx = x as f32 - 15.0;
            let dy = y as f32 - 15.0;
            if dx * dx + dy * dy <= 100.0 || (x, y) == (1, 1) {
                Luma([FOREGROUND])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn test_distance_to_nearest_background() {
        let mask = GrayImage::from_fn(7, 1, |x, _| {
            if x == 0 || x == 6 {
                Luma([0])
            } else {
                Luma([FOREGROUND])
            }
        });
        let distances = distance_map(&mask);
        let row: Vec<f32> = distances.row(0).to_vec();
        assert_eq!(row, vec![0.0, 1.0, 2.0, 3.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_distance_without_background_is_uniform_and_positive() {
        let mask = GrayImage::from_pixel(8, 6, Luma([FOREGROUND]));
        let distances = distance_map(&mask);
        assert_eq!(distances.dim(), (6, 8));
        assert!(distances.iter().all(|&d| (d - 10.0).abs() < 1e-4));
    }

    #[test]
    fn test_all_foreground_mask_is_one_sure_component() {
        let mask = GrayImage::from_pixel(8, 6, Luma([FOREGROUND]));
        let sure = sure_foreground(&distance_map(&mask), 0.75);
        let unknown = unknown_region(&mask, &sure);
        let markers = seed_markers(&sure, &unknown);

        assert!(sure.pixels().all(|p| p[0] == FOREGROUND));
        assert!(unknown.pixels().all(|p| p[0] == 0));
        assert!(markers.iter().all(|&label| label == 2));
    }

    #[test]
    fn test_all_background_mask_has_zero_distances() {
        let distances = distance_map(&GrayImage::new(8, 6));
        assert!(distances.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_zero_max_distance_gives_empty_sure_foreground() {
        let distances = DistanceMap::zeros((6, 4));
        let sure = sure_foreground(&distances, 0.75);
        assert_eq!(sure.dimensions(), (4, 6));
        assert!(sure.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_sure_foreground_is_subset_and_unknown_is_difference() {
        let mask = disk_mask();
        let sure = sure_foreground(&distance_map(&mask), 0.75);
        let unknown = unknown_region(&mask, &sure);

        assert!(sure.pixels().any(|p| p[0] == FOREGROUND));
        for (x, y, pixel) in mask.enumerate_pixels() {
            let in_mask = pixel[0] == FOREGROUND;
            let in_sure = sure.get_pixel(x, y)[0] == FOREGROUND;
            let in_unknown = unknown.get_pixel(x, y)[0] == FOREGROUND;
            assert!(!in_sure || in_mask, "sure pixel ({}, {}) outside mask", x, y);
            assert_eq!(in_unknown, in_mask && !in_sure, "pixel ({}, {})", x, y);
        }
        // The lone corner pixel is one pixel from the background: never sure.
        assert_eq!(sure.get_pixel(1, 1)[0], 0);
        assert_eq!(unknown.get_pixel(1, 1)[0], FOREGROUND);
    }

    #[test]
    fn test_seed_markers_partition() {
        let mask = disk_mask();
        let sure = sure_foreground(&distance_map(&mask), 0.75);
        let unknown = unknown_region(&mask, &sure);
        let markers = seed_markers(&sure, &unknown);

        for (x, y, pixel) in mask.enumerate_pixels() {
            let label = markers[[y as usize, x as usize]];
            if sure.get_pixel(x, y)[0] == FOREGROUND {
                assert_eq!(label, 2, "sure pixel ({}, {})", x, y);
            } else if pixel[0] == FOREGROUND {
                assert_eq!(label, UNKNOWN);
            } else {
                assert_eq!(label, BACKGROUND);
            }
        }
    }

    #[test]
    fn test_separate_components_get_distinct_labels() {
        let sure = GrayImage::from_fn(10, 3, |x, y| {
            if y == 1 && (x == 1 || x == 2 || x == 7) {
                Luma([FOREGROUND])
            } else {
                Luma([0])
            }
        });
        let unknown = GrayImage::new(10, 3);
        let markers = seed_markers(&sure, &unknown);

        assert_eq!(markers[[1, 1]], markers[[1, 2]]);
        assert!(markers[[1, 1]] >= 2);
        assert!(markers[[1, 7]] >= 2);
        assert_ne!(markers[[1, 1]], markers[[1, 7]]);
        assert_eq!(markers[[0, 0]], BACKGROUND);
    }
}
