use crate::segmentation::SegmentationModel;
use anyhow::{Context, Result};
use image::RgbImage;
use rayon::prelude::*;

/// Segment every frame on the global rayon pool
///
/// Outputs come back in input order.
pub fn segment_frames<S>(frames: Vec<RgbImage>, segmenter: &S) -> Vec<RgbImage>
where
    S: SegmentationModel + Sync,
{
    let _span = tracing::debug_span!("dispatch", frames = frames.len()).entered();
    frames
        .into_par_iter()
        .map(|frame| segmenter.segment(frame))
        .collect()
}

/// Segment every frame on a dedicated pool of `threads` workers
pub fn segment_frames_with_threads<S>(
    frames: Vec<RgbImage>,
    segmenter: &S,
    threads: usize,
) -> Result<Vec<RgbImage>>
where
    S: SegmentationModel + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Failed to build worker pool")?;
    tracing::debug!("Dispatching {} frames on {} workers", frames.len(), threads);

    Ok(pool.install(|| segment_frames(frames, segmenter)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::{ObjectCategory, WatershedSegmenter};
    use image::Rgb;

    /// Stamps each frame's first pixel value into the whole output
    struct Stamp;

    impl SegmentationModel for Stamp {
        fn segment(&self, frame: RgbImage) -> RgbImage {
            let value = *frame.get_pixel(0, 0);
            RgbImage::from_pixel(frame.width(), frame.height(), value)
        }
    }

    fn indexed_frames(count: u8) -> Vec<RgbImage> {
        (0..count)
            .map(|i| RgbImage::from_pixel(3, 2, Rgb([i, 0, 0])))
            .collect()
    }

    #[test]
    fn test_outputs_keep_input_order() {
        let outputs = segment_frames(indexed_frames(50), &Stamp);
        assert_eq!(outputs.len(), 50);
        for (i, output) in outputs.iter().enumerate() {
            assert_eq!(output.get_pixel(2, 1)[0], i as u8);
        }
    }

    #[test]
    fn test_dedicated_pool_matches_sequential() {
        let segmenter = WatershedSegmenter::new(ObjectCategory(0));
        let frames: Vec<RgbImage> = (0..6u32)
            .map(|i| {
                RgbImage::from_fn(32, 24, |x, y| {
                    if x > 8 + i && x < 24 && y > 6 && y < 18 {
                        Rgb([40, 50, 60])
                    } else {
                        Rgb([220, 210, 200])
                    }
                })
            })
            .collect();
        let sequential: Vec<RgbImage> = frames
            .iter()
            .cloned()
            .map(|frame| segmenter.segment(frame))
            .collect();

        let parallel = segment_frames_with_threads(frames, &segmenter, 3).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_no_frames() {
        assert!(segment_frames(Vec::new(), &Stamp).is_empty());
    }
}
