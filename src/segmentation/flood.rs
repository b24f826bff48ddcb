use super::types::{MarkerMap, BOUNDARY, UNKNOWN};
use image::{Rgb, RgbImage};
use std::collections::VecDeque;

/// Internal state of an unknown pixel already waiting in a queue
const IN_QUEUE: i32 = -2;

/// Colour distance used as flooding priority
fn color_distance(a: &Rgb<u8>, b: &Rgb<u8>) -> u8 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&p, &q)| p.abs_diff(q))
        .max()
        .unwrap_or(0)
}

/// 4-connected neighbours inside the frame
fn neighbors(x: usize, y: usize, width: usize, height: usize) -> impl Iterator<Item = (usize, usize)> {
    let left = x.checked_sub(1).map(|nx| (nx, y));
    let right = (x + 1 < width).then(|| (x + 1, y));
    let up = y.checked_sub(1).map(|ny| (x, ny));
    let down = (y + 1 < height).then(|| (x, y + 1));
    [left, right, up, down].into_iter().flatten()
}

/// Bucketed priority queue with one FIFO per 8-bit priority
struct FloodQueue {
    buckets: Vec<VecDeque<(usize, usize)>>,
    lowest: usize,
}

impl FloodQueue {
    fn new() -> Self {
        Self {
            buckets: vec![VecDeque::new(); 256],
            lowest: 256,
        }
    }

    fn push(&mut self, priority: u8, pixel: (usize, usize)) {
        let priority = priority as usize;
        self.buckets[priority].push_back(pixel);
        self.lowest = self.lowest.min(priority);
    }

    fn pop(&mut self) -> Option<(usize, usize)> {
        while self.lowest < self.buckets.len() {
            if let Some(pixel) = self.buckets[self.lowest].pop_front() {
                return Some(pixel);
            }
            self.lowest += 1;
        }
        None
    }
}

/// Marker-controlled watershed flooding
///
/// Grows every positive label in `markers` into the unknown (0) pixels,
/// cheapest colour step first. Pixels reached by two different labels become
/// `-1`, as does the outermost one-pixel frame. Unknown pixels no seed can
/// reach stay 0.
pub fn watershed(frame: &RgbImage, markers: &mut MarkerMap) {
    let _span = tracing::debug_span!("watershed").entered();

    let (height, width) = markers.dim();
    debug_assert_eq!((width as u32, height as u32), frame.dimensions());
    if width == 0 || height == 0 {
        return;
    }

    for x in 0..width {
        markers[[0, x]] = BOUNDARY;
        markers[[height - 1, x]] = BOUNDARY;
    }
    for y in 0..height {
        markers[[y, 0]] = BOUNDARY;
        markers[[y, width - 1]] = BOUNDARY;
    }

    let pixel = |x: usize, y: usize| frame.get_pixel(x as u32, y as u32);
    let mut queue = FloodQueue::new();

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            if markers[[y, x]] != UNKNOWN {
                continue;
            }
            let priority = neighbors(x, y, width, height)
                .filter(|&(nx, ny)| markers[[ny, nx]] > 0)
                .map(|(nx, ny)| color_distance(pixel(x, y), pixel(nx, ny)))
                .min();
            if let Some(priority) = priority {
                markers[[y, x]] = IN_QUEUE;
                queue.push(priority, (x, y));
            }
        }
    }

    let mut flooded = 0usize;
    while let Some((x, y)) = queue.pop() {
        let mut label = UNKNOWN;
        for (nx, ny) in neighbors(x, y, width, height) {
            let neighbor = markers[[ny, nx]];
            if neighbor > 0 {
                if label == UNKNOWN {
                    label = neighbor;
                } else if label != neighbor {
                    label = BOUNDARY;
                }
            }
        }
        debug_assert_ne!(label, UNKNOWN, "queued pixel without a labelled neighbour");

        markers[[y, x]] = label;
        flooded += 1;
        if label == BOUNDARY {
            continue;
        }

        for (nx, ny) in neighbors(x, y, width, height) {
            if markers[[ny, nx]] == UNKNOWN {
                markers[[ny, nx]] = IN_QUEUE;
                queue.push(color_distance(pixel(x, y), pixel(nx, ny)), (nx, ny));
            }
        }
    }

    tracing::debug!("Flooded {} pixels", flooded);
}
