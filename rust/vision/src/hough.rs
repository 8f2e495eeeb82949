// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Progressive probabilistic Hough transform
//!
//! Foreground pixels are visited in a seeded random order. Each pixel votes
//! for every angle; as soon as one accumulator cell reaches the vote
//! threshold, the line through that pixel is walked in both directions over
//! the remaining foreground, bridging gaps up to `max_line_gap`. Walked pixels
//! are removed from further consideration, and when the segment is long
//! enough their votes are retracted so the same structure is not reported
//! twice.

use crate::config::HoughConfig;
use crate::image_ops::PAPER;
use crate::types::{DetectedLine, Point2D};
use image::GrayImage;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::f64::consts::PI;

/// Fixed-point precision used while stepping along a line
const SHIFT: u32 = 16;

/// Detect line segments in a binary image
///
/// Returns segments in pixel coordinates, in detection order. The result is
/// fully determined by the image and `config` (including `config.seed`).
pub fn detect_line_segments(binary: &GrayImage, config: &HoughConfig) -> Vec<DetectedLine> {
    let width = binary.width() as i64;
    let height = binary.height() as i64;
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let accumulator = Accumulator::new(width, height, config);
    let mut state = SearchState {
        accumulator,
        mask: vec![false; (width * height) as usize],
        width,
        height,
    };

    // Collect foreground points
    let mut points: Vec<(i64, i64)> = Vec::new();
    for (x, y, pixel) in binary.enumerate_pixels() {
        if pixel.0[0] != PAPER {
            points.push((x as i64, y as i64));
            state.mask[(y as i64 * width + x as i64) as usize] = true;
        }
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    points.shuffle(&mut rng);

    let threshold = config.threshold.min(i32::MAX as u32) as i32;
    let mut lines = Vec::new();

    for &(px, py) in &points {
        if !state.is_set(px, py) {
            continue;
        }

        let (max_votes, max_n) = state.accumulator.vote(px, py);
        if max_votes < threshold {
            continue;
        }

        let walk = LineWalk::new(px, py, state.accumulator.trig[max_n]);
        let line_end = state.find_extent(&walk, config.max_line_gap);

        let good_line = ((line_end[1].0 - line_end[0].0).abs() as f64) >= config.min_line_length
            || ((line_end[1].1 - line_end[0].1).abs() as f64) >= config.min_line_length;

        state.clear_walked(&walk, &line_end, good_line);

        if good_line {
            lines.push(DetectedLine::new(
                Point2D::new(line_end[0].0 as f64, line_end[0].1 as f64),
                Point2D::new(line_end[1].0 as f64, line_end[1].1 as f64),
            ));
            if config.max_lines.is_some_and(|cap| lines.len() >= cap) {
                break;
            }
        }
    }

    lines
}

/// Vote table over (angle, rho) cells
struct Accumulator {
    /// Per-angle (cos, sin), pre-divided by the rho resolution
    trig: Vec<(f64, f64)>,
    num_rhos: usize,
    rho_offset: i64,
    cells: Vec<i32>,
}

impl Accumulator {
    fn new(width: i64, height: i64, config: &HoughConfig) -> Self {
        let irho = 1.0 / config.rho;
        let num_angles = ((PI / config.theta).round() as usize).max(1);
        let num_rhos = ((((width + height) * 2 + 1) as f64 / config.rho).round() as usize).max(1);

        let trig = (0..num_angles)
            .map(|n| {
                let angle = n as f64 * config.theta;
                (angle.cos() * irho, angle.sin() * irho)
            })
            .collect();

        Self {
            trig,
            num_rhos,
            rho_offset: ((num_rhos - 1) / 2) as i64,
            cells: vec![0; num_angles * num_rhos],
        }
    }

    fn cell_index(&self, n: usize, x: i64, y: i64) -> Option<usize> {
        let (cos_t, sin_t) = self.trig[n];
        let r = (x as f64 * cos_t + y as f64 * sin_t).round() as i64 + self.rho_offset;
        if r < 0 || r as usize >= self.num_rhos {
            return None;
        }
        Some(n * self.num_rhos + r as usize)
    }

    /// Add the votes of one point; returns the strongest cell it touched
    fn vote(&mut self, x: i64, y: i64) -> (i32, usize) {
        let mut max_votes = i32::MIN;
        let mut max_n = 0;

        for n in 0..self.trig.len() {
            if let Some(idx) = self.cell_index(n, x, y) {
                self.cells[idx] += 1;
                if self.cells[idx] > max_votes {
                    max_votes = self.cells[idx];
                    max_n = n;
                }
            }
        }

        (max_votes, max_n)
    }

    fn retract(&mut self, x: i64, y: i64) {
        for n in 0..self.trig.len() {
            if let Some(idx) = self.cell_index(n, x, y) {
                self.cells[idx] -= 1;
            }
        }
    }
}

/// Fixed-point stepping along a line through a seed pixel
///
/// The major axis advances one pixel per step; the minor axis accumulates a
/// fractional offset in `SHIFT`-bit fixed point.
struct LineWalk {
    x0: i64,
    y0: i64,
    dx: i64,
    dy: i64,
    x_major: bool,
}

impl LineWalk {
    fn new(px: i64, py: i64, (cos_t, sin_t): (f64, f64)) -> Self {
        // Direction vector along the line
        let a = -sin_t;
        let b = cos_t;
        let one = (1i64 << SHIFT) as f64;
        let half = 1i64 << (SHIFT - 1);

        if a.abs() > b.abs() {
            Self {
                x0: px,
                y0: (py << SHIFT) + half,
                dx: if a > 0.0 { 1 } else { -1 },
                dy: (b * one / a.abs()).round() as i64,
                x_major: true,
            }
        } else {
            Self {
                x0: (px << SHIFT) + half,
                y0: py,
                dx: (a * one / b.abs()).round() as i64,
                dy: if b > 0.0 { 1 } else { -1 },
                x_major: false,
            }
        }
    }

    fn step(&self, direction: usize) -> (i64, i64) {
        if direction == 0 {
            (self.dx, self.dy)
        } else {
            (-self.dx, -self.dy)
        }
    }

    fn pixel(&self, x: i64, y: i64) -> (i64, i64) {
        if self.x_major {
            (x, y >> SHIFT)
        } else {
            (x >> SHIFT, y)
        }
    }
}

struct SearchState {
    accumulator: Accumulator,
    /// Foreground pixels not yet consumed by a walk
    mask: Vec<bool>,
    width: i64,
    height: i64,
}

impl SearchState {
    fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    fn is_set(&self, x: i64, y: i64) -> bool {
        self.mask[(y * self.width + x) as usize]
    }

    /// Walk both ways from the seed and return the last foreground pixel
    /// reached in each direction
    fn find_extent(&self, walk: &LineWalk, max_gap: f64) -> [(i64, i64); 2] {
        let seed = walk.pixel(walk.x0, walk.y0);
        let mut line_end = [seed; 2];

        for (k, end) in line_end.iter_mut().enumerate() {
            let (dx, dy) = walk.step(k);
            let (mut x, mut y) = (walk.x0, walk.y0);
            let mut gap = 0u32;

            loop {
                let (j, i) = walk.pixel(x, y);
                if !self.in_bounds(j, i) {
                    break;
                }

                if self.is_set(j, i) {
                    gap = 0;
                    *end = (j, i);
                } else {
                    gap += 1;
                    if gap as f64 > max_gap {
                        break;
                    }
                }

                x += dx;
                y += dy;
            }
        }

        line_end
    }

    /// Consume the pixels between the seed and each end point
    fn clear_walked(&mut self, walk: &LineWalk, line_end: &[(i64, i64); 2], retract: bool) {
        for (k, &end) in line_end.iter().enumerate() {
            let (dx, dy) = walk.step(k);
            let (mut x, mut y) = (walk.x0, walk.y0);

            loop {
                let (j, i) = walk.pixel(x, y);
                if !self.in_bounds(j, i) {
                    break;
                }

                let idx = (i * self.width + j) as usize;
                if self.mask[idx] {
                    if retract {
                        self.accumulator.retract(j, i);
                    }
                    self.mask[idx] = false;
                }

                if (j, i) == end {
                    break;
                }

                x += dx;
                y += dy;
            }
        }
    }
}
