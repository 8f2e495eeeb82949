// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outer contour extraction and polygon approximation

use crate::image_ops::PAPER;
use crate::types::{BoundingBox, Point2D};
use image::{imageops, GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};

/// Closed outer boundary of a foreground region, in pixel coordinates
///
/// Straight horizontal, vertical and diagonal runs are compressed to their
/// end points.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point2D>,
}

impl Contour {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    /// Inclusive pixel bounding box; `None` for an empty contour
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(BoundingBox::new(
            min_x as u32,
            min_y as u32,
            (max_x - min_x) as u32 + 1,
            (max_y - min_y) as u32 + 1,
        ))
    }

    /// Length of the closed boundary
    pub fn perimeter(&self) -> f64 {
        arc_length(&self.points, true)
    }

    /// Polygon approximation with tolerance `epsilon_fraction * perimeter`
    pub fn approximate_polygon(&self, epsilon_fraction: f64) -> Vec<Point2D> {
        approximate_closed_polygon(&self.points, epsilon_fraction * self.perimeter())
    }
}

/// Outermost contours of a binary image (holes and nested regions skipped)
///
/// Tracing runs inside a one-pixel paper border, so regions touching the
/// image edge still get an outer border. Points are shifted back to image
/// coordinates.
pub fn find_external_contours(binary: &GrayImage) -> Vec<Contour> {
    let padded = pad_with_paper(binary);

    find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            let points: Vec<Point2D> = c
                .points
                .iter()
                .map(|p| Point2D::new((p.x - 1) as f64, (p.y - 1) as f64))
                .collect();
            Contour::new(compress_chain(&points))
        })
        .filter(|c| !c.points.is_empty())
        .collect()
}

fn pad_with_paper(binary: &GrayImage) -> GrayImage {
    let mut padded =
        GrayImage::from_pixel(binary.width() + 2, binary.height() + 2, Luma([PAPER]));
    imageops::replace(&mut padded, binary, 1, 1);
    padded
}

/// Drop interior points of straight runs in a closed chain
pub fn compress_chain(points: &[Point2D]) -> Vec<Point2D> {
    let mut chain: Vec<Point2D> = Vec::with_capacity(points.len());
    for p in points {
        if chain.last() != Some(p) {
            chain.push(*p);
        }
    }
    while chain.len() > 1 && chain.first() == chain.last() {
        chain.pop();
    }

    let n = chain.len();
    if n < 3 {
        return chain;
    }

    // f64::signum maps 0.0 to 1.0, so compare explicitly
    let sign = |v: f64| (v > 0.0) as i8 - (v < 0.0) as i8;
    let step = |a: &Point2D, b: &Point2D| (sign(b.x - a.x), sign(b.y - a.y));

    (0..n)
        .filter(|&i| {
            let prev = &chain[(i + n - 1) % n];
            let next = &chain[(i + 1) % n];
            step(prev, &chain[i]) != step(&chain[i], next)
        })
        .map(|i| chain[i])
        .collect()
}

/// Polyline length, including the closing edge when `closed`
pub fn arc_length(points: &[Point2D], closed: bool) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    let open: f64 = points.windows(2).map(|w| w[0].distance_to(&w[1])).sum();

    if closed {
        open + points[points.len() - 1].distance_to(&points[0])
    } else {
        open
    }
}

/// Douglas-Peucker approximation of a closed curve
///
/// The curve is split at an approximately farthest pair of points, each half
/// is simplified as an open chain, and vertices that end up nearly collinear
/// with their neighbors are removed in a final pass.
pub fn approximate_closed_polygon(points: &[Point2D], epsilon: f64) -> Vec<Point2D> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    // Approximate the two farthest points by repeated farthest-point search
    let mut start = 0;
    let mut offset = 0;
    let mut max_dist_sq = 0.0;
    for _ in 0..3 {
        start = (start + offset) % n;
        max_dist_sq = 0.0;
        offset = 0;
        for j in 1..n {
            let p = &points[(start + j) % n];
            let d = p.distance_to(&points[start]);
            if d * d > max_dist_sq {
                max_dist_sq = d * d;
                offset = j;
            }
        }
    }

    if max_dist_sq <= epsilon * epsilon {
        return vec![points[start]];
    }

    let split = (start + offset) % n;
    let first_half = cyclic_chain(points, start, split);
    let second_half = cyclic_chain(points, split, start);

    let mut polygon = simplify_open_chain(&first_half, epsilon);
    polygon.pop();
    let mut rest = simplify_open_chain(&second_half, epsilon);
    rest.pop();
    polygon.extend(rest);

    remove_collinear(polygon, epsilon)
}

/// Points from `from` to `to` inclusive, wrapping around the end
fn cyclic_chain(points: &[Point2D], from: usize, to: usize) -> Vec<Point2D> {
    let n = points.len();
    let len = (to + n - from) % n + 1;
    (0..len).map(|k| points[(from + k) % n]).collect()
}

/// Simplify an open chain, keeping both end points
///
/// A range whose farthest interior point lies within `epsilon` of its chord
/// collapses to its end points; otherwise it splits at that point.
fn simplify_open_chain(chain: &[Point2D], epsilon: f64) -> Vec<Point2D> {
    let n = chain.len();
    if n < 3 {
        return chain.to_vec();
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut ranges = vec![(0, n - 1)];
    while let Some((first, last)) = ranges.pop() {
        if last - first < 2 {
            continue;
        }

        let (farthest, dist) = (first + 1..last)
            .map(|i| (i, distance_to_chord(&chain[i], &chain[first], &chain[last])))
            .fold((first, -1.0), |best, candidate| {
                if candidate.1 > best.1 {
                    candidate
                } else {
                    best
                }
            });

        if dist > epsilon {
            keep[farthest] = true;
            ranges.push((first, farthest));
            ranges.push((farthest, last));
        }
    }

    chain
        .iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(*p))
        .collect()
}

/// Single cyclic pass removing vertices within `epsilon / sqrt(2)` of the
/// line through their neighbors
fn remove_collinear(mut polygon: Vec<Point2D>, epsilon: f64) -> Vec<Point2D> {
    let mut i = 0;
    while polygon.len() > 2 && i < polygon.len() {
        let n = polygon.len();
        let prev = polygon[(i + n - 1) % n];
        let next = polygon[(i + 1) % n];
        let dist = distance_to_chord(&polygon[i], &prev, &next);

        if prev != next && dist * dist <= 0.5 * epsilon * epsilon {
            polygon.remove(i);
        } else {
            i += 1;
        }
    }
    polygon
}

/// Distance from `p` to the infinite line through `a` and `b`
fn distance_to_chord(p: &Point2D, a: &Point2D, b: &Point2D) -> f64 {
    let origin = a.to_nalgebra();
    let chord = b.to_nalgebra() - origin;
    let offset = p.to_nalgebra() - origin;

    let length = chord.norm();
    if length < 1e-10 {
        return offset.norm();
    }
    chord.perp(&offset).abs() / length
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_ops::{INK, PAPER};
    use image::Luma;

    fn fill_rect(img: &mut GrayImage, x: u32, y: u32, w: u32, h: u32) {
        for yy in y..y + h {
            for xx in x..x + w {
                img.put_pixel(xx, yy, Luma([INK]));
            }
        }
    }

    #[test]
    fn test_rectangle_contour_compresses_to_corners() {
        let mut img = GrayImage::from_pixel(60, 60, Luma([PAPER]));
        fill_rect(&mut img, 10, 10, 30, 20);

        let contours = find_external_contours(&img);

        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points.len(), 4);
        assert_eq!(
            contours[0].bounding_box(),
            Some(BoundingBox::new(10, 10, 30, 20))
        );
        assert!((contours[0].perimeter() - 96.0).abs() < 1e-9);
        assert_eq!(contours[0].approximate_polygon(0.02).len(), 4);
    }

    #[test]
    fn test_nested_regions_are_skipped() {
        let mut img = GrayImage::from_pixel(80, 80, Luma([PAPER]));
        // Hollow square with a blob inside the hole
        fill_rect(&mut img, 10, 10, 60, 60);
        for y in 15..65 {
            for x in 15..65 {
                img.put_pixel(x, y, Luma([PAPER]));
            }
        }
        fill_rect(&mut img, 30, 30, 10, 10);

        let contours = find_external_contours(&img);

        assert_eq!(contours.len(), 1);
        assert_eq!(
            contours[0].bounding_box(),
            Some(BoundingBox::new(10, 10, 60, 60))
        );
    }

    #[test]
    fn test_triangle_approximates_to_three_vertices() {
        let mut img = GrayImage::from_pixel(60, 60, Luma([PAPER]));
        for y in 0..40 {
            for x in 0..=y {
                img.put_pixel(10 + x, 10 + y, Luma([INK]));
            }
        }

        let contours = find_external_contours(&img);

        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].approximate_polygon(0.02).len(), 3);
    }

    #[test]
    fn test_single_pixel_contour() {
        let mut img = GrayImage::from_pixel(10, 10, Luma([PAPER]));
        img.put_pixel(4, 6, Luma([INK]));

        let contours = find_external_contours(&img);

        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_box(), Some(BoundingBox::new(4, 6, 1, 1)));
        assert_eq!(contours[0].perimeter(), 0.0);
    }

    #[test]
    fn test_compress_chain_line() {
        let points: Vec<Point2D> = (0..5)
            .map(|x| Point2D::new(x as f64, 0.0))
            .chain((1..4).rev().map(|x| Point2D::new(x as f64, 0.0)))
            .collect();

        let compressed = compress_chain(&points);

        assert_eq!(
            compressed,
            vec![Point2D::new(0.0, 0.0), Point2D::new(4.0, 0.0)]
        );
    }

    #[test]
    fn test_distance_to_chord() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(10.0, 0.0);

        assert!((distance_to_chord(&Point2D::new(5.0, 5.0), &a, &b) - 5.0).abs() < 1e-12);
        assert!((distance_to_chord(&Point2D::new(3.0, 4.0), &a, &a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_simplify_open_chain() {
        let wobbly = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.1),
            Point2D::new(2.0, -0.1),
            Point2D::new(3.0, 0.0),
            Point2D::new(4.0, 0.0),
        ];
        assert_eq!(simplify_open_chain(&wobbly, 0.5).len(), 2);

        let corner = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(5.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 5.0),
            Point2D::new(10.0, 10.0),
        ];
        assert_eq!(
            simplify_open_chain(&corner, 0.5),
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(10.0, 0.0),
                Point2D::new(10.0, 10.0),
            ]
        );
    }

    #[test]
    fn test_regions_touching_image_edge() {
        let mut img = GrayImage::from_pixel(100, 100, Luma([PAPER]));
        fill_rect(&mut img, 0, 0, 36, 12);

        let contours = find_external_contours(&img);

        assert_eq!(contours.len(), 1);
        assert_eq!(
            contours[0].bounding_box(),
            Some(BoundingBox::new(0, 0, 36, 12))
        );
    }

    #[test]
    fn test_outline_on_left_edge_is_external() {
        let mut img = GrayImage::from_pixel(200, 140, Luma([PAPER]));
        // Hollow 180x101 outline starting at x = 0
        fill_rect(&mut img, 0, 10, 180, 101);
        for y in 12..109 {
            for x in 2..178 {
                img.put_pixel(x, y, Luma([PAPER]));
            }
        }

        let contours = find_external_contours(&img);

        assert_eq!(contours.len(), 1);
        assert_eq!(
            contours[0].bounding_box(),
            Some(BoundingBox::new(0, 10, 180, 101))
        );
    }
}
