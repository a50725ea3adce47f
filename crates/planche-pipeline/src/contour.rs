//! Contour extraction: flood-fill connected components of edge pixels.
//!
//! Raster-scans the binary edge map and grows every unvisited edge pixel
//! into its full 8-connected component with an explicit breadth-first
//! queue. Each component becomes one [`Contour`] carrying its point set
//! and derived bounding box.
//!
//! The traversal is iterative on purpose: a full-page gutter network can
//! be a single component of hundreds of thousands of pixels, far beyond
//! what recursion depth would tolerate. The `visited` bitmap is a dense
//! boolean array owned by the tracing call and never escapes it.
//!
//! Determinism: seeds are discovered in row-major order and the queue is
//! FIFO, so identical input always produces identical contours in
//! identical order.

use std::collections::VecDeque;

use image::GrayImage;

use crate::types::{BoundingBox, Point};

/// Components with this many points or fewer are discarded as noise
/// before they ever reach the size filter.
pub const MIN_COMPONENT_POINTS: usize = 20;

/// A connected component of edge pixels: its point set plus the derived
/// axis-aligned bounding box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    points: Vec<Point>,
    bounds: BoundingBox,
}

impl Contour {
    /// Build a contour from a point set, deriving the bounding box.
    ///
    /// Returns `None` for an empty point set (a contour without points
    /// has no meaningful box).
    #[must_use]
    pub fn new(points: Vec<Point>) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            points,
            bounds: BoundingBox::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1),
        })
    }

    /// The contour's edge pixels.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of edge pixels in the contour.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the contour has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The derived axis-aligned bounding box.
    #[must_use]
    pub const fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Merge `other` into `self`: the point set becomes the union and
    /// the box becomes the smallest box containing both.
    pub fn absorb(&mut self, other: Self) {
        self.bounds = self.bounds.union(&other.bounds);
        self.points.extend(other.points);
    }
}

/// Trace all contours in a binary edge map.
///
/// Every pixel with value 255 is assigned to exactly one contour via
/// 8-connected flood fill; components with [`MIN_COMPONENT_POINTS`] or
/// fewer pixels are dropped.
#[must_use = "returns the traced contours"]
pub fn trace(edges: &GrayImage) -> Vec<Contour> {
    let (width, height) = edges.dimensions();
    let mut visited = vec![false; width as usize * height as usize];
    let index = |x: u32, y: u32| y as usize * width as usize + x as usize;

    let mut contours = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if edges.get_pixel(x, y).0[0] != 255 || visited[index(x, y)] {
                continue;
            }
            let contour = flood_fill(edges, &mut visited, Point::new(x, y));
            if contour.len() > MIN_COMPONENT_POINTS {
                contours.push(contour);
            }
        }
    }
    contours
}

/// Collect the full 8-connected component containing `seed`.
///
/// Marks every pixel it visits in `visited` exactly once; the caller
/// guarantees `seed` is an unvisited edge pixel.
fn flood_fill(edges: &GrayImage, visited: &mut [bool], seed: Point) -> Contour {
    let (width, height) = edges.dimensions();
    let index = |x: u32, y: u32| y as usize * width as usize + x as usize;

    let mut points = Vec::new();
    let mut queue = VecDeque::new();
    visited[index(seed.x, seed.y)] = true;
    queue.push_back(seed);

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (seed.x, seed.y, seed.x, seed.y);

    while let Some(p) = queue.pop_front() {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);

        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let Some(nx) = p.x.checked_add_signed(dx) else {
                    continue;
                };
                let Some(ny) = p.y.checked_add_signed(dy) else {
                    continue;
                };
                if nx >= width || ny >= height {
                    continue;
                }
                if edges.get_pixel(nx, ny).0[0] == 255 && !visited[index(nx, ny)] {
                    visited[index(nx, ny)] = true;
                    queue.push_back(Point::new(nx, ny));
                }
            }
        }

        points.push(p);
    }

    Contour {
        points,
        bounds: BoundingBox::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1),
    }
}
