//! Owned toolpath polylines
//!
//! A [`Path`] is the value handed back to callers once the vertex graph has
//! been walked, simplified and detached. Closed paths are flagged explicitly
//! instead of repeating their first point.

use serde::{Deserialize, Serialize};

/// A point in machine space (mm)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Point on the z = 0 plane
    pub fn xy(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Squared planar distance to `(x, y)`
    pub fn distance_squared_xy(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        dx * dx + dy * dy
    }
}

/// Axis-aligned planar bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub xmin: f32,
    pub xmax: f32,
    pub ymin: f32,
    pub ymax: f32,
}

impl Bounds {
    /// Degenerate bounds around a single point
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            xmin: x,
            xmax: x,
            ymin: y,
            ymax: y,
        }
    }

    /// Grow to include `(x, y)`
    pub fn include(&mut self, x: f32, y: f32) {
        self.xmin = self.xmin.min(x);
        self.xmax = self.xmax.max(x);
        self.ymin = self.ymin.min(y);
        self.ymax = self.ymax.max(y);
    }

    /// Smallest bounds covering both
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            xmin: self.xmin.min(other.xmin),
            xmax: self.xmax.max(other.xmax),
            ymin: self.ymin.min(other.ymin),
            ymax: self.ymax.max(other.ymax),
        }
    }

    /// Whether `self` lies inside `outer`, touching edges allowed
    pub fn is_within(&self, outer: &Bounds) -> bool {
        self.xmin >= outer.xmin
            && self.xmax <= outer.xmax
            && self.ymin >= outer.ymin
            && self.ymax <= outer.ymax
    }

    pub fn width(&self) -> f32 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f32 {
        self.ymax - self.ymin
    }
}

/// An open or closed polyline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Path {
    pub points: Vec<Point3>,
    pub closed: bool,
}

impl Path {
    pub fn new(points: Vec<Point3>, closed: bool) -> Self {
        Self { points, closed }
    }

    pub fn open(points: Vec<Point3>) -> Self {
        Self::new(points, false)
    }

    pub fn closed(points: Vec<Point3>) -> Self {
        Self::new(points, true)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Entry point of the cut
    pub fn start(&self) -> Option<Point3> {
        self.points.first().copied()
    }

    /// Where the tool sits after cutting this path.
    ///
    /// A closed loop ends back at its start; an open chain ends at its last
    /// point.
    pub fn exit(&self) -> Option<Point3> {
        if self.closed {
            self.start()
        } else {
            self.points.last().copied()
        }
    }

    /// Planar bounding box, `None` for an empty path
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.points.first()?;
        let mut bounds = Bounds::at(first.x, first.y);
        for p in &self.points[1..] {
            bounds.include(p.x, p.y);
        }
        Some(bounds)
    }

    /// Same path traversed backwards
    pub fn reverse(&self) -> Path {
        let mut points = self.points.clone();
        points.reverse();
        Path::new(points, self.closed)
    }

    /// Set every point's z
    pub fn set_z(&mut self, z: f32) {
        for p in &mut self.points {
            p.z = z;
        }
    }

    /// Shift every point's z by `dz`
    pub fn offset_z(&mut self, dz: f32) {
        for p in &mut self.points {
            p.z += dz;
        }
    }

    /// Planar length, including the closing segment of a closed path
    pub fn length(&self) -> f32 {
        let mut total: f32 = self
            .points
            .windows(2)
            .map(|w| w[0].distance_squared_xy(w[1].x, w[1].y).sqrt())
            .sum();
        if self.closed && self.points.len() > 2 {
            if let (Some(first), Some(last)) = (self.points.first(), self.points.last()) {
                total += first.distance_squared_xy(last.x, last.y).sqrt();
            }
        }
        total
    }
}

/// Merged bounds of a set of paths
pub fn merged_bounds(paths: &[Path]) -> Option<Bounds> {
    paths
        .iter()
        .filter_map(Path::bounds)
        .reduce(|a, b| a.union(&b))
}
