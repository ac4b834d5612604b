//! Geometry model: bounding boxes, polygons, no-fly zones and paths

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::projection::{PlanarPoint, ProjectedPoint};
use crate::types::Dimensions;

/// Oriented bounds of a [`BoundingBox`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

/// Survey area on the projected grid, given by two opposite corners in any order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(corner1: ProjectedPoint, corner2: ProjectedPoint) -> Self {
        Self::from_corners(corner1.x, corner1.y, corner2.x, corner2.y)
    }

    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Min/max extraction; independent of which corner came first
    pub fn normalize(&self) -> Bounds {
        Bounds {
            xmin: self.x1.min(self.x2),
            xmax: self.x1.max(self.x2),
            ymin: self.y1.min(self.y2),
            ymax: self.y1.max(self.y2),
        }
    }

    /// Returns true if the box has a finite, non-zero width and height
    pub fn has_extent(&self) -> bool {
        let bounds = self.normalize();
        bounds.width().is_finite()
            && bounds.height().is_finite()
            && bounds.width() > 0.0
            && bounds.height() > 0.0
    }

    /// North-west corner `(xmin, ymax)`, which pixel (0, 0) maps to
    pub fn top_left(&self) -> ProjectedPoint {
        let b = self.normalize();
        ProjectedPoint::new(b.xmin, b.ymax)
    }

    /// South-east corner `(xmax, ymin)`, which pixel (W, H) maps to
    pub fn bottom_right(&self) -> ProjectedPoint {
        let b = self.normalize();
        ProjectedPoint::new(b.xmax, b.ymin)
    }

    /// Pixels per metre along each axis for a raster of the given size
    pub fn scale_factors(&self, dims: Dimensions) -> Result<(f64, f64)> {
        if !self.has_extent() {
            return Err(Error::InvalidCoordinate(format!(
                "bounding box ({}, {})-({}, {}) has zero extent",
                self.x1, self.y1, self.x2, self.y2
            )));
        }
        if dims.is_empty() {
            return Err(Error::InvalidCoordinate(format!(
                "raster {}x{} has zero extent",
                dims.width, dims.height
            )));
        }

        let bounds = self.normalize();
        Ok((
            dims.width as f64 / bounds.width(),
            dims.height as f64 / bounds.height(),
        ))
    }
}

/// Smallest box containing every point
pub fn bounding_box_of(points: &[ProjectedPoint]) -> Result<BoundingBox> {
    let first = points
        .first()
        .ok_or_else(|| Error::EmptyGeometry("bounding box of zero points".to_string()))?;

    let init = Bounds {
        xmin: first.x,
        xmax: first.x,
        ymin: first.y,
        ymax: first.y,
    };
    let b = points.iter().fold(init, |acc, p| Bounds {
        xmin: acc.xmin.min(p.x),
        xmax: acc.xmax.max(p.x),
        ymin: acc.ymin.min(p.y),
        ymax: acc.ymax.max(p.y),
    });

    Ok(BoundingBox::from_corners(b.xmin, b.ymin, b.xmax, b.ymax))
}

/// Arithmetic mean of the points, in the same space as the input
pub fn centroid<P: PlanarPoint>(points: &[P]) -> Result<P> {
    if points.is_empty() {
        return Err(Error::EmptyGeometry("centroid of zero points".to_string()));
    }

    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x(), sy + p.y()));
    let n = points.len() as f64;

    Ok(P::from_xy(sx / n, sy / n))
}

/// Implicitly closed ring of projected vertices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<ProjectedPoint>,
}

impl Polygon {
    pub fn new(vertices: Vec<ProjectedPoint>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[ProjectedPoint] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// A polygon needs at least three vertices to enclose anything
    pub fn is_renderable(&self) -> bool {
        self.vertices.len() >= 3
    }
}

impl From<Vec<ProjectedPoint>> for Polygon {
    fn from(vertices: Vec<ProjectedPoint>) -> Self {
        Self::new(vertices)
    }
}

/// Ordered set of committed no-fly polygons
///
/// Zones are identified by position: removing one shifts the indices (and the
/// 1-based display labels) of every zone after it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoFlyZoneSet {
    zones: Vec<Polygon>,
}

impl NoFlyZoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a zone, returning its index
    pub fn commit(&mut self, polygon: Polygon) -> Result<usize> {
        if !polygon.is_renderable() {
            return Err(Error::DegenerateGeometry(format!(
                "no-fly zone needs at least 3 vertices, got {}",
                polygon.len()
            )));
        }
        self.zones.push(polygon);
        Ok(self.zones.len() - 1)
    }

    /// Removes the zone at `index`, or returns `None` if out of range
    pub fn remove(&mut self, index: usize) -> Option<Polygon> {
        if index < self.zones.len() {
            Some(self.zones.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&Polygon> {
        self.zones.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Polygon> {
        self.zones.iter()
    }

    pub fn as_slice(&self) -> &[Polygon] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// Flight route in flight order, in one coordinate space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionPath<P> {
    points: Vec<P>,
}

impl<P> MissionPath<P> {
    pub fn new(points: Vec<P>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[P] {
        &self.points
    }

    pub fn into_points(self) -> Vec<P> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl<P> From<Vec<P>> for MissionPath<P> {
    fn from(points: Vec<P>) -> Self {
        Self::new(points)
    }
}
