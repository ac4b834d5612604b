//! Affine mapping between raster pixels and the projected grid
//!
//! A [`BoundingBox`] pins pixel (0, 0) to its north-west corner and pixel
//! (W, H) to its south-east corner. Pixel rows grow southward while grid
//! northings grow northward, so the Y axis is flipped.

use crate::error::Result;
use crate::geometry::BoundingBox;
use crate::projection::coordinate::{PixelPoint, ProjectedPoint};
use crate::types::Dimensions;

/// Pixel to projected coordinates
pub fn pixel_to_projected(
    pixel: PixelPoint,
    bbox: &BoundingBox,
    dims: Dimensions,
) -> Result<ProjectedPoint> {
    let (scale_x, scale_y) = bbox.scale_factors(dims)?;
    let bounds = bbox.normalize();

    Ok(ProjectedPoint::new(
        bounds.xmin + pixel.x / scale_x,
        bounds.ymax - pixel.y / scale_y,
    ))
}

/// Projected to pixel coordinates
pub fn projected_to_pixel(
    point: ProjectedPoint,
    bbox: &BoundingBox,
    dims: Dimensions,
) -> Result<PixelPoint> {
    let (scale_x, scale_y) = bbox.scale_factors(dims)?;
    let bounds = bbox.normalize();

    Ok(PixelPoint::new(
        (point.x - bounds.xmin) * scale_x,
        (bounds.ymax - point.y) * scale_y,
    ))
}

/// Projects a sequence of points, preserving order
pub fn projected_to_pixel_many(
    points: &[ProjectedPoint],
    bbox: &BoundingBox,
    dims: Dimensions,
) -> Result<Vec<PixelPoint>> {
    points
        .iter()
        .map(|&point| projected_to_pixel(point, bbox, dims))
        .collect()
}
