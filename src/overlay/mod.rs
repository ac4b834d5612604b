//! Overlay renderer
//!
//! Burns mission geometry into a copy of a raster and returns the result as
//! PNG bytes. The source raster is never modified.
//!
//! Two audiences get two kinds of overlay:
//!
//! * the operator sees triangle markers and no-fly zones, either filled
//!   (preview) or outlined with their 1-based index (result confirmation);
//! * the path-planning backend gets single-pixel markers and zones filled with
//!   the grey it reads as obstacles.

pub mod draw;
pub mod raster;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{centroid, BoundingBox, Polygon};
use crate::projection::{projected_to_pixel_many, PixelPoint, ProjectedPoint};
use crate::types::Dimensions;

pub use raster::RasterImage;

/// Takeoff triangle
pub const TAKEOFF_COLOR: Rgba<u8> = Rgba([51, 201, 86, 255]);
/// Landing triangle
pub const LANDING_COLOR: Rgba<u8> = Rgba([205, 45, 61, 255]);
/// Single-pixel takeoff marker read by the backend
pub const TAKEOFF_PIXEL_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);
/// Single-pixel landing marker read by the backend
pub const LANDING_PIXEL_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
/// Fill the backend treats as an obstacle (it thresholds grey 245..=249)
pub const OBSTACLE_COLOR: Rgba<u8> = Rgba([246, 246, 246, 255]);
/// Zone outline and label
pub const ZONE_OUTLINE_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
/// Flight path polyline
pub const PATH_COLOR: Rgba<u8> = Rgba([0, 0, 255, 255]);

const LINE_WIDTH: i64 = 2;
const LABEL_SCALE: i64 = 3;

/// How no-fly zones are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneStyle {
    /// Solid obstacle-grey fill, for previews
    #[default]
    Filled,
    /// Red outline with the zone's 1-based index at its centroid
    Outlined,
}

/// Draws takeoff/landing triangles and no-fly zones.
///
/// Zones are given on the projected grid and need `bbox` to reach pixel
/// space; without it they are skipped and only the markers are drawn. Zones
/// with fewer than three vertices are skipped silently, but keep their slot
/// in the label numbering.
pub fn render_markers_and_zones(
    base: &RasterImage,
    takeoff: Option<PixelPoint>,
    landing: Option<PixelPoint>,
    zones: &[Polygon],
    bbox: Option<&BoundingBox>,
    style: ZoneStyle,
) -> Result<Vec<u8>> {
    let mut canvas = base.canvas();
    let dims = base.dimensions();

    if let Some(bbox) = bbox {
        paint_zones(&mut canvas, dims, zones, bbox, style)?;
    } else if !zones.is_empty() {
        tracing::debug!(count = zones.len(), "no bounding box, skipping no-fly zones");
    }

    if let Some(point) = takeoff {
        draw::fill_marker(&mut canvas, point.rounded(), TAKEOFF_COLOR);
    }
    if let Some(point) = landing {
        draw::fill_marker(&mut canvas, point.rounded(), LANDING_COLOR);
    }

    raster::encode_png(&canvas)
}

/// Stamps exactly two single-pixel markers, nothing else
pub fn draw_pixel_markers_only(
    base: &RasterImage,
    takeoff: PixelPoint,
    landing: PixelPoint,
) -> Result<Vec<u8>> {
    let mut canvas = base.canvas();
    stamp_pixel_markers(&mut canvas, takeoff, landing);
    raster::encode_png(&canvas)
}

/// The marker image sent to the path-planning backend: zones filled as
/// obstacles, then the two single-pixel markers on top
pub fn render_backend_payload(
    base: &RasterImage,
    takeoff: PixelPoint,
    landing: PixelPoint,
    zones: &[Polygon],
    bbox: &BoundingBox,
) -> Result<Vec<u8>> {
    let mut canvas = base.canvas();
    paint_zones(&mut canvas, base.dimensions(), zones, bbox, ZoneStyle::Filled)?;
    stamp_pixel_markers(&mut canvas, takeoff, landing);
    raster::encode_png(&canvas)
}

/// Draws a projected flight path as a polyline
pub fn render_path(
    base: &RasterImage,
    path: &[ProjectedPoint],
    bbox: &BoundingBox,
) -> Result<Vec<u8>> {
    let mut canvas = base.canvas();
    let pixels = projected_to_pixel_many(path, bbox, base.dimensions())?;
    let points: Vec<(f64, f64)> = pixels.iter().map(|p| (p.x, p.y)).collect();

    draw::stroke_polyline(&mut canvas, &points, LINE_WIDTH, PATH_COLOR);
    raster::encode_png(&canvas)
}

/// Who an overlay is rendered for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayTarget {
    /// Triangle markers and styled zones
    #[default]
    Operator,
    /// Single-pixel markers and obstacle fill
    Backend,
}

/// Serializable description of one overlay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayRequest {
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
    #[serde(default)]
    pub takeoff: Option<PixelPoint>,
    #[serde(default)]
    pub landing: Option<PixelPoint>,
    #[serde(default)]
    pub no_fly_zones: Vec<Polygon>,
    #[serde(default)]
    pub style: ZoneStyle,
    #[serde(default)]
    pub target: OverlayTarget,
}

impl OverlayRequest {
    pub fn render(&self, base: &RasterImage) -> Result<Vec<u8>> {
        match self.target {
            OverlayTarget::Operator => render_markers_and_zones(
                base,
                self.takeoff,
                self.landing,
                &self.no_fly_zones,
                self.bbox.as_ref(),
                self.style,
            ),
            OverlayTarget::Backend => match (self.takeoff, self.landing, self.bbox.as_ref()) {
                (Some(takeoff), Some(landing), Some(bbox)) => {
                    render_backend_payload(base, takeoff, landing, &self.no_fly_zones, bbox)
                }
                _ => Err(Error::InvalidParameter(
                    "backend overlay needs takeoff, landing and bbox".to_string(),
                )),
            },
        }
    }
}

fn stamp_pixel_markers(canvas: &mut RgbaImage, takeoff: PixelPoint, landing: PixelPoint) {
    let (x, y) = takeoff.rounded();
    draw::put(canvas, x, y, TAKEOFF_PIXEL_COLOR);
    let (x, y) = landing.rounded();
    draw::put(canvas, x, y, LANDING_PIXEL_COLOR);
}

fn paint_zones(
    canvas: &mut RgbaImage,
    dims: Dimensions,
    zones: &[Polygon],
    bbox: &BoundingBox,
    style: ZoneStyle,
) -> Result<()> {
    for (index, zone) in zones.iter().enumerate() {
        if !zone.is_renderable() {
            tracing::debug!(index, vertices = zone.len(), "skipping degenerate no-fly zone");
            continue;
        }

        let pixels = projected_to_pixel_many(zone.vertices(), bbox, dims)?;
        let outline: Vec<(f64, f64)> = pixels.iter().map(|p| (p.x, p.y)).collect();

        match style {
            ZoneStyle::Filled => draw::fill_polygon(canvas, &outline, OBSTACLE_COLOR),
            ZoneStyle::Outlined => {
                draw::stroke_polygon(canvas, &outline, LINE_WIDTH, ZONE_OUTLINE_COLOR);
                let center = centroid(&pixels)?;
                draw::draw_text_centered(
                    canvas,
                    (center.x, center.y),
                    &(index + 1).to_string(),
                    LABEL_SCALE,
                    ZONE_OUTLINE_COLOR,
                );
            }
        }
    }
    Ok(())
}
