//! libproj-backed ITM transform, enabled with the `proj` feature
//!
//! Used to cross-check the native [`Itm`](super::Itm) implementation against
//! PROJ's own EPSG:2039 definition.

use proj::Proj;

use crate::error::{Error, Result};
use crate::projection::coordinate::{GeoPoint, ProjectedPoint};
use crate::projection::itm::GeodeticTransform;

/// EPSG code of the Israeli Transverse Mercator grid
pub const ITM_EPSG: u16 = 2039;
/// EPSG code of WGS84 geographic coordinates
pub const WGS84_EPSG: u16 = 4326;

/// Transforms ITM coordinates through libproj
pub struct ProjItm {
    forward: Proj,
    inverse: Proj,
}

impl ProjItm {
    pub fn new() -> Result<Self> {
        let itm = format!("EPSG:{}", ITM_EPSG);
        let wgs84 = format!("EPSG:{}", WGS84_EPSG);

        let forward = Proj::new_known_crs(&itm, &wgs84, None)
            .map_err(|e| Error::Projection(format!("Failed to create projection: {}", e)))?;
        let inverse = Proj::new_known_crs(&wgs84, &itm, None)
            .map_err(|e| Error::Projection(format!("Failed to create inverse projection: {}", e)))?;

        Ok(Self { forward, inverse })
    }
}

impl GeodeticTransform for ProjItm {
    fn to_geo(&self, point: ProjectedPoint) -> Result<GeoPoint> {
        // new_known_crs normalizes geographic axes to (lon, lat)
        let (lon, lat) = self
            .forward
            .convert((point.x, point.y))
            .map_err(|e| Error::Projection(format!("Transformation failed: {}", e)))?;

        Ok(GeoPoint::new(lat, lon))
    }

    fn to_projected(&self, point: GeoPoint) -> Result<ProjectedPoint> {
        let (x, y) = self
            .inverse
            .convert((point.lon, point.lat))
            .map_err(|e| Error::Projection(format!("Inverse transformation failed: {}", e)))?;

        Ok(ProjectedPoint::new(x, y))
    }
}
