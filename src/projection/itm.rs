//! Israeli Transverse Mercator (EPSG:2039) to and from WGS84
//!
//! The grid is a Transverse Mercator on the GRS80 ellipsoid (Israel 1993
//! datum). Geodetic output is shifted to WGS84 with the published seven
//! parameter Helmert transform, going through geocentric coordinates.

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::projection::coordinate::{GeoPoint, ProjectedPoint};
use crate::projection::datum::{Ellipsoid, Helmert};
use crate::projection::tmerc::{TmParams, TransverseMercator};

/// ITM grid definition
pub const ITM_PARAMS: TmParams = TmParams {
    // 31°44'03.817"N
    lat_0: 31.734_393_611_111_1,
    // 35°12'16.261"E
    lon_0: 35.204_516_944_444_4,
    k_0: 1.000_006_7,
    x_0: 219_529.584,
    y_0: 626_907.390,
};

/// Inclusive easting range accepted by [`Itm::to_geo`]
pub const ITM_X_RANGE: (f64, f64) = (100_000.0, 320_000.0);
/// Inclusive northing range accepted by [`Itm::to_geo`]
pub const ITM_Y_RANGE: (f64, f64) = (350_000.0, 820_000.0);
/// Inclusive latitude range accepted by [`Itm::to_projected`]
pub const WGS84_LAT_RANGE: (f64, f64) = (29.0, 34.0);
/// Inclusive longitude range accepted by [`Itm::to_projected`]
pub const WGS84_LON_RANGE: (f64, f64) = (33.5, 36.5);

/// Conversion between a projected grid and WGS84
pub trait GeodeticTransform {
    fn to_geo(&self, point: ProjectedPoint) -> Result<GeoPoint>;
    fn to_projected(&self, point: GeoPoint) -> Result<ProjectedPoint>;
}

/// Native ITM transform
#[derive(Debug, Clone)]
pub struct Itm {
    grid: TransverseMercator,
    shift: Helmert,
}

impl Itm {
    pub fn new() -> Self {
        Self {
            grid: TransverseMercator::new(Ellipsoid::GRS80, ITM_PARAMS),
            shift: Helmert::ISRAEL_1993_TO_WGS84,
        }
    }

    /// Converts a whole path, preserving order
    pub fn to_geo_many(&self, points: &[ProjectedPoint]) -> Result<Vec<GeoPoint>> {
        points.par_iter().map(|&point| self.to_geo(point)).collect()
    }
}

impl Default for Itm {
    fn default() -> Self {
        Self::new()
    }
}

impl GeodeticTransform for Itm {
    fn to_geo(&self, point: ProjectedPoint) -> Result<GeoPoint> {
        check_range("ITM x", point.x, ITM_X_RANGE)?;
        check_range("ITM y", point.y, ITM_Y_RANGE)?;

        let (lat, lon) = self.grid.inverse(point.x, point.y);
        let local = self.grid.ellipsoid().to_geocentric(lat.to_radians(), lon.to_radians(), 0.0);
        let (lat, lon, _) = Ellipsoid::WGS84.from_geocentric(self.shift.forward(local));

        Ok(GeoPoint::new(lat.to_degrees(), lon.to_degrees()))
    }

    fn to_projected(&self, point: GeoPoint) -> Result<ProjectedPoint> {
        check_range("latitude", point.lat, WGS84_LAT_RANGE)?;
        check_range("longitude", point.lon, WGS84_LON_RANGE)?;

        let (lat, lon) = (point.lat.to_radians(), point.lon.to_radians());
        let wgs84 = Ellipsoid::WGS84.to_geocentric(lat, lon, 0.0);
        let (lat, lon, _) = self.grid.ellipsoid().from_geocentric(self.shift.inverse(wgs84));
        let (x, y) = self.grid.forward(lat.to_degrees(), lon.to_degrees());

        Ok(ProjectedPoint::new(x, y))
    }
}

/// ITM to WGS84
pub fn projected_to_geo(point: ProjectedPoint) -> Result<GeoPoint> {
    Itm::new().to_geo(point)
}

/// WGS84 to ITM
pub fn geo_to_projected(point: GeoPoint) -> Result<ProjectedPoint> {
    Itm::new().to_projected(point)
}

fn check_range(name: &str, value: f64, (min, max): (f64, f64)) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::InvalidCoordinate(format!("{} is not finite", name)));
    }
    if value < min || value > max {
        return Err(Error::InvalidCoordinate(format!(
            "{} = {} outside [{}, {}]",
            name, value, min, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_lands_near_defining_point() {
        // The datum shift moves the origin by tens of metres, well under 0.002 degrees
        let geo = projected_to_geo(ProjectedPoint::new(219_529.584, 626_907.390)).unwrap();
        assert!((geo.lat - 31.734_393_6).abs() < 0.002, "lat = {}", geo.lat);
        assert!((geo.lon - 35.204_516_9).abs() < 0.002, "lon = {}", geo.lon);
    }

    #[test]
    fn test_projected_round_trip_within_a_centimetre() {
        let samples = [
            ProjectedPoint::new(219_529.584, 626_907.390),
            ProjectedPoint::new(180_000.0, 665_000.0),
            ProjectedPoint::new(200_000.0, 400_000.0),
            ProjectedPoint::new(250_000.0, 760_000.0),
            ProjectedPoint::new(110_000.0, 360_000.0),
            ProjectedPoint::new(310_000.0, 810_000.0),
        ];

        for point in samples {
            let back = geo_to_projected(projected_to_geo(point).unwrap()).unwrap();
            assert!(
                point.distance_to(&back) < 0.01,
                "{:?} came back as {:?}",
                point,
                back
            );
        }
    }

    #[test]
    fn test_geo_round_trip() {
        let tel_aviv = GeoPoint::new(32.0853, 34.7818);
        let back = projected_to_geo(geo_to_projected(tel_aviv).unwrap()).unwrap();
        assert!((tel_aviv.lat - back.lat).abs() < 1e-7);
        assert!((tel_aviv.lon - back.lon).abs() < 1e-7);
    }

    #[test]
    fn test_tel_aviv_is_west_and_north_of_origin() {
        let p = geo_to_projected(GeoPoint::new(32.0853, 34.7818)).unwrap();
        assert!(p.x < ITM_PARAMS.x_0);
        assert!(p.y > ITM_PARAMS.y_0);
        // roughly 40 km west and 39 km north of the origin
        assert!((p.x - 179_600.0).abs() < 2_000.0, "x = {}", p.x);
        assert!((p.y - 665_800.0).abs() < 2_000.0, "y = {}", p.y);
    }

    #[test]
    fn test_out_of_domain_rejected() {
        assert!(matches!(
            projected_to_geo(ProjectedPoint::new(500.0, 500.0)),
            Err(Error::InvalidCoordinate(_))
        ));
        assert!(matches!(
            geo_to_projected(GeoPoint::new(48.85, 2.35)),
            Err(Error::InvalidCoordinate(_))
        ));
        assert!(matches!(
            projected_to_geo(ProjectedPoint::new(f64::NAN, 626_000.0)),
            Err(Error::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn test_batch_preserves_order() {
        let itm = Itm::new();
        let path: Vec<ProjectedPoint> = (0..50)
            .map(|i| ProjectedPoint::new(200_000.0 + i as f64 * 100.0, 630_000.0))
            .collect();

        let geo = itm.to_geo_many(&path).unwrap();
        assert_eq!(geo.len(), path.len());
        for pair in geo.windows(2) {
            assert!(pair[1].lon > pair[0].lon);
        }
        for (point, converted) in path.iter().zip(&geo) {
            assert_eq!(itm.to_geo(*point).unwrap(), *converted);
        }
    }

    #[test]
    fn test_batch_fails_on_any_bad_point() {
        let itm = Itm::new();
        let path = vec![
            ProjectedPoint::new(200_000.0, 630_000.0),
            ProjectedPoint::new(0.0, 0.0),
        ];
        assert!(itm.to_geo_many(&path).is_err());
    }
}
