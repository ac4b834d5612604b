//! Coordinate transform engine
//!
//! Three coordinate spaces are in play, each with its own point type:
//! raster pixels ([`PixelPoint`]), the ITM grid ([`ProjectedPoint`]) and
//! WGS84 ([`GeoPoint`]). Pixel and grid are related by the affine map a
//! [`BoundingBox`](crate::geometry::BoundingBox) defines for one raster; grid
//! and WGS84 by the geodetic transform in [`itm`].

pub mod affine;
pub mod coordinate;
pub mod datum;
pub mod itm;
pub mod tmerc;
#[cfg(feature = "proj")]
pub mod proj_backend;

pub use affine::{pixel_to_projected, projected_to_pixel, projected_to_pixel_many};
pub use coordinate::{GeoPoint, PixelPoint, PlanarPoint, ProjectedPoint};
pub use datum::{Ellipsoid, Helmert};
pub use itm::{geo_to_projected, projected_to_geo, GeodeticTransform, Itm};
pub use tmerc::{TmParams, TransverseMercator};
#[cfg(feature = "proj")]
pub use proj_backend::ProjItm;
