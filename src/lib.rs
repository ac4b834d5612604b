//! skyops-mission - Drone survey mission geometry and export
//!
//! skyops-mission turns an operator's survey area, takeoff/landing picks and
//! no-fly zones into a request for a path-planning backend, and the planned
//! route it returns into a Litchi waypoint mission. Geometry lives on the
//! Israeli Transverse Mercator grid (EPSG:2039); exports are in WGS84.
//!
//! # Examples
//!
//! ## Coordinate Conversion
//!
//! ```no_run
//! use skyops_mission::projection::{pixel_to_projected, projected_to_geo, PixelPoint};
//! use skyops_mission::{BoundingBox, Dimensions};
//!
//! let area = BoundingBox::from_corners(180_000.0, 664_500.0, 180_500.0, 665_000.0);
//! let grid = pixel_to_projected(PixelPoint::new(250.0, 250.0), &area, Dimensions::new(500, 500))?;
//! let geo = projected_to_geo(grid)?;
//! println!("{:.6}, {:.6}", geo.lat, geo.lon);
//! # Ok::<(), skyops_mission::Error>(())
//! ```
//!
//! ## Capturing and Exporting a Mission
//!
//! ```no_run
//! use std::time::Duration;
//! use skyops_mission::backend::HttpBackend;
//! use skyops_mission::overlay::RasterImage;
//! use skyops_mission::planner::{MissionPlanner, SurveyImagery};
//! use skyops_mission::projection::PixelPoint;
//! use skyops_mission::session::Event;
//! use skyops_mission::{BoundingBox, FlightParameters};
//!
//! let backend = HttpBackend::new("http://localhost:5000", Duration::from_secs(120))?;
//! let mut planner = MissionPlanner::new(backend);
//!
//! let area = BoundingBox::from_corners(180_000.0, 664_500.0, 180_500.0, 665_000.0);
//! planner.dispatch(Event::DrawArea(area))?;
//! planner.dispatch(Event::ConfirmArea)?;
//! planner.load_imagery(SurveyImagery::new(
//!     RasterImage::decode(&std::fs::read("ortho.png")?)?,
//!     RasterImage::decode(&std::fs::read("streets.png")?)?,
//! )?)?;
//! for point in [PixelPoint::new(20.0, 30.0), PixelPoint::new(400.0, 410.0)] {
//!     planner.dispatch(Event::Click(point))?;
//!     planner.dispatch(Event::Approve)?;
//! }
//! planner.dispatch(Event::Submit)?;
//!
//! let csv = planner.export(&FlightParameters::default())?;
//! std::fs::write("mission.csv", csv)?;
//! # Ok::<(), skyops_mission::Error>(())
//! ```

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod overlay;
pub mod planner;
pub mod projection;
pub mod session;
pub mod types;

pub use error::{Error, Result};
pub use export::{to_waypoint_file, FlightParameters};
pub use geometry::{BoundingBox, MissionPath, NoFlyZoneSet, Polygon};
pub use projection::{GeoPoint, PixelPoint, ProjectedPoint};
pub use session::{CaptureSession, Event, Stage};
pub use types::Dimensions;
