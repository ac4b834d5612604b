//! Path-planning backend contract
//!
//! The backend receives the survey imagery and bounding box, plans a route
//! around the obstacles painted into the streets image, and publishes the
//! result image and an ITM path file.

mod client;
mod models;

pub use client::HttpBackend;
pub use models::{MissionRequest, MissionResponse, PathFile, PathVertex};

use crate::error::Result;
use crate::geometry::MissionPath;
use crate::overlay::RasterImage;
use crate::projection::ProjectedPoint;
use crate::session::MissionOutcome;

/// Route planner the mission is submitted to
pub trait MissionBackend {
    /// Submits the mission; `Transport` on network failure or a non-success reply
    fn create_mission(&self, request: &MissionRequest) -> Result<MissionOutcome>;

    /// Downloads and parses the ITM path file
    fn fetch_path(&self, url: &str) -> Result<MissionPath<ProjectedPoint>>;

    /// Downloads the annotated result image
    fn fetch_image(&self, url: &str) -> Result<RasterImage>;
}
