//! Wire models for the path-planning backend

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{BoundingBox, MissionPath};
use crate::projection::ProjectedPoint;
use crate::session::MissionOutcome;

/// File name the satellite image is uploaded under
pub const SATELLITE_FILE_NAME: &str = "ortho.png";
/// File name the annotated streets image is uploaded under
pub const STREETS_FILE_NAME: &str = "streets_with_markers.png";

/// Multipart payload for `POST /api/create-mission`
#[derive(Debug, Clone)]
pub struct MissionRequest {
    /// Satellite imagery of the survey area, PNG
    pub satellite_png: Vec<u8>,
    /// Streets imagery with markers and obstacle fills, PNG
    pub streets_png: Vec<u8>,
    pub area: BoundingBox,
}

impl MissionRequest {
    /// `"(xmin, ymax)"`
    pub fn top_left_field(&self) -> String {
        format_corner(self.area.top_left())
    }

    /// `"(xmax, ymin)"`
    pub fn bottom_right_field(&self) -> String {
        format_corner(self.area.bottom_right())
    }
}

fn format_corner(p: ProjectedPoint) -> String {
    format!("({}, {})", p.x, p.y)
}

/// Backend reply to a mission submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satellite_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates_file_url: Option<String>,
}

impl MissionResponse {
    /// Success with both result URLs, or a `Transport` error
    pub fn into_outcome(self) -> Result<MissionOutcome> {
        if !self.success {
            return Err(Error::Transport(
                self.message
                    .unwrap_or_else(|| "backend rejected the mission".to_string()),
            ));
        }
        match (self.satellite_image_url, self.coordinates_file_url) {
            (Some(image_url), Some(path_file_url)) => Ok(MissionOutcome {
                image_url,
                path_file_url,
            }),
            _ => Err(Error::Transport(
                "backend response is missing the result URLs".to_string(),
            )),
        }
    }
}

/// One path vertex; the backend writes objects, older outputs used pairs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathVertex {
    Object { x: f64, y: f64 },
    Pair([f64; 2]),
}

impl From<PathVertex> for ProjectedPoint {
    fn from(vertex: PathVertex) -> Self {
        match vertex {
            PathVertex::Object { x, y } => ProjectedPoint::new(x, y),
            PathVertex::Pair([x, y]) => ProjectedPoint::new(x, y),
        }
    }
}

/// Contents of the coordinates file: `{ "path": [...] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathFile {
    pub path: Vec<PathVertex>,
}

impl PathFile {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Path in ITM, flight order preserved
    pub fn into_mission_path(self) -> MissionPath<ProjectedPoint> {
        self.path.into_iter().map(ProjectedPoint::from).collect::<Vec<_>>().into()
    }
}
