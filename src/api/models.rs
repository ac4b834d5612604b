use serde::{Deserialize, Serialize};

use crate::backend::PathVertex;

#[derive(Debug, Serialize, Deserialize)]
pub struct ItmQuery {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeoQuery {
    pub lat: f64,
    pub lon: f64,
}

/// ITM path to export, as written by the planning backend
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportRequest {
    pub path: Vec<PathVertex>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
