//! Error types for the mission pipeline

use std::io;

use thiserror::Error;

use crate::session::Stage;

/// Result type for mission pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while planning or exporting a mission
#[derive(Debug, Error)]
pub enum Error {
    /// Point outside the projection domain, or a zero-extent bounding box
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Reduction over zero points
    #[error("Empty geometry: {0}")]
    EmptyGeometry(String),

    /// Export requested for a path with no waypoints
    #[error("Cannot export a mission with no waypoints")]
    EmptyPath,

    /// Polygon with fewer than three vertices
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Flight parameter out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Backend unreachable or non-success response
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Action not permitted in the current capture stage
    #[error("Action '{action}' is not permitted while {stage}")]
    InvalidState { stage: Stage, action: &'static str },

    /// Raster decode/encode error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// libproj error
    #[error("Projection error: {0}")]
    Projection(String),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Transport(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidCoordinate("x is NaN".to_string());
        assert_eq!(err.to_string(), "Invalid coordinate: x is NaN");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_invalid_state_names_stage_and_action() {
        let err = Error::InvalidState {
            stage: Stage::Submitting,
            action: "submit",
        };
        let text = err.to_string();
        assert!(text.contains("submit"));
        assert!(text.contains("submitting"));
    }

    #[test]
    fn test_empty_path() {
        assert!(Error::EmptyPath.to_string().contains("no waypoints"));
    }
}
