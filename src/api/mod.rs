//! HTTP API over the coordinate, export and overlay operations

pub mod handlers;
pub mod models;
pub mod routes;


pub use routes::create_router;

use crate::config::Config;
use crate::export::FlightParameters;

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Used when an export request leaves speed or altitude out
    pub defaults: FlightParameters,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        let defaults = FlightParameters::new(config.default_speed, config.default_altitude)
            .unwrap_or_default();
        Self { defaults }
    }
}
