//! Runtime configuration from environment.

use std::env;
use std::time::Duration;

use crate::export::{DEFAULT_ALTITUDE_M, DEFAULT_SPEED_MPS};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend_url: String,
    pub server_port: u16,
    pub request_timeout: Duration,
    pub default_speed: f64,
    pub default_altitude: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:5000".to_string(),
            server_port: 3000,
            request_timeout: Duration::from_secs(120),
            default_speed: DEFAULT_SPEED_MPS,
            default_altitude: DEFAULT_ALTITUDE_M,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unset or unparsable values fall back to the defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse::<f64>().ok());

        Self {
            backend_url: lookup("SKYOPS_BACKEND_URL")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.backend_url),
            server_port: lookup("SKYOPS_PORT")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.server_port),
            request_timeout: lookup("SKYOPS_REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            default_speed: parsed("SKYOPS_DEFAULT_SPEED")
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(defaults.default_speed),
            default_altitude: parsed("SKYOPS_DEFAULT_ALTITUDE")
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(defaults.default_altitude),
        }
    }
}
