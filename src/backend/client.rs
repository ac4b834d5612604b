//! Blocking HTTP client for the path-planning backend

use std::time::Duration;

use reqwest::blocking::{multipart, Client};

use super::models::{
    MissionRequest, MissionResponse, PathFile, SATELLITE_FILE_NAME, STREETS_FILE_NAME,
};
use super::MissionBackend;
use crate::error::{Error, Result};
use crate::geometry::MissionPath;
use crate::overlay::RasterImage;
use crate::projection::ProjectedPoint;
use crate::session::MissionOutcome;

/// [`MissionBackend`] over HTTP
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// # Arguments
    /// * `base_url` - Backend root, e.g. `http://localhost:5000`
    /// * `timeout` - Per-request timeout; route planning can take a while
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs pass through; paths are joined onto the base URL
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        }
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let url = self.resolve(url);
        let response = self.client.get(&url).send()?;
        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }
        Ok(response.bytes()?.to_vec())
    }
}

fn png_part(bytes: Vec<u8>, file_name: &'static str) -> Result<multipart::Part> {
    Ok(multipart::Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime::IMAGE_PNG.as_ref())?)
}

impl MissionBackend for HttpBackend {
    fn create_mission(&self, request: &MissionRequest) -> Result<MissionOutcome> {
        let url = format!("{}/api/create-mission", self.base_url);
        let form = multipart::Form::new()
            .part("satellite_image", png_part(request.satellite_png.clone(), SATELLITE_FILE_NAME)?)
            .part("buildings_image", png_part(request.streets_png.clone(), STREETS_FILE_NAME)?)
            .text("top_left_coord", request.top_left_field())
            .text("bottom_right_coord", request.bottom_right_field());

        tracing::info!(
            url = %url,
            top_left = %request.top_left_field(),
            bottom_right = %request.bottom_right_field(),
            "submitting mission"
        );

        let response = self.client.post(&url).multipart(form).send()?;
        let status = response.status();

        // the backend reports planning failures in the body, often with a 4xx/5xx
        let body: MissionResponse = response.json().map_err(|e| {
            Error::Transport(format!("backend returned {} with unreadable body: {}", status, e))
        })?;
        body.into_outcome()
    }

    fn fetch_path(&self, url: &str) -> Result<MissionPath<ProjectedPoint>> {
        let bytes = self.get_bytes(url)?;
        let text = String::from_utf8_lossy(&bytes);
        let path = PathFile::parse(&text)?.into_mission_path();
        tracing::debug!(waypoints = path.len(), "path file fetched");
        Ok(path)
    }

    fn fetch_image(&self, url: &str) -> Result<RasterImage> {
        RasterImage::decode(&self.get_bytes(url)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let backend = HttpBackend::new("http://localhost:5000/", Duration::from_secs(5)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_resolve() {
        let backend = HttpBackend::new("http://localhost:5000", Duration::from_secs(5)).unwrap();
        assert_eq!(
            backend.resolve("/static/outputs/auto_route_coordinates.txt"),
            "http://localhost:5000/static/outputs/auto_route_coordinates.txt"
        );
        assert_eq!(
            backend.resolve("https://example.org/a.png"),
            "https://example.org/a.png"
        );
    }

    #[test]
    fn test_unreachable_backend_is_transport_error() {
        let backend = HttpBackend::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let result = backend.fetch_path("/static/outputs/auto_route_coordinates.txt");
        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
