use std::sync::Arc;

use axum::{
    extract::{multipart::Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::Error;
use crate::export::{export_itm_path, FlightParameters};
use crate::geometry::MissionPath;
use crate::overlay::{OverlayRequest, RasterImage};
use crate::projection::{geo_to_projected, projected_to_geo, GeoPoint, ProjectedPoint};

use super::models::*;
use super::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn reject(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

impl From<Error> for (StatusCode, Json<ErrorResponse>) {
    fn from(error: Error) -> Self {
        let status = match error {
            Error::InvalidCoordinate(_)
            | Error::EmptyGeometry(_)
            | Error::EmptyPath
            | Error::DegenerateGeometry(_)
            | Error::InvalidParameter(_)
            | Error::Image(_)
            | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::InvalidState { .. } => StatusCode::CONFLICT,
            Error::Transport(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::warn!(error = %error, "request failed");
        }
        reject(status, error.to_string())
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn itm_to_wgs84(Query(q): Query<ItmQuery>) -> Result<Json<GeoPoint>, ApiError> {
    Ok(Json(projected_to_geo(ProjectedPoint::new(q.x, q.y))?))
}

pub async fn wgs84_to_itm(Query(q): Query<GeoQuery>) -> Result<Json<ProjectedPoint>, ApiError> {
    Ok(Json(geo_to_projected(GeoPoint::new(q.lat, q.lon))?))
}

pub async fn export_litchi(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExportRequest>,
) -> Result<Response, ApiError> {
    let params = FlightParameters::new(
        req.speed.unwrap_or(state.defaults.speed_mps()),
        req.altitude.unwrap_or(state.defaults.altitude_m()),
    )?;
    let path: MissionPath<ProjectedPoint> = req
        .path
        .into_iter()
        .map(ProjectedPoint::from)
        .collect::<Vec<_>>()
        .into();

    let csv = export_itm_path(&path, &params)?;
    tracing::info!(waypoints = path.len(), "litchi export served");

    Ok((
        [
            (header::CONTENT_TYPE, mime::TEXT_CSV.as_ref()),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"mission.csv\""),
        ],
        csv,
    )
        .into_response())
}

pub async fn render_overlay(mut multipart: Multipart) -> Result<Response, ApiError> {
    let mut image: Option<Vec<u8>> = None;
    let mut geometry: Option<OverlayRequest> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| reject(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| reject(StatusCode::BAD_REQUEST, e.to_string()))?;

        match name.as_str() {
            "image" => image = Some(data.to_vec()),
            "geometry" => geometry = Some(serde_json::from_slice(&data).map_err(Error::from)?),
            _ => {}
        }
    }

    let image = image.ok_or_else(|| reject(StatusCode::BAD_REQUEST, "Missing image file"))?;
    let geometry =
        geometry.ok_or_else(|| reject(StatusCode::BAD_REQUEST, "Missing geometry field"))?;

    let png = geometry.render(&RasterImage::decode(&image)?)?;
    Ok(([(header::CONTENT_TYPE, mime::IMAGE_PNG.as_ref())], png).into_response())
}
