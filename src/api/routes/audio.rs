// src/api/routes/audio.rs
//! Audio streaming proxy.
//!
//! Remote recordings are fetched on behalf of the browser so that `Range`
//! requests work and the response carries a playable `Content-Type`.

use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Json, Response},
    routing::get,
    Router,
};
use log::{debug, error};
use reqwest::Url;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::{ApiResult, AppState};
use crate::audio::{source_set, AudioFormat, DeviceType, SourceSet};

const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/stream", get(stream_audio))
        .route("/sources", get(audio_sources))
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SourcesQuery {
    url: Option<String>,
    device: Option<DeviceType>,
}

fn required_url(url: Option<String>) -> ApiResult<String> {
    url.filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Audio URL is required".to_string()))
}

/// Decode the `url` parameter and accept only absolute http(s) URLs.
fn parse_audio_url(raw: &str) -> ApiResult<Url> {
    let invalid = || ApiError::BadRequest("Invalid audio URL format".to_string());

    let decoded = urlencoding::decode(raw).map_err(|_| invalid())?;
    let url = Url::parse(&decoded).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(invalid()),
    }
}

async fn stream_audio(
    State(state): State<AppState>,
    query: Result<Query<StreamQuery>, QueryRejection>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let Query(query) = query?;
    let url = parse_audio_url(&required_url(query.url)?)?;
    let format = AudioFormat::from_url(url.as_str());

    let mut request = state.http_client.get(url.clone());
    if let Some(range) = headers.get(header::RANGE).and_then(|v| v.to_str().ok()) {
        debug!("Forwarding range {} for {}", range, url);
        request = request.header("range", range);
    }

    let upstream = request.send().await.map_err(|err| {
        error!("Audio proxy request to {} failed: {}", url, err);
        let details = state.config.expose_error_details().then(|| err.to_string());
        ApiError::internal("Failed to stream audio", details)
    })?;

    let status = StatusCode::from_u16(upstream.status().as_u16())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    if !upstream.status().is_success() {
        error!("Audio upstream {} answered {}", url, status.as_u16());
        return Err(ApiError::Upstream {
            status,
            message: "Failed to fetch audio file".to_string(),
        });
    }

    let upstream_header = |name: &str| {
        upstream
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    let content_length = upstream_header("content-length");
    let content_range = upstream_header("content-range");

    let mut response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, format.content_type())
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CACHE_CONTROL, CACHE_CONTROL)
        .header(header::CONTENT_DISPOSITION, "inline");
    if let Some(length) = content_length {
        response = response.header(header::CONTENT_LENGTH, length);
    }
    if let Some(range) = content_range {
        response = response.header(header::CONTENT_RANGE, range);
    }

    response
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|err| {
            error!("Failed to build audio response: {}", err);
            ApiError::internal("Failed to stream audio", None)
        })
}

/// Playback candidates for an Opus recording, ordered for the caller's device.
async fn audio_sources(
    query: Result<Query<SourcesQuery>, QueryRejection>,
    headers: HeaderMap,
) -> ApiResult<Json<SourceSet>> {
    let Query(query) = query?;
    let url = required_url(query.url)?;
    let device = query.device.unwrap_or_else(|| {
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        DeviceType::from_user_agent(user_agent)
    });

    Ok(Json(source_set(&url, device)))
}
