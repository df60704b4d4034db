//! HTTP request handlers
//!
//! Health/build information, the inbound notification endpoint and the
//! playlist inspection endpoint.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::{debug, warn};
use vsp_common::events::{Envelope, VideoDescriptor};

use super::server::AppContext;
use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

#[derive(Debug, Serialize)]
pub struct BuildInfoResponse {
    version: String,
    git_hash: String,
    build_timestamp: String,
    build_profile: String,
}

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    shuffle: bool,
    videos: Vec<VideoDescriptor>,
    current: Option<VideoDescriptor>,
    state: String,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /build_info
pub async fn build_info() -> Json<BuildInfoResponse> {
    Json(BuildInfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
        build_profile: env!("BUILD_PROFILE").to_string(),
    })
}

/// POST /<service>/notify
///
/// Body is an envelope: `{"notification": "SET_CONFIG", "payload": {...}}`.
/// The notification is fully processed before the response is sent.
pub async fn notify(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> Result<(StatusCode, Json<StatusResponse>)> {
    let envelope: Envelope = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejected malformed notification: {}", e);
        Error::Protocol(format!("malformed envelope: {}", e))
    })?;

    let name = ctx.controller.handle_envelope(&envelope).await.map_err(|e| {
        warn!("Rejected notification '{}': {}", envelope.notification, e);
        e
    })?;
    debug!("Handled {} notification", name);

    Ok((
        StatusCode::ACCEPTED,
        Json(StatusResponse {
            status: "accepted".to_string(),
        }),
    ))
}

/// GET /<service>/playlist
pub async fn playlist(State(ctx): State<AppContext>) -> Json<PlaylistResponse> {
    let controller = &ctx.controller;
    Json(PlaylistResponse {
        shuffle: controller.store().shuffle_enabled().await,
        videos: controller.playlist().await,
        current: controller.current_video().await,
        state: controller.selector_state().await.as_str().to_string(),
    })
}
