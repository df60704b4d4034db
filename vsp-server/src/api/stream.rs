//! Streaming endpoint
//!
//! `GET /<service>/video` serves whichever video is currently selected. The
//! URL never changes while the bytes behind it do, so every response disables
//! caching.

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use super::server::AppContext;

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// GET /<service>/video
///
/// 503 with an empty body when nothing is selected (or the file is gone).
pub async fn stream_video(State(ctx): State<AppContext>) -> Response {
    // Snapshot once; a commit during the response does not affect it
    let Some(video) = ctx.controller.current_video().await else {
        debug!("Video requested with nothing selected");
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    };

    let reader = match ctx
        .controller
        .media_fs()
        .open_read_stream(Path::new(&video.path))
        .await
    {
        Ok(reader) => reader,
        Err(e) => {
            warn!("Failed to open {}: {}", video.path, e);
            return StatusCode::SERVICE_UNAVAILABLE.into_response();
        }
    };

    debug!("Streaming [{}] {} ({} bytes)", video.index, video.name, video.size);
    let body = Body::from_stream(ReaderStream::new(reader.take(video.size)));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, video.mime_type),
            (header::CONTENT_LENGTH, video.size.to_string()),
            (header::CACHE_CONTROL, NO_CACHE.to_string()),
            (header::PRAGMA, "no-cache".to_string()),
            (header::EXPIRES, "0".to_string()),
        ],
        body,
    )
        .into_response()
}
