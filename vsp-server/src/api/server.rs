//! HTTP server setup and routing
//!
//! Every playlist route lives under `/<service-name>` so the display client
//! can address this server the same way it addresses its own module helper.

use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::playback::PlaylistController;

/// Shared application context passed to all handlers
///
/// **Note:** AppContext implements Clone, which gives us `FromRef<AppContext>` for free
/// via Axum's blanket implementation.
#[derive(Clone)]
pub struct AppContext {
    pub controller: Arc<PlaylistController>,
    pub sse_keepalive_secs: u64,
}

/// Build the router for a controller
///
/// Separate from [`run`] so tests can drive it with `tower::ServiceExt::oneshot`.
pub fn build_router(ctx: AppContext) -> Router {
    let prefix = format!("/{}", ctx.controller.service_name());

    let service_routes = Router::new()
        .route("/video", get(super::stream::stream_video))
        .route("/notify", post(super::handlers::notify))
        .route("/events", get(super::sse::event_stream))
        .route("/socket", get(super::socket::websocket_handler))
        .route("/playlist", get(super::handlers::playlist));

    Router::new()
        .route("/health", get(super::handlers::health))
        .route("/build_info", get(super::handlers::build_info))
        .nest(&prefix, service_routes)
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        // Display client is served from another origin
        .layer(CorsLayer::permissive())
}

/// Run HTTP API server until `shutdown` resolves
pub async fn run<F>(config: &ServerConfig, controller: Arc<PlaylistController>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let ctx = AppContext {
        controller,
        sse_keepalive_secs: config.sse_keepalive_secs,
    };
    let app = build_router(ctx);

    let addr: SocketAddr = config.socket_addr()?;
    info!("Starting HTTP server on {}", addr);
    info!(
        "Video endpoint: http://{}/{}/video",
        addr, config.service_name
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    Ok(())
}
