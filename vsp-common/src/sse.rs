//! Server-Sent Events (SSE) utilities
//!
//! Turns an EventBus subscription into an axum SSE response.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::events::ServerNotification;

/// Create an SSE stream of outbound notifications
///
/// Emits a `ConnectionStatus: connected` event first, then one SSE event per
/// notification (`event:` is the notification name, `data:` its JSON payload).
/// A lagging client skips what it missed; the resync broadcast catches it up.
///
/// # Example
/// ```rust,ignore
/// pub async fn event_stream(
///     State(ctx): State<AppContext>,
/// ) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
///     vsp_common::sse::notification_sse_stream("vsp-server", ctx.controller.subscribe(), 15)
/// }
/// ```
pub fn notification_sse_stream(
    service_name: &'static str,
    mut rx: broadcast::Receiver<ServerNotification>,
    keepalive_secs: u64,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to {} notifications", service_name);

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(notification) => {
                    match Event::default()
                        .event(notification.name())
                        .json_data(notification.payload())
                    {
                        Ok(event) => {
                            debug!("SSE: sending {}", notification.name());
                            yield Ok(event);
                        }
                        Err(e) => warn!("Failed to serialize notification: {}", e),
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("SSE client lagged, skipped {} notifications", skipped);
                }
                Err(RecvError::Closed) => {
                    info!("SSE: {} notification stream closed", service_name);
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(keepalive_secs.max(1)))
            .text("keep-alive"),
    )
}
