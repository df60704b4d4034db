//! Server-Sent Events (SSE) stream of outbound notifications

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

use super::server::AppContext;

/// GET /<service>/events
pub async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    vsp_common::sse::notification_sse_stream(
        env!("CARGO_PKG_NAME"),
        ctx.controller.subscribe(),
        ctx.sse_keepalive_secs,
    )
}
