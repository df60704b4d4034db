//! WebSocket duplex channel to the display client
//!
//! Inbound text frames are envelopes (SET_CONFIG, NEXT, RESET); outbound
//! frames are CURRENT_VIDEO envelopes. A new session immediately receives the
//! current video, if any, without waiting for the next resync tick.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{debug, info, warn};
use uuid::Uuid;
use vsp_common::events::{ClientNotification, ServerNotification};

use super::server::AppContext;

/// GET /<service>/socket
pub async fn websocket_handler(ws: WebSocketUpgrade, State(ctx): State<AppContext>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, ctx))
}

async fn handle_socket(socket: WebSocket, ctx: AppContext) {
    let session_id = Uuid::new_v4();
    info!("WebSocket session {} connected", session_id);

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Subscribe before reading the current video so nothing committed in between is lost
    let mut outbound = BroadcastStream::new(ctx.controller.subscribe());
    let initial = ctx.controller.current_video().await;

    let send_task = tokio::spawn(async move {
        if let Some(video) = initial {
            if send_notification(&mut ws_sender, &ServerNotification::CurrentVideo(video))
                .await
                .is_err()
            {
                return;
            }
        }

        while let Some(item) = outbound.next().await {
            match item {
                Ok(notification) => {
                    if send_notification(&mut ws_sender, &notification).await.is_err() {
                        break;
                    }
                }
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!("WebSocket session {} lagged, skipped {}", session_id, skipped);
                }
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                match ClientNotification::from_json(&text, ctx.controller.service_name()) {
                    Ok(notification) => {
                        debug!("WebSocket session {}: {}", session_id, notification.name());
                        ctx.controller.handle(notification).await;
                    }
                    Err(e) => warn!("WebSocket session {}: {}", session_id, e),
                }
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                warn!("WebSocket session {} error: {}", session_id, e);
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
    info!("WebSocket session {} disconnected", session_id);
}

async fn send_notification<S>(sender: &mut S, notification: &ServerNotification) -> Result<(), ()>
where
    S: futures::Sink<Message> + Unpin,
{
    let text = match serde_json::to_string(&notification.to_envelope()) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to serialize {}: {}", notification.name(), e);
            return Ok(());
        }
    };
    sender.send(Message::Text(text)).await.map_err(|_| ())
}
