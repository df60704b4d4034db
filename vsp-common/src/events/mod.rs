//! Event types for the video server player notification protocol
//!
//! Provides the shared descriptor, the inbound/outbound notification enums and
//! the EventBus that fans outbound notifications out to every transport.

mod descriptor;
mod protocol;

pub use descriptor::VideoDescriptor;
pub use protocol::{ClientNotification, Envelope, NextPayload, ServerNotification, SetConfigPayload};

use tokio::sync::broadcast;

/// Broadcast bus for outbound notifications
///
/// Every transport (SSE stream, WebSocket session) subscribes independently.
/// Delivery is best-effort: a lagging subscriber loses the oldest events, and
/// the periodic CURRENT_VIDEO resync repairs whatever it missed.
pub struct EventBus {
    tx: broadcast::Sender<ServerNotification>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of notifications to buffer before dropping old ones
    ///
    /// # Examples
    ///
    /// ```
    /// use vsp_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.subscriber_count(), 0);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future notifications
    ///
    /// Notifications emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerNotification> {
        self.tx.subscribe()
    }

    /// Emit a notification to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        notification: ServerNotification,
    ) -> Result<usize, broadcast::error::SendError<ServerNotification>> {
        self.tx.send(notification)
    }

    /// Emit a notification, ignoring if no subscribers are listening
    ///
    /// # Examples
    ///
    /// ```
    /// use vsp_common::events::{EventBus, ServerNotification, VideoDescriptor};
    ///
    /// let event_bus = EventBus::new(16);
    /// // Nobody listening yet - silently dropped
    /// event_bus.emit_lossy(ServerNotification::CurrentVideo(
    ///     VideoDescriptor::new(0, "a.mp4", 1, "video/mp4"),
    /// ));
    /// ```
    pub fn emit_lossy(&self, notification: ServerNotification) {
        let _ = self.tx.send(notification);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
