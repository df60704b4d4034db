//! Shared controller state
//!
//! Holds the committed current video and the outbound notification bus.
//! Everything that serves the current video (streaming route, resync
//! broadcast, inspection route) reads it from here, so a pending transition
//! is never observable: only commits write `current_video`.

use tokio::sync::{broadcast, RwLock, RwLockWriteGuard};
use vsp_common::events::{EventBus, ServerNotification, VideoDescriptor};

/// Shared state accessible by all components
///
/// Uses RwLock for concurrent read access with rare writes
pub struct SharedState {
    /// Last committed selection (None when nothing is selected)
    current_video: RwLock<Option<VideoDescriptor>>,

    /// Outbound notification bus (SSE and WebSocket subscribers)
    events: EventBus,
}

impl SharedState {
    /// Create new shared state with the given notification buffer capacity
    pub fn new(event_capacity: usize) -> Self {
        Self {
            current_video: RwLock::new(None),
            events: EventBus::new(event_capacity),
        }
    }

    /// Broadcast a notification to all listeners
    pub fn broadcast(&self, notification: ServerNotification) {
        // No receivers is OK
        self.events.emit_lossy(notification);
    }

    /// Subscribe to outbound notifications
    pub fn subscribe(&self) -> broadcast::Receiver<ServerNotification> {
        self.events.subscribe()
    }

    /// Number of connected notification listeners
    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }

    /// Get the committed current video
    pub async fn get_current_video(&self) -> Option<VideoDescriptor> {
        self.current_video.read().await.clone()
    }

    /// Replace the committed current video
    pub async fn set_current_video(&self, video: Option<VideoDescriptor>) {
        *self.current_video.write().await = video;
    }

    /// Exclusive access to the committed current video
    ///
    /// Lets a caller check its own right to write and then write, with no
    /// other writer in between.
    pub async fn lock_current_video(&self) -> RwLockWriteGuard<'_, Option<VideoDescriptor>> {
        self.current_video.write().await
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_current_video() {
        let state = SharedState::default();

        // Default is None
        assert!(state.get_current_video().await.is_none());

        let video = VideoDescriptor::new(2, "/media/c.mp4", 77, "video/mp4");
        state.set_current_video(Some(video.clone())).await;
        assert_eq!(state.get_current_video().await, Some(video));

        state.set_current_video(None).await;
        assert!(state.get_current_video().await.is_none());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscribers() {
        let state = SharedState::new(8);
        let mut rx = state.subscribe();
        assert_eq!(state.subscriber_count(), 1);

        let video = VideoDescriptor::new(0, "a.mp4", 1, "video/mp4");
        state.broadcast(ServerNotification::CurrentVideo(video.clone()));

        assert_eq!(rx.recv().await.unwrap(), ServerNotification::CurrentVideo(video));
    }
}
