//! Playlist controller
//!
//! Ties the Playlist Store and the Current-Video Selector to the notification
//! protocol:
//! - SET_CONFIG reconciles the playlist and starts playback at index 0 when
//!   nothing is selected yet
//! - NEXT advances the selection, unless a transition is pending or there is
//!   nothing to advance from
//! - RESET forgets everything from a previous client session
//!
//! Outbound CURRENT_VIDEO is emitted by the Selector on each commit and
//! re-broadcast by a periodic resync task while something is selected.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use vsp_common::events::{
    ClientNotification, Envelope, NextPayload, ServerNotification, SetConfigPayload, VideoDescriptor,
};

use super::selector::{Selector, SelectorState};
use super::store::{ApplyOutcome, PlaylistStore};
use crate::error::Result;
use crate::media::MediaFs;
use crate::state::SharedState;

/// Timeout hint used when NEXT carries none
const DEFAULT_NEXT_TIMEOUT_MS: u64 = 1;

/// Runtime settings for one controller instance
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Route prefix and optional notification-name prefix
    pub service_name: String,
    /// Period of the CURRENT_VIDEO resync broadcast
    pub resync_interval: Duration,
    /// Subtracted from each NEXT timeout hint
    pub advance_decrement: Duration,
    /// Outbound notification buffer per subscriber
    pub event_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            service_name: "MMM-VideoServerPlayer".to_string(),
            resync_interval: Duration::from_millis(1000),
            advance_decrement: Duration::from_millis(50),
            event_capacity: 100,
        }
    }
}

/// Playlist controller instance
///
/// Everything the process used to keep in globals lives here; filesystem
/// access is injected through [`MediaFs`].
pub struct PlaylistController {
    config: ControllerConfig,
    store: Arc<PlaylistStore>,
    selector: Selector,
    state: Arc<SharedState>,
    shutdown: CancellationToken,
    resync_task: Mutex<Option<JoinHandle<()>>>,
}

impl PlaylistController {
    pub fn new(config: ControllerConfig, fs: Arc<dyn MediaFs>) -> Self {
        Self::with_store(config, Arc::new(PlaylistStore::new(fs)))
    }

    /// Build around an existing store (seeded RNG in tests)
    pub fn with_store(config: ControllerConfig, store: Arc<PlaylistStore>) -> Self {
        let state = Arc::new(SharedState::new(config.event_capacity));
        let selector = Selector::new(Arc::clone(&store), Arc::clone(&state), config.advance_decrement);
        Self {
            config,
            store,
            selector,
            state,
            shutdown: CancellationToken::new(),
            resync_task: Mutex::new(None),
        }
    }

    /// Dispatch one inbound notification
    pub async fn handle(&self, notification: ClientNotification) {
        match notification {
            ClientNotification::SetConfig(payload) => {
                self.set_config(payload).await;
            }
            ClientNotification::Next(payload) => {
                self.next(payload).await;
            }
            ClientNotification::Reset => self.reset().await,
        }
    }

    /// Decode and dispatch a raw envelope; returns the bare notification name
    pub async fn handle_envelope(&self, envelope: &Envelope) -> Result<&'static str> {
        let notification = ClientNotification::from_envelope(envelope, &self.config.service_name)?;
        let name = notification.name();
        self.handle(notification).await;
        Ok(name)
    }

    /// SET_CONFIG: reconcile the playlist, then start at 0 if nothing is selected
    pub async fn set_config(&self, payload: SetConfigPayload) -> ApplyOutcome {
        let outcome = self.store.apply_config(&payload.videos, payload.shuffle).await;
        if outcome == ApplyOutcome::Dropped {
            return outcome;
        }

        if self.store.is_empty().await {
            if outcome.changed() {
                info!("Playlist is empty, clearing selection");
                self.selector.clear().await;
            }
            return outcome;
        }

        let needs_start = outcome.changed() || !self.selector.has_committed();
        if needs_start && self.selector.state().await == SelectorState::Empty {
            self.selector.set_current_video(0, Duration::ZERO);
        }
        outcome
    }

    /// NEXT: advance past the given (or current) index
    ///
    /// Returns true if a transition was scheduled.
    pub async fn next(&self, payload: NextPayload) -> bool {
        if self.selector.is_pending() {
            debug!("NEXT ignored: transition pending");
            return false;
        }
        let len = self.store.len().await;
        if len == 0 {
            debug!("NEXT ignored: playlist empty");
            return false;
        }
        if self.selector.current().await.is_none() {
            debug!("NEXT ignored: nothing selected");
            return false;
        }

        // An absent index means "one before the start" so the next one is 0
        let from = payload.index.unwrap_or(len - 1);
        let hint = payload.timeout_ms.unwrap_or(DEFAULT_NEXT_TIMEOUT_MS);
        self.selector.advance(from, hint).await
    }

    /// RESET: empty the playlist, drop the selection and release the busy flag
    pub async fn reset(&self) {
        info!("Resetting playlist controller");
        self.selector.clear().await;
        self.store.clear().await;
    }

    /// Spawn the periodic CURRENT_VIDEO resync broadcast
    ///
    /// Calling it again while the task runs is a no-op.
    pub fn start(&self) {
        let mut slot = self.resync_task.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }

        let state = Arc::clone(&self.state);
        let shutdown = self.shutdown.clone();
        let period = self.config.resync_interval;

        *slot = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        debug!("Resync task stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        if let Some(video) = state.get_current_video().await {
                            state.broadcast(ServerNotification::CurrentVideo(video));
                        }
                    }
                }
            }
        }));
        info!("Resync broadcast every {:?}", period);
    }

    /// Stop background tasks
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerNotification> {
        self.state.subscribe()
    }

    /// Committed current video, as served by the streaming route
    pub async fn current_video(&self) -> Option<VideoDescriptor> {
        self.state.get_current_video().await
    }

    pub async fn playlist(&self) -> Vec<VideoDescriptor> {
        self.store.snapshot().await
    }

    pub async fn selector_state(&self) -> SelectorState {
        self.selector.state().await
    }

    pub fn media_fs(&self) -> Arc<dyn MediaFs> {
        self.store.media_fs()
    }

    pub fn service_name(&self) -> &str {
        &self.config.service_name
    }

    pub fn store(&self) -> &Arc<PlaylistStore> {
        &self.store
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }
}

impl Drop for PlaylistController {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
