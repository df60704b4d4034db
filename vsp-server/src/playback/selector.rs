//! Current-Video Selector
//!
//! Small state machine deciding which descriptor is "current":
//!
//! ```text
//!   Empty ──set_current_video──▶ Transitioning ──commit──▶ Playing(i)
//!     ▲                                                      │
//!     └──────────── playlist emptied / clear ◀───────────────┘
//! ```
//!
//! At most one transition is pending at any time. A second request while one
//! is pending is dropped, so two close signals never interleave two commits.
//! Commits always run on a spawned task, even for a zero delay.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use vsp_common::events::{ServerNotification, VideoDescriptor};

use super::store::PlaylistStore;
use crate::state::SharedState;

/// Observable selector state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    /// Nothing selected
    Empty,
    /// A change is scheduled but not yet committed
    Transitioning,
    /// Committed selection
    Playing(usize),
}

impl SelectorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectorState::Empty => "empty",
            SelectorState::Transitioning => "transitioning",
            SelectorState::Playing(_) => "playing",
        }
    }
}

struct PendingTransition {
    ticket: u64,
    handle: JoinHandle<()>,
}

/// Debounced, single-flight current-video selector
///
/// Cheap to clone; clones share the same pending slot and committed state.
#[derive(Clone)]
pub struct Selector {
    store: Arc<PlaylistStore>,
    state: Arc<SharedState>,
    pending: Arc<Mutex<Option<PendingTransition>>>,
    tickets: Arc<AtomicU64>,
    has_committed: Arc<AtomicBool>,
    advance_decrement: Duration,
}

impl Selector {
    pub fn new(store: Arc<PlaylistStore>, state: Arc<SharedState>, advance_decrement: Duration) -> Self {
        Self {
            store,
            state,
            pending: Arc::new(Mutex::new(None)),
            tickets: Arc::new(AtomicU64::new(0)),
            has_committed: Arc::new(AtomicBool::new(false)),
            advance_decrement,
        }
    }

    /// Schedule a commit of `index` after `delay`
    ///
    /// Returns false (and schedules nothing) if a transition is already pending.
    pub fn set_current_video(&self, index: usize, delay: Duration) -> bool {
        let mut slot = self.lock_pending();
        if slot.as_ref().is_some_and(|p| !p.handle.is_finished()) {
            debug!("Transition already pending, ignoring request for index {}", index);
            return false;
        }

        let ticket = self.tickets.fetch_add(1, Ordering::Relaxed) + 1;
        let selector = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            selector.commit(ticket, index).await;
        });
        *slot = Some(PendingTransition { ticket, handle });

        debug!("Transition to index {} scheduled in {:?}", index, delay);
        true
    }

    /// Move to the entry after `from_index`, wrapping at the end
    ///
    /// `timeout_hint_ms` is the client's remaining playback time; the fixed
    /// decrement is subtracted so repeated hints converge toward zero.
    /// Returns true if a transition was scheduled.
    pub async fn advance(&self, from_index: usize, timeout_hint_ms: u64) -> bool {
        let len = self.store.len().await;
        if len == 0 {
            debug!("Advance on empty playlist, clearing selection");
            self.state.set_current_video(None).await;
            return false;
        }

        let next = (from_index % len + 1) % len;
        if self.current_index().await == Some(next) {
            debug!("Advance target {} is already current, ignoring", next);
            return false;
        }

        let delay = Duration::from_millis(timeout_hint_ms).saturating_sub(self.advance_decrement);
        self.set_current_video(next, delay)
    }

    /// Abort any pending transition and drop the committed selection
    pub async fn clear(&self) {
        // Held with the slot so a racing commit() either lands first or finds the slot empty
        let mut current = self.state.lock_current_video().await;
        if let Some(pending) = self.lock_pending().take() {
            pending.handle.abort();
        }
        self.has_committed.store(false, Ordering::Release);
        *current = None;
    }

    pub async fn state(&self) -> SelectorState {
        if self.is_pending() {
            return SelectorState::Transitioning;
        }
        match self.current_index().await {
            Some(index) => SelectorState::Playing(index),
            None => SelectorState::Empty,
        }
    }

    /// Last committed descriptor (never a pending one)
    pub async fn current(&self) -> Option<VideoDescriptor> {
        self.state.get_current_video().await
    }

    /// True while a scheduled transition has not committed yet
    pub fn is_pending(&self) -> bool {
        self.lock_pending()
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    /// True once any transition has committed since start (or the last clear)
    pub fn has_committed(&self) -> bool {
        self.has_committed.load(Ordering::Acquire)
    }

    async fn current_index(&self) -> Option<usize> {
        self.state.get_current_video().await.map(|v| v.index)
    }

    async fn commit(&self, ticket: u64, index: usize) {
        let video = self.store.get_wrapping(index).await;
        let mut current = self.state.lock_current_video().await;

        // A clear() or newer transition replaced this one while we slept
        if !self.owns_slot(ticket) {
            return;
        }

        *current = video.clone();
        if video.is_some() {
            self.has_committed.store(true, Ordering::Release);
        }
        self.release_slot(ticket);
        drop(current);

        match video {
            Some(video) => {
                info!("Current video: [{}] {}", video.index, video.name);
                self.state.broadcast(ServerNotification::CurrentVideo(video));
            }
            None => debug!("Playlist empty at commit, selection cleared"),
        }
    }

    fn owns_slot(&self, ticket: u64) -> bool {
        self.lock_pending()
            .as_ref()
            .is_some_and(|p| p.ticket == ticket)
    }

    fn release_slot(&self, ticket: u64) {
        let mut slot = self.lock_pending();
        if slot.as_ref().is_some_and(|p| p.ticket == ticket) {
            *slot = None;
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<PendingTransition>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
