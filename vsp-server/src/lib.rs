//! # Video Server Player (vsp-server)
//!
//! Server-side playlist controller for a remote video display.
//!
//! **Purpose:** Track a playlist of video files, decide which one is current,
//! keep the display client informed (SET_CONFIG / NEXT in, CURRENT_VIDEO out,
//! periodic resync) and stream the current file's bytes over one fixed URL.
//!
//! **Architecture:** [`playback::PlaylistStore`] and [`playback::Selector`]
//! driven by [`playback::PlaylistController`], exposed over axum
//! (HTTP + SSE + WebSocket) with storage behind [`media::MediaFs`].

pub mod api;
pub mod config;
pub mod error;
pub mod media;
pub mod playback;
pub mod state;

pub use error::{Error, Result};
pub use playback::{ControllerConfig, PlaylistController};
pub use state::SharedState;
