//! # Video Server Player Common Library
//!
//! Shared code for the video server player service and its tooling:
//! - Notification protocol types (descriptor, inbound/outbound notifications)
//! - EventBus for outbound notification fan-out
//! - Bootstrap configuration loading
//! - SSE helpers

pub mod config;
pub mod error;
pub mod events;
pub mod sse;

pub use error::{Error, Result};
pub use events::{ClientNotification, EventBus, ServerNotification, VideoDescriptor};
