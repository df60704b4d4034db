//! HTTP, SSE and WebSocket surface of the playlist controller

pub mod handlers;
pub mod server;
pub mod socket;
pub mod sse;
pub mod stream;

pub use server::{build_router, run, AppContext};
