//! Shared fixtures for vsp-server integration tests
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use vsp_common::events::{NextPayload, ServerNotification, SetConfigPayload, VideoDescriptor};
use vsp_server::media::MemoryFs;
use vsp_server::playback::PlaylistStore;
use vsp_server::{ControllerConfig, PlaylistController};

pub const SERVICE: &str = "MMM-VideoServerPlayer";

/// In-memory media tree; each file's contents is its own name
pub fn media(names: &[&str]) -> MemoryFs {
    let fs = MemoryFs::new();
    for name in names {
        fs.insert(*name, name.as_bytes().to_vec());
    }
    fs
}

/// Controller over `fs` with a seeded shuffle RNG
pub fn controller(fs: MemoryFs) -> Arc<PlaylistController> {
    let store = Arc::new(PlaylistStore::with_rng(Arc::new(fs), StdRng::seed_from_u64(42)));
    Arc::new(PlaylistController::with_store(ControllerConfig::default(), store))
}

pub fn set_config(videos: &[&str], shuffle: bool) -> SetConfigPayload {
    SetConfigPayload {
        videos: videos.iter().map(|s| s.to_string()).collect(),
        shuffle,
    }
}

pub fn next_after(index: usize) -> NextPayload {
    NextPayload {
        index: Some(index),
        timeout_ms: None,
    }
}

/// Sleep on the (usually paused) tokio clock so spawned transitions can run
pub async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

pub fn current_video(notification: ServerNotification) -> VideoDescriptor {
    match notification {
        ServerNotification::CurrentVideo(video) => video,
    }
}
