//! In-memory implementation of [`MediaFs`]
//!
//! Used by tests (and handy for demos): files can be added and removed while
//! the controller runs, and an optional latency is applied to every
//! existence check so overlapping configuration pushes can be reproduced
//! deterministically under a paused tokio clock.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use super::{MediaFs, MediaReader};

/// Shared in-memory file table
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
    latency: Duration,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every `exists` call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Add or replace a file
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), contents.into());
    }

    /// Delete a file; returns true if it was present
    pub fn remove(&self, path: impl AsRef<Path>) -> bool {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path.as_ref())
            .is_some()
    }

    fn contents(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }
}

#[async_trait]
impl MediaFs for MemoryFs {
    async fn exists(&self, path: &Path) -> bool {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }

    async fn size(&self, path: &Path) -> io::Result<u64> {
        Ok(self.contents(path)?.len() as u64)
    }

    async fn open_read_stream(&self, path: &Path) -> io::Result<MediaReader> {
        Ok(Box::pin(io::Cursor::new(self.contents(path)?)))
    }
}
