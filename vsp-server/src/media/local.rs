//! Local disk implementation of [`MediaFs`]

use async_trait::async_trait;
use std::io;
use std::path::Path;
use tokio::fs;

use super::{MediaFs, MediaReader};

/// Serves media straight from the local filesystem via `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaFs for LocalFs {
    async fn exists(&self, path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    async fn size(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path).await?.len())
    }

    async fn open_read_stream(&self, path: &Path) -> io::Result<MediaReader> {
        let file = fs::File::open(path).await?;
        Ok(Box::pin(file))
    }
}
