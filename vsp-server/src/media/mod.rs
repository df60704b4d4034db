//! Media filesystem capability
//!
//! The playlist core only needs four things from storage: does a file exist,
//! how big is it, what type is it, and a byte stream to serve. Keeping them
//! behind [`MediaFs`] lets tests control file presence without touching disk.

mod local;
mod memory;
pub mod mime;

pub use local::LocalFs;
pub use memory::MemoryFs;
pub use mime::mime_for_path;

use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::pin::Pin;
use tokio::io::AsyncRead;

/// Byte stream for one media file
pub type MediaReader = Pin<Box<dyn AsyncRead + Send>>;

/// Storage operations consumed by the playlist store and the streaming route
#[async_trait]
pub trait MediaFs: Send + Sync {
    /// True if `path` names an existing regular file
    async fn exists(&self, path: &Path) -> bool;

    /// Current size of the file in bytes
    async fn size(&self, path: &Path) -> io::Result<u64>;

    /// MIME type derived from the path
    fn mime_type(&self, path: &Path) -> String {
        mime_for_path(path).to_string()
    }

    /// Open the file for streaming
    async fn open_read_stream(&self, path: &Path) -> io::Result<MediaReader>;
}
