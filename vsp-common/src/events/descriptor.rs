//! Video descriptor shared between the playlist controller and its clients

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Immutable snapshot of one playable item
///
/// Built by the playlist store on every rebuild and replaced wholesale on the
/// next one. Selection holds a clone, so a descriptor outlives the playlist
/// it was taken from until the next commit.
///
/// Wire format: `{index, name, path, size, type}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDescriptor {
    /// Position in the active playlist (0-based, contiguous)
    pub index: usize,
    /// Display label (file name component of `path`)
    pub name: String,
    /// Filesystem location, opaque beyond existence/size/type
    pub path: String,
    /// File size in bytes, stat'ed at rebuild time
    pub size: u64,
    /// MIME type derived from the path at rebuild time
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl VideoDescriptor {
    /// Build a descriptor, deriving the display name from the path
    pub fn new(index: usize, path: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        let path = path.into();
        let name = display_name(&path);
        Self {
            index,
            name,
            path,
            size,
            mime_type: mime_type.into(),
        }
    }
}

/// Last path component, or the whole string when there is none
fn display_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
