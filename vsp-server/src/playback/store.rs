//! Playlist Store
//!
//! Owns the ordered list of video descriptors and reconciles a requested
//! path list against it.
//!
//! - Requested paths are deduplicated (first occurrence wins) and filtered to
//!   files that currently exist.
//! - The playlist is rebuilt only when the path *set* changed or the shuffle
//!   flag flipped, so the client's periodic re-push of the same configuration
//!   never re-indexes the playlist (and never restarts playback).
//! - Sizes and MIME types are re-derived on every rebuild.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use vsp_common::events::VideoDescriptor;

use super::busy::BusyGuard;
use crate::media::MediaFs;

/// Result of [`PlaylistStore::apply_config`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Another configuration was still being processed, or a reset
    /// superseded this one; nothing was done
    Dropped,
    /// Same path set and shuffle flag; playlist untouched
    Unchanged,
    /// Playlist rebuilt and re-indexed
    Rebuilt {
        /// Paths present now but not before
        added: usize,
        /// Paths present before but not now
        removed: usize,
        /// New playlist length
        len: usize,
    },
}

impl ApplyOutcome {
    /// True if the playlist was rebuilt
    pub fn changed(&self) -> bool {
        matches!(self, ApplyOutcome::Rebuilt { .. })
    }
}

#[derive(Debug, Default)]
struct PlaylistState {
    videos: Vec<VideoDescriptor>,
    shuffle: bool,
}

/// Ordered playlist with busy-guarded reconciliation
pub struct PlaylistStore {
    fs: Arc<dyn MediaFs>,
    state: RwLock<PlaylistState>,
    busy: BusyGuard,
    rng: Mutex<StdRng>,
}

impl PlaylistStore {
    /// Create an empty store with an entropy-seeded shuffle RNG
    pub fn new(fs: Arc<dyn MediaFs>) -> Self {
        Self::with_rng(fs, StdRng::from_entropy())
    }

    /// Create an empty store with a caller-provided shuffle RNG
    pub fn with_rng(fs: Arc<dyn MediaFs>, rng: StdRng) -> Self {
        Self {
            fs,
            state: RwLock::new(PlaylistState::default()),
            busy: BusyGuard::new(),
            rng: Mutex::new(rng),
        }
    }

    /// Reconcile the playlist with a requested path list
    ///
    /// Dropped without effect if another call is in progress, or if
    /// [`clear`](Self::clear) ran before the rebuilt playlist was stored.
    pub async fn apply_config(&self, requested: &[String], shuffle: bool) -> ApplyOutcome {
        let Some(hold) = self.busy.hold() else {
            debug!("Playlist busy, dropping configuration ({} paths)", requested.len());
            return ApplyOutcome::Dropped;
        };

        let wanted = self.existing_unique(requested.iter().map(String::as_str)).await;

        let (current_paths, current_shuffle) = {
            let state = self.state.read().await;
            let paths: Vec<String> = state.videos.iter().map(|v| v.path.clone()).collect();
            (paths, state.shuffle)
        };
        let have = self.existing_unique(current_paths.iter().map(String::as_str)).await;

        let wanted_set: HashSet<&str> = wanted.iter().map(String::as_str).collect();
        let have_set: HashSet<&str> = have.iter().map(String::as_str).collect();
        let added = wanted_set.difference(&have_set).count();
        let removed = have_set.difference(&wanted_set).count();

        if added + removed == 0 && shuffle == current_shuffle {
            debug!("Playlist unchanged ({} videos)", have.len());
            return ApplyOutcome::Unchanged;
        }

        let mut order = wanted;
        if shuffle {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            order.shuffle(&mut *rng);
        }

        let videos = self.describe(order).await;
        let len = videos.len();
        {
            let mut state = self.state.write().await;
            // A reset cleared the store and took the busy flag while we were checking files
            if !hold.is_current() {
                info!("Playlist reset during rebuild, discarding {} videos", len);
                return ApplyOutcome::Dropped;
            }
            state.videos = videos;
            state.shuffle = shuffle;
        }

        info!(
            "Playlist rebuilt: {} videos (+{} -{}, shuffle={})",
            len, added, removed, shuffle
        );
        ApplyOutcome::Rebuilt { added, removed, len }
    }

    /// Drop every descriptor, reset the shuffle flag and release the busy flag
    ///
    /// A rebuild still in flight loses its hold and discards its result.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.videos.clear();
        state.shuffle = false;
        self.busy.release();
    }

    /// Busy guard protecting [`apply_config`](Self::apply_config)
    pub fn busy(&self) -> &BusyGuard {
        &self.busy
    }

    /// Storage backing this playlist
    pub fn media_fs(&self) -> Arc<dyn MediaFs> {
        Arc::clone(&self.fs)
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.videos.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.videos.is_empty()
    }

    pub async fn shuffle_enabled(&self) -> bool {
        self.state.read().await.shuffle
    }

    /// Descriptor at `index`
    pub async fn get(&self, index: usize) -> Option<VideoDescriptor> {
        self.state.read().await.videos.get(index).cloned()
    }

    /// Descriptor at `index` modulo the current length; None only when empty
    ///
    /// Reads under a single lock so a concurrent rebuild cannot shrink the
    /// playlist between the length check and the lookup.
    pub async fn get_wrapping(&self, index: usize) -> Option<VideoDescriptor> {
        let state = self.state.read().await;
        match state.videos.len() {
            0 => None,
            len => state.videos.get(index % len).cloned(),
        }
    }

    /// Copy of the whole playlist
    pub async fn snapshot(&self) -> Vec<VideoDescriptor> {
        self.state.read().await.videos.clone()
    }

    /// Deduplicate (first occurrence wins) and keep existing files only
    async fn existing_unique<'a, I>(&self, paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for path in paths {
            if !seen.insert(path) {
                continue;
            }
            if self.fs.exists(Path::new(path)).await {
                out.push(path.to_string());
            } else {
                debug!("Skipping missing video: {}", path);
            }
        }
        out
    }

    /// Stat each path and assign contiguous indices
    async fn describe(&self, order: Vec<String>) -> Vec<VideoDescriptor> {
        let mut videos = Vec::with_capacity(order.len());
        for path in order {
            let p = Path::new(&path);
            match self.fs.size(p).await {
                Ok(size) => {
                    let mime_type = self.fs.mime_type(p);
                    videos.push(VideoDescriptor::new(videos.len(), path, size, mime_type));
                }
                Err(e) => warn!("Video vanished during rebuild, skipping {}: {}", path, e),
            }
        }
        videos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MemoryFs;

    fn paths(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn store_with(files: &[(&str, usize)]) -> (PlaylistStore, MemoryFs) {
        let fs = MemoryFs::new();
        for (path, size) in files {
            fs.insert(*path, vec![0u8; *size]);
        }
        let store = PlaylistStore::with_rng(Arc::new(fs.clone()), StdRng::seed_from_u64(7));
        (store, fs)
    }

    async fn playlist_paths(store: &PlaylistStore) -> Vec<String> {
        store.snapshot().await.into_iter().map(|v| v.path).collect()
    }

    #[tokio::test]
    async fn test_rebuild_assigns_contiguous_indices() {
        let (store, _fs) = store_with(&[("a.mp4", 3), ("b.webm", 5)]);

        let outcome = store.apply_config(&paths(&["a.mp4", "b.webm"]), false).await;
        assert_eq!(outcome, ApplyOutcome::Rebuilt { added: 2, removed: 0, len: 2 });

        let videos = store.snapshot().await;
        assert_eq!(videos[0], VideoDescriptor::new(0, "a.mp4", 3, "video/mp4"));
        assert_eq!(videos[1], VideoDescriptor::new(1, "b.webm", 5, "video/webm"));
    }

    #[tokio::test]
    async fn test_identical_config_is_idempotent() {
        let (store, _fs) = store_with(&[("a.mp4", 1), ("b.mp4", 1)]);
        let requested = paths(&["a.mp4", "b.mp4"]);

        assert!(store.apply_config(&requested, false).await.changed());
        assert_eq!(store.apply_config(&requested, false).await, ApplyOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_reordering_alone_is_not_a_change() {
        let (store, _fs) = store_with(&[("a.mp4", 1), ("b.mp4", 1)]);

        store.apply_config(&paths(&["a.mp4", "b.mp4"]), false).await;
        let outcome = store.apply_config(&paths(&["b.mp4", "a.mp4"]), false).await;

        assert_eq!(outcome, ApplyOutcome::Unchanged);
        assert_eq!(playlist_paths(&store).await, paths(&["a.mp4", "b.mp4"]));
    }

    #[tokio::test]
    async fn test_duplicates_and_missing_files_are_filtered() {
        let (store, _fs) = store_with(&[("a.mp4", 1), ("c.mp4", 1)]);

        let outcome = store
            .apply_config(&paths(&["c.mp4", "missing.mp4", "a.mp4", "c.mp4", "a.mp4"]), false)
            .await;

        assert_eq!(outcome, ApplyOutcome::Rebuilt { added: 2, removed: 0, len: 2 });
        assert_eq!(playlist_paths(&store).await, paths(&["c.mp4", "a.mp4"]));
    }

    #[tokio::test]
    async fn test_added_and_removed_counts() {
        let (store, _fs) = store_with(&[("a.mp4", 1), ("b.mp4", 1), ("c.mp4", 1)]);

        store.apply_config(&paths(&["a.mp4", "b.mp4"]), false).await;
        let outcome = store.apply_config(&paths(&["b.mp4", "c.mp4"]), false).await;

        assert_eq!(outcome, ApplyOutcome::Rebuilt { added: 1, removed: 1, len: 2 });
        assert_eq!(playlist_paths(&store).await, paths(&["b.mp4", "c.mp4"]));
    }

    #[tokio::test]
    async fn test_shuffle_flag_flip_rebuilds_with_same_membership() {
        let names: Vec<String> = (0..12).map(|i| format!("v{:02}.mp4", i)).collect();
        let files: Vec<(&str, usize)> = names.iter().map(|n| (n.as_str(), 1)).collect();
        let (store, _fs) = store_with(&files);

        store.apply_config(&names, false).await;
        let outcome = store.apply_config(&names, true).await;
        assert_eq!(outcome, ApplyOutcome::Rebuilt { added: 0, removed: 0, len: 12 });
        assert!(store.shuffle_enabled().await);

        let videos = store.snapshot().await;
        let mut shuffled: Vec<String> = videos.iter().map(|v| v.path.clone()).collect();
        let indices: Vec<usize> = videos.iter().map(|v| v.index).collect();
        assert_eq!(indices, (0..12).collect::<Vec<_>>());

        shuffled.sort();
        assert_eq!(shuffled, names);
    }

    #[tokio::test]
    async fn test_busy_store_drops_config() {
        let (store, _fs) = store_with(&[("a.mp4", 1)]);

        assert!(store.busy().try_acquire());
        let outcome = store.apply_config(&paths(&["a.mp4"]), false).await;
        assert_eq!(outcome, ApplyOutcome::Dropped);
        assert!(store.is_empty().await);

        store.busy().release();
        assert!(store.apply_config(&paths(&["a.mp4"]), false).await.changed());
        assert!(!store.busy().is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_during_rebuild_discards_result() {
        let fs = MemoryFs::new().with_latency(std::time::Duration::from_millis(100));
        fs.insert("a.mp4", vec![0u8; 1]);
        let store = Arc::new(PlaylistStore::with_rng(Arc::new(fs), StdRng::seed_from_u64(7)));

        let rebuild = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.apply_config(&paths(&["a.mp4"]), false).await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        store.clear().await;
        assert!(!store.busy().is_busy());

        assert_eq!(rebuild.await.unwrap(), ApplyOutcome::Dropped);
        assert!(store.is_empty().await);
        assert!(!store.busy().is_busy());
    }

    #[tokio::test]
    async fn test_sizes_restated_on_rebuild() {
        let (store, fs) = store_with(&[("a.mp4", 4)]);
        store.apply_config(&paths(&["a.mp4"]), false).await;
        assert_eq!(store.get(0).await.unwrap().size, 4);

        fs.insert("a.mp4", vec![0u8; 9]);
        fs.insert("b.mp4", vec![0u8; 1]);
        store.apply_config(&paths(&["a.mp4", "b.mp4"]), false).await;
        assert_eq!(store.get(0).await.unwrap().size, 9);
    }

    #[tokio::test]
    async fn test_deleted_file_is_invisible_to_reconciliation() {
        let (store, fs) = store_with(&[("a.mp4", 1), ("b.mp4", 1)]);
        store.apply_config(&paths(&["a.mp4", "b.mp4"]), false).await;

        fs.remove("b.mp4");
        let outcome = store.apply_config(&paths(&["a.mp4"]), false).await;

        // b is missing from both filtered sets, so the reconciliation sees no change
        assert_eq!(outcome, ApplyOutcome::Unchanged);
        assert_eq!(store.len().await, 2);

        fs.insert("c.mp4", vec![0u8; 1]);
        let outcome = store.apply_config(&paths(&["a.mp4", "c.mp4"]), false).await;
        assert_eq!(outcome, ApplyOutcome::Rebuilt { added: 1, removed: 0, len: 2 });
        assert_eq!(playlist_paths(&store).await, paths(&["a.mp4", "c.mp4"]));
    }

    #[tokio::test]
    async fn test_get_wrapping_and_clear() {
        let (store, _fs) = store_with(&[("a.mp4", 1), ("b.mp4", 1)]);
        assert!(store.get_wrapping(0).await.is_none());

        store.apply_config(&paths(&["a.mp4", "b.mp4"]), true).await;
        assert_eq!(store.get_wrapping(5).await.unwrap().index, 1);

        store.clear().await;
        assert!(store.is_empty().await);
        assert!(!store.shuffle_enabled().await);
    }
}
