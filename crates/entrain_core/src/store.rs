//! Clip Store
//!
//! Resolution contract for cached audio: the orchestrator's file-based
//! playback path depends only on `resolve(name) -> path` and a writer that
//! persists raw WAV bytes under an assigned name. How the cache is
//! populated (pre-synthesized speech, bundled assets) is someone else's
//! concern.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use crate::error::PlaybackError;

/// Name-to-path resolution plus byte persistence
pub trait ClipStore: Send + Sync {
    /// Look up a stored clip by name
    fn resolve(&self, name: &str) -> Option<PathBuf>;

    /// Persist raw WAV bytes; returns the assigned name
    fn store(&self, bytes: &[u8]) -> Result<String, PlaybackError>;
}

/// Directory-backed clip store
///
/// Names are derived from a content hash, so storing the same bytes twice
/// is idempotent.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Create a store rooted at an explicit directory
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, PlaybackError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|err| PlaybackError::StoreFailed(format!("{}: {err}", root.display())))?;
        Ok(Self { root })
    }

    /// Create a store under the user's cache directory
    pub fn in_user_cache() -> Result<Self, PlaybackError> {
        let dirs = ProjectDirs::from("", "", "entrain")
            .ok_or_else(|| PlaybackError::StoreFailed("no home directory".into()))?;
        Self::new(dirs.cache_dir().join("clips"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ClipStore for DirStore {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        // Names are flat; anything path-like is not ours
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return None;
        }
        let path = self.root.join(name);
        path.is_file().then_some(path)
    }

    fn store(&self, bytes: &[u8]) -> Result<String, PlaybackError> {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        let name = format!("clip-{:016x}.wav", hasher.finish());

        let path = self.root.join(&name);
        if !path.is_file() {
            fs::write(&path, bytes)
                .map_err(|err| PlaybackError::StoreFailed(format!("{}: {err}", path.display())))?;
            debug!(name = %name, bytes = bytes.len(), "clip persisted");
        }
        Ok(name)
    }
}
