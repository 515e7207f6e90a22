//! Disk caches for the character list and per-id sprite files.

use super::atomic::{atomic_read_json, atomic_write_bytes, atomic_write_json};
use crate::config::{validate_asset_id, FlappyConfig};
use crate::error::{FlappyError, Result};
use crate::models::CharacterEntry;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// List cache (`pokemon_list.json`) plus image cache (`<id>.png`).
///
/// Both live in the same directory. Reads never fail: a missing or corrupt
/// file is reported as a miss.
#[derive(Debug, Clone)]
pub struct LocalAssetCache {
    dir: PathBuf,
    list_path: PathBuf,
}

impl LocalAssetCache {
    /// Cache rooted at `dir` with the list stored in `list_path`.
    pub fn new(dir: impl Into<PathBuf>, list_path: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            list_path: list_path.into(),
        }
    }

    pub fn from_config(config: &FlappyConfig) -> Self {
        Self::new(config.catalog_dir(), config.list_cache_path())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn list_path(&self) -> &Path {
        &self.list_path
    }

    /// Parse the list cache.
    ///
    /// `Ok(None)` when the file is absent, `CacheCorruption` when it does not parse.
    pub fn load_list(&self) -> Result<Option<Vec<CharacterEntry>>> {
        atomic_read_json::<Vec<CharacterEntry>>(&self.list_path).map_err(|e| {
            FlappyError::CacheCorruption {
                path: self.list_path.clone(),
                message: e.to_string(),
            }
        })
    }

    /// Entries from the list cache if it holds at least `limit` of them.
    pub fn read_valid_list(&self, limit: usize) -> Option<Vec<CharacterEntry>> {
        match self.load_list() {
            Ok(Some(entries)) if entries.len() >= limit => Some(entries),
            Ok(Some(entries)) => {
                debug!(
                    "List cache stale: {} entries cached, {} requested",
                    entries.len(),
                    limit
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Ignoring list cache: {}", e);
                None
            }
        }
    }

    /// Whether the list cache exists, parses, and holds at least `limit` entries.
    pub fn is_valid(&self, limit: usize) -> bool {
        self.read_valid_list(limit).is_some()
    }

    /// Replace the list cache atomically.
    pub fn write_list(&self, entries: &[CharacterEntry]) -> Result<()> {
        atomic_write_json(&self.list_path, entries)?;
        debug!("Cached {} characters in {}", entries.len(), self.list_path.display());
        Ok(())
    }

    pub fn image_path(&self, id: &str) -> Result<PathBuf> {
        validate_asset_id(id)?;
        Ok(self.dir.join(format!("{}.png", id)))
    }

    pub fn has_image(&self, id: &str) -> bool {
        self.image_path(id).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Raw bytes of the cached sprite for `id`, if present and readable.
    pub fn read_image(&self, id: &str) -> Option<Vec<u8>> {
        let path = self.image_path(id).ok()?;
        if !path.is_file() {
            return None;
        }
        match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Failed to read cached sprite {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Store sprite bytes for `id`.
    pub fn write_image(&self, id: &str, bytes: &[u8]) -> Result<()> {
        let path = self.image_path(id)?;
        atomic_write_bytes(&path, bytes)
    }
}
