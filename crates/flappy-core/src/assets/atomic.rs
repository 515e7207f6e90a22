//! Atomic file writes for the list cache and sprite files.
//!
//! Writes go to a uniquely named temp file in the target's directory, are
//! flushed and synced, and then renamed over the target in one step. The
//! previous file is never removed first, so a reader sees either the old
//! content or the new content.

use crate::{FlappyError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Read and parse a JSON file.
///
/// Returns `None` if the file doesn't exist, or an error if reading or
/// parsing fails.
pub fn atomic_read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(FlappyError::Io {
                message: format!("Failed to read {}", path.display()),
                path: Some(path.to_path_buf()),
                source: Some(e),
            })
        }
    };

    let data: T = serde_json::from_str(&contents).map_err(|e| FlappyError::Json {
        message: format!("Failed to parse {}: {}", path.display(), e),
        source: Some(e),
    })?;

    Ok(Some(data))
}

/// Serialize `data` as JSON and write it to `path` atomically.
pub fn atomic_write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let serialized = serde_json::to_vec_pretty(data).map_err(|e| FlappyError::Json {
        message: format!("Failed to serialize data: {}", e),
        source: Some(e),
    })?;
    atomic_write_bytes(path, &serialized)
}

/// Write raw bytes to `path` atomically.
pub fn atomic_write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.exists() {
        fs::create_dir_all(parent).map_err(|e| FlappyError::Io {
            message: format!("Failed to create directory {}", parent.display()),
            path: Some(parent.to_path_buf()),
            source: Some(e),
        })?;
    }

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| FlappyError::Io {
        message: format!("Failed to create temp file in {}", parent.display()),
        path: Some(parent.to_path_buf()),
        source: Some(e),
    })?;

    temp.write_all(bytes).map_err(|e| FlappyError::Io {
        message: format!("Failed to write temp file {}", temp.path().display()),
        path: Some(temp.path().to_path_buf()),
        source: Some(e),
    })?;
    temp.flush()?;
    temp.as_file().sync_all().map_err(|e| FlappyError::Io {
        message: format!("Failed to sync temp file {}", temp.path().display()),
        path: Some(temp.path().to_path_buf()),
        source: Some(e),
    })?;

    // The temp file is removed on drop if the rename fails.
    temp.persist(path).map_err(|e| FlappyError::Io {
        message: format!("Failed to replace {}", path.display()),
        path: Some(path.to_path_buf()),
        source: Some(e.error),
    })?;

    debug!("Atomically wrote {}", path.display());
    Ok(())
}
