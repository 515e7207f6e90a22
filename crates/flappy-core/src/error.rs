//! Error types for the Flappy core library.
//!
//! Storage failures propagate to callers. Remote, cache and asset failures are
//! absorbed by the asset resolver and only surface here so they can be logged
//! and classified.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the Flappy core library.
#[derive(Debug, Error)]
pub enum FlappyError {
    // Persistence errors
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // Remote catalog errors
    #[error("Remote catalog unavailable ({url}): {message}")]
    RemoteUnavailable {
        url: String,
        message: String,
        status_code: Option<u16>,
    },

    // Local cache errors
    #[error("Cache file {path:?} is corrupt: {message}")]
    CacheCorruption { path: PathBuf, message: String },

    #[error("No sprite available for {id}")]
    AssetMissing { id: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Image error: {message}")]
    Image {
        message: String,
        #[source]
        source: Option<image::ImageError>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Flappy operations.
pub type Result<T> = std::result::Result<T, FlappyError>;

impl From<std::io::Error> for FlappyError {
    fn from(err: std::io::Error) -> Self {
        FlappyError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for FlappyError {
    fn from(err: serde_json::Error) -> Self {
        FlappyError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for FlappyError {
    fn from(err: rusqlite::Error) -> Self {
        FlappyError::Storage {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for FlappyError {
    fn from(err: reqwest::Error) -> Self {
        FlappyError::RemoteUnavailable {
            url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            message: err.to_string(),
            status_code: err.status().map(|s| s.as_u16()),
        }
    }
}

impl From<image::ImageError> for FlappyError {
    fn from(err: image::ImageError) -> Self {
        FlappyError::Image {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl FlappyError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        FlappyError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Whether the asset pipeline recovers from this error by falling back
    /// to a lower tier or a default value.
    ///
    /// Storage errors are the only class that always reaches the caller.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            FlappyError::RemoteUnavailable { .. }
                | FlappyError::CacheCorruption { .. }
                | FlappyError::AssetMissing { .. }
                | FlappyError::Image { .. }
                | FlappyError::Json { .. }
                | FlappyError::Io { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FlappyError::AssetMissing { id: "25".into() };
        assert_eq!(err.to_string(), "No sprite available for 25");

        let err = FlappyError::RemoteUnavailable {
            url: "https://example.test/catalog".into(),
            message: "status 503".into(),
            status_code: Some(503),
        };
        assert_eq!(
            err.to_string(),
            "Remote catalog unavailable (https://example.test/catalog): status 503"
        );
    }

    #[test]
    fn test_storage_errors_are_not_degradable() {
        let err = FlappyError::from(rusqlite::Error::InvalidQuery);
        assert!(matches!(err, FlappyError::Storage { .. }));
        assert!(!err.is_degradable());
    }

    #[test]
    fn test_degradable_errors() {
        assert!(FlappyError::CacheCorruption {
            path: PathBuf::from("pokemon_list.json"),
            message: "trailing comma".into(),
        }
        .is_degradable());
        assert!(FlappyError::AssetMissing { id: "1".into() }.is_degradable());
        assert!(!FlappyError::Config {
            message: "empty url".into()
        }
        .is_degradable());
    }

    #[test]
    fn test_io_with_path_keeps_path() {
        let err = FlappyError::io_with_path(
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            "/tmp/bird.png",
        );
        match err {
            FlappyError::Io { path, .. } => assert_eq!(path, Some(PathBuf::from("/tmp/bird.png"))),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
