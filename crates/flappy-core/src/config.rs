//! Centralized configuration for the Flappy core library.
//!
//! Constant groups hold the fixed values shared with the rest of the game.
//! [`FlappyConfig`] carries everything that varies per installation and is
//! passed to components at construction time.

use crate::assets::atomic::atomic_read_json;
use crate::error::{FlappyError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Gameplay defaults.
pub struct GameConfig;

impl GameConfig {
    pub const STARTING_LEVEL: u32 = 1;
    pub const STARTING_LIFE: u32 = 3;
    pub const DEFAULT_CHARACTER_LIMIT: usize = 20;
    pub const DEFAULT_USERNAME: &'static str = "guest";
}

/// Values every caller must observe for a user with no stored selection.
pub struct SelectionDefaults;

impl SelectionDefaults {
    pub const BUILTIN_ID: &'static str = "bird";
    pub const SPRITE_PATH: &'static str = "bird.png";
    pub const DISPLAY_NAME: &'static str = "Flappy Bird";
    pub const TYPE_TAG: &'static str = "Bird";
    pub const HEIGHT_M: f64 = 0.3;
    pub const WEIGHT_KG: f64 = 0.2;
    /// Size of the generated placeholder used when no default sprite file exists.
    pub const PLACEHOLDER_SIZE: (u32, u32) = (34, 24);
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
    pub const USER_AGENT: &'static str = "Flappy-Core/1.0";
    pub const CATALOG_API_BASE: &'static str = "https://pokeapi.co/api/v2";
    pub const CATALOG_LIST_ENDPOINT: &'static str = "pokemon";
    pub const SPRITE_CDN_BASE: &'static str =
        "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";
    pub const MEMORY_CACHE_CAPACITY: u64 = 256;
}

/// Directory and file names under the base directory.
pub struct PathsConfig;

impl PathsConfig {
    pub const ASSETS_DIR_NAME: &'static str = "assets";
    pub const CATALOG_DIR_NAME: &'static str = "pokemon";
    pub const LIST_CACHE_FILENAME: &'static str = "pokemon_list.json";
    pub const DEFAULT_SPRITE_FILENAME: &'static str = "bird.png";
    pub const DATABASE_FILENAME: &'static str = "flappy_bird.db";
    pub const CONFIG_FILENAME: &'static str = "flappy.json";
}

/// SQLite connection settings.
pub struct StoreConfig;

impl StoreConfig {
    pub const BUSY_TIMEOUT_MS: u64 = 5_000;
}

/// Runtime configuration for one installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct FlappyConfig {
    /// Root directory holding `assets/` and the database.
    pub base_dir: PathBuf,
    /// Base URL of the character catalog API.
    pub catalog_base_url: String,
    /// Path of the list endpoint relative to `catalog_base_url`.
    pub list_endpoint: String,
    /// Base URL serving `<id>.png` sprites.
    pub sprite_cdn_url: String,
    pub request_timeout_secs: u64,
    /// Number of characters requested from the catalog.
    pub character_limit: usize,
    pub memory_cache_capacity: u64,
}

impl Default for FlappyConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            catalog_base_url: NetworkConfig::CATALOG_API_BASE.to_string(),
            list_endpoint: NetworkConfig::CATALOG_LIST_ENDPOINT.to_string(),
            sprite_cdn_url: NetworkConfig::SPRITE_CDN_BASE.to_string(),
            request_timeout_secs: NetworkConfig::REQUEST_TIMEOUT.as_secs(),
            character_limit: GameConfig::DEFAULT_CHARACTER_LIMIT,
            memory_cache_capacity: NetworkConfig::MEMORY_CACHE_CAPACITY,
        }
    }
}

impl FlappyConfig {
    /// Default configuration rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Load `<base_dir>/flappy.json` if present, otherwise use defaults.
    ///
    /// The base directory always wins over any `base_dir` stored in the file.
    pub fn load(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let path = base_dir.join(PathsConfig::CONFIG_FILENAME);
        let mut config = atomic_read_json::<FlappyConfig>(&path)?.unwrap_or_default();
        config.base_dir = base_dir;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the pipeline unusable.
    pub fn validate(&self) -> Result<()> {
        let urls = [
            ("catalog_base_url", &self.catalog_base_url),
            ("sprite_cdn_url", &self.sprite_cdn_url),
        ];
        for (field, value) in urls {
            if value.trim().is_empty() {
                return Err(FlappyError::Config {
                    message: format!("{} must not be empty", field),
                });
            }
            url::Url::parse(value).map_err(|e| FlappyError::Config {
                message: format!("{} is not a valid URL: {}", field, e),
            })?;
        }
        if self.character_limit == 0 {
            return Err(FlappyError::Config {
                message: "character_limit must be at least 1".to_string(),
            });
        }
        // The built-in sprite never enters the memory cache, so one slot per
        // catalog character keeps a whole selection list resident.
        if self.memory_cache_capacity < self.character_limit as u64 {
            return Err(FlappyError::Config {
                message: format!(
                    "memory_cache_capacity ({}) must be at least character_limit ({})",
                    self.memory_cache_capacity, self.character_limit
                ),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(FlappyError::Config {
                message: "request_timeout_secs must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.base_dir.join(PathsConfig::ASSETS_DIR_NAME)
    }

    /// Directory holding the list cache and per-id sprite files.
    pub fn catalog_dir(&self) -> PathBuf {
        self.assets_dir().join(PathsConfig::CATALOG_DIR_NAME)
    }

    pub fn list_cache_path(&self) -> PathBuf {
        self.catalog_dir().join(PathsConfig::LIST_CACHE_FILENAME)
    }

    pub fn default_sprite_path(&self) -> PathBuf {
        self.assets_dir().join(PathsConfig::DEFAULT_SPRITE_FILENAME)
    }

    pub fn database_path(&self) -> PathBuf {
        self.base_dir.join(PathsConfig::DATABASE_FILENAME)
    }

    /// Full URL of the catalog list endpoint, without the query string.
    pub fn list_url(&self) -> String {
        format!(
            "{}/{}",
            self.catalog_base_url.trim_end_matches('/'),
            self.list_endpoint.trim_matches('/')
        )
    }

    /// URL of the sprite for `id` on the CDN.
    pub fn sprite_url(&self, id: &str) -> String {
        format!("{}/{}.png", self.sprite_cdn_url.trim_end_matches('/'), id)
    }

    /// Fallback detail URL when a listing carries none.
    pub fn detail_url(&self, id: &str) -> String {
        format!("{}/{}", self.list_url(), id)
    }
}

/// Reject ids that cannot safely become a file name.
pub fn validate_asset_id(id: &str) -> Result<()> {
    let invalid = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(&['/', '\\'][..])
        || id.chars().any(|c| c.is_control());
    if invalid {
        return Err(FlappyError::Validation {
            field: "id".to_string(),
            message: format!("{:?} is not a usable asset id", id),
        });
    }
    Ok(())
}
