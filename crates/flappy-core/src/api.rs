//! Entry point wiring configuration, storage and the asset pipeline.

use crate::assets::{AssetResolver, HttpCatalogClient, RemoteCatalog};
use crate::config::FlappyConfig;
use crate::error::{FlappyError, Result};
use crate::selection::SelectionStateMachine;
use crate::stats::GameStatistics;
use crate::store::{PersistenceStore, SqliteStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Handle to one installation: its store, its asset resolver and its config.
///
/// Cheap to share; components are behind `Arc`.
pub struct FlappyApi {
    config: FlappyConfig,
    store: Arc<SqliteStore>,
    resolver: Arc<AssetResolver>,
}

impl FlappyApi {
    /// Builder rooted at `base_dir`.
    ///
    /// ```rust,ignore
    /// use flappy_core::FlappyApi;
    ///
    /// let api = FlappyApi::builder("./flappy-data")
    ///     .auto_create_dirs(true)
    ///     .build()?;
    /// let mut selection = api.selection("ash");
    /// selection.enter();
    /// ```
    pub fn builder(base_dir: impl Into<PathBuf>) -> FlappyApiBuilder {
        FlappyApiBuilder::new(base_dir)
    }

    /// Open an existing installation with default options.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::builder(base_dir).build()
    }

    pub fn config(&self) -> &FlappyConfig {
        &self.config
    }

    pub fn base_dir(&self) -> &Path {
        &self.config.base_dir
    }

    pub fn store(&self) -> Arc<SqliteStore> {
        self.store.clone()
    }

    pub fn resolver(&self) -> Arc<AssetResolver> {
        self.resolver.clone()
    }

    /// A fresh selection flow for `username`, not yet entered.
    pub fn selection(&self, username: &str) -> SelectionStateMachine {
        SelectionStateMachine::new(
            username,
            self.config.character_limit,
            self.resolver.clone(),
            self.store.clone(),
        )
    }

    /// Statistics bound to `username` with the persisted high score loaded.
    pub fn statistics(&self, username: &str) -> Result<GameStatistics> {
        let mut stats = GameStatistics::new();
        let store: Arc<dyn PersistenceStore> = self.store.clone();
        stats.init(store, username)?;
        Ok(stats)
    }
}

/// Builder for [`FlappyApi`].
pub struct FlappyApiBuilder {
    base_dir: PathBuf,
    config: Option<FlappyConfig>,
    auto_create_dirs: bool,
    remote: Option<Arc<dyn RemoteCatalog>>,
}

impl FlappyApiBuilder {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            config: None,
            auto_create_dirs: false,
            remote: None,
        }
    }

    /// Create the base directory and `assets/pokemon/` if missing.
    ///
    /// Default: `false` (the base directory must exist)
    pub fn auto_create_dirs(mut self, enable: bool) -> Self {
        self.auto_create_dirs = enable;
        self
    }

    /// Use `config` instead of reading `flappy.json`. Its `base_dir` is
    /// replaced by the builder's.
    pub fn with_config(mut self, config: FlappyConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use another catalog source instead of the HTTP client.
    pub fn with_remote(mut self, remote: Arc<dyn RemoteCatalog>) -> Self {
        self.remote = Some(remote);
        self
    }

    fn create_directory_structure(config: &FlappyConfig) -> Result<()> {
        for dir in [config.base_dir.clone(), config.assets_dir(), config.catalog_dir()] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir).map_err(|e| FlappyError::Io {
                    message: format!("Failed to create directory: {}", dir.display()),
                    path: Some(dir.clone()),
                    source: Some(e),
                })?;
            }
        }
        Ok(())
    }

    pub fn build(self) -> Result<FlappyApi> {
        if self.auto_create_dirs {
            if !self.base_dir.exists() {
                std::fs::create_dir_all(&self.base_dir).map_err(|e| FlappyError::Io {
                    message: format!("Failed to create base directory: {}", self.base_dir.display()),
                    path: Some(self.base_dir.clone()),
                    source: Some(e),
                })?;
            }
        } else if !self.base_dir.is_dir() {
            return Err(FlappyError::Config {
                message: format!("Base directory does not exist: {}", self.base_dir.display()),
            });
        }

        let config = match self.config {
            Some(mut config) => {
                config.base_dir = self.base_dir;
                config.validate()?;
                config
            }
            None => FlappyConfig::load(self.base_dir)?,
        };

        if self.auto_create_dirs {
            Self::create_directory_structure(&config)?;
        }

        let store = Arc::new(SqliteStore::open(config.database_path())?);
        let remote: Arc<dyn RemoteCatalog> = match self.remote {
            Some(remote) => remote,
            None => Arc::new(HttpCatalogClient::new(&config)?),
        };
        let resolver = Arc::new(AssetResolver::new(&config, remote));

        info!("Flappy data ready at {}", config.base_dir.display());
        Ok(FlappyApi {
            config,
            store,
            resolver,
        })
    }
}
