//! Flappy Core - character selection, asset caching and score persistence
//! for the Flappy Bird game.
//!
//! The crate has no rendering or input handling. A game front end drives a
//! [`SelectionStateMachine`] to let the player pick a character, and keeps a
//! [`GameStatistics`] for the running game.
//!
//! # Example
//!
//! ```rust,ignore
//! use flappy_core::{FlappyApi, SelectionCommand, SelectionOutcome};
//!
//! fn main() -> flappy_core::Result<()> {
//!     let api = FlappyApi::builder("./flappy-data").auto_create_dirs(true).build()?;
//!
//!     let mut selection = api.selection("guest");
//!     selection.enter();
//!     selection.handle(SelectionCommand::Next);
//!     if let SelectionOutcome::Completed(choice) = selection.handle(SelectionCommand::Select) {
//!         println!("Playing as {}", choice.display_name);
//!     }
//!
//!     let mut stats = api.statistics("guest")?;
//!     stats.add_points(12);
//!     stats.update_high_score()?;
//!     Ok(())
//! }
//! ```

pub mod assets;
pub mod config;
pub mod error;
pub mod models;
pub mod selection;
pub mod stats;
pub mod store;

mod api;

pub use api::{FlappyApi, FlappyApiBuilder};
pub use assets::{AssetResolver, AssetSource, HttpCatalogClient, LocalAssetCache, RemoteCatalog, Sprite};
pub use config::{FlappyConfig, GameConfig, SelectionDefaults};
pub use error::{FlappyError, Result};
pub use models::{
    primary_type_color, CatalogItem, CharacterDetail, CharacterEntry, PlayerSelection, ScoreRecord,
    SpriteRef,
};
pub use selection::{
    LoadState, ResolvedCharacter, Selection, SelectionCommand, SelectionOutcome, SelectionSession,
    SelectionStateMachine,
};
pub use stats::GameStatistics;
pub use store::{PersistenceStore, SqliteStore};
