//! Character asset pipeline.
//!
//! - `atomic`: temp-file-and-rename writes
//! - `local`: list cache and per-id sprite files on disk
//! - `remote`: catalog HTTP client
//! - `tiers`: memory, disk and network sprite lookups
//! - `resolver`: composes the above with a guaranteed default

pub mod atomic;
mod local;
mod remote;
mod resolver;
mod sprite;
mod tiers;

pub use local::LocalAssetCache;
pub use remote::{HttpCatalogClient, RemoteCatalog};
pub use resolver::{AssetResolver, AssetSource};
pub use sprite::{Sprite, SpriteSize};
pub use tiers::{DiskTier, MemoryTier, RemoteTier, SpriteTier};
