//! Sprite lookup tiers.
//!
//! The resolver walks tiers in order until one returns a sprite. A tier that
//! hits gives the tiers above it a chance to keep a copy through
//! [`SpriteTier::admit`]. Tiers deal in full-resolution decodes; scaling to
//! the caller's size happens once, in the resolver.

use super::local::LocalAssetCache;
use super::remote::RemoteCatalog;
use super::sprite::Sprite;
use mini_moka::sync::Cache;
use std::sync::Arc;
use tracing::{debug, warn};

/// One stage of the sprite fallback chain.
pub trait SpriteTier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Decoded sprite for `id` at its native size, or `None` to fall through.
    fn lookup(&self, id: &str) -> Option<Sprite>;

    /// Offered a sprite found by a lower tier.
    fn admit(&self, _id: &str, _sprite: &Sprite) {}
}

/// Decoded sprites at native size, kept for the life of the resolver.
pub struct MemoryTier {
    sprites: Cache<String, Sprite>,
}

impl MemoryTier {
    pub fn new(capacity: u64) -> Self {
        Self {
            sprites: Cache::builder().max_capacity(capacity.max(1)).build(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sprites.contains_key(&id.to_string())
    }
}

impl SpriteTier for MemoryTier {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn lookup(&self, id: &str) -> Option<Sprite> {
        self.sprites.get(&id.to_string())
    }

    fn admit(&self, id: &str, sprite: &Sprite) {
        self.sprites.insert(id.to_string(), sprite.clone());
    }
}

/// Sprite files in the image cache directory.
pub struct DiskTier {
    cache: Arc<LocalAssetCache>,
}

impl DiskTier {
    pub fn new(cache: Arc<LocalAssetCache>) -> Self {
        Self { cache }
    }
}

impl SpriteTier for DiskTier {
    fn name(&self) -> &'static str {
        "disk"
    }

    fn lookup(&self, id: &str) -> Option<Sprite> {
        let bytes = self.cache.read_image(id)?;
        match Sprite::decode(&bytes) {
            Ok(sprite) => Some(sprite),
            Err(e) => {
                warn!("Cached sprite for {} is unreadable, refetching: {}", id, e);
                None
            }
        }
    }
}

/// Sprites downloaded from the CDN, written through to the disk cache.
pub struct RemoteTier {
    remote: Arc<dyn RemoteCatalog>,
    cache: Arc<LocalAssetCache>,
}

impl RemoteTier {
    pub fn new(remote: Arc<dyn RemoteCatalog>, cache: Arc<LocalAssetCache>) -> Self {
        Self { remote, cache }
    }
}

impl SpriteTier for RemoteTier {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn lookup(&self, id: &str) -> Option<Sprite> {
        let bytes = self.remote.fetch_image_bytes(id)?;

        let sprite = match Sprite::decode(&bytes) {
            Ok(sprite) => sprite,
            Err(e) => {
                warn!("Downloaded sprite for {} is not an image: {}", id, e);
                return None;
            }
        };

        // Best-effort: a failed write only costs a refetch next run.
        match self.cache.write_image(id, &bytes) {
            Ok(()) => debug!("Cached sprite {} on disk", id),
            Err(e) => warn!("Could not cache sprite {}: {}", id, e),
        }

        Some(sprite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::sprite::test_support::png_bytes;
    use crate::models::{CatalogItem, CharacterDetail};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct FixedImageRemote {
        bytes: Option<Vec<u8>>,
        calls: AtomicUsize,
    }

    impl RemoteCatalog for FixedImageRemote {
        fn fetch_list(&self, _limit: usize) -> Vec<CatalogItem> {
            Vec::new()
        }

        fn fetch_detail(&self, _item: &CatalogItem) -> CharacterDetail {
            CharacterDetail::placeholder()
        }

        fn fetch_image_bytes(&self, _id: &str) -> Option<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bytes.clone()
        }
    }

    fn cache_in(temp_dir: &TempDir) -> Arc<LocalAssetCache> {
        let dir = temp_dir.path().join("pokemon");
        Arc::new(LocalAssetCache::new(&dir, dir.join("pokemon_list.json")))
    }

    #[test]
    fn test_memory_tier_keeps_native_size() {
        let tier = MemoryTier::new(8);
        assert!(tier.lookup("1").is_none());

        let sprite = Sprite::decode(&png_bytes(4, 4, [1, 2, 3, 255])).unwrap();
        tier.admit("1", &sprite);

        assert!(tier.contains("1"));
        assert_eq!(tier.lookup("1").unwrap(), sprite);
    }

    #[test]
    fn test_disk_tier_reads_and_skips_corrupt_files() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);
        let tier = DiskTier::new(cache.clone());

        assert!(tier.lookup("1").is_none());

        cache.write_image("1", &png_bytes(16, 16, [0, 255, 0, 255])).unwrap();
        assert_eq!(tier.lookup("1").unwrap().size(), (16, 16));

        cache.write_image("2", b"garbage").unwrap();
        assert!(tier.lookup("2").is_none());
    }

    #[test]
    fn test_remote_tier_writes_through() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);
        let remote = Arc::new(FixedImageRemote {
            bytes: Some(png_bytes(96, 96, [9, 9, 9, 255])),
            calls: AtomicUsize::new(0),
        });
        let tier = RemoteTier::new(remote.clone(), cache.clone());

        let sprite = tier.lookup("25").unwrap();
        assert_eq!(sprite.size(), (96, 96));
        assert!(cache.has_image("25"));
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remote_tier_rejects_non_images() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);
        let remote = Arc::new(FixedImageRemote {
            bytes: Some(b"<html>not found</html>".to_vec()),
            calls: AtomicUsize::new(0),
        });
        let tier = RemoteTier::new(remote, cache.clone());

        assert!(tier.lookup("25").is_none());
        assert!(!cache.has_image("25"));
    }

    #[test]
    fn test_remote_tier_serves_sprite_when_disk_write_fails() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);
        // A directory squatting on the target name makes the rename fail.
        std::fs::create_dir_all(cache.dir().join("3.png")).unwrap();
        let remote = Arc::new(FixedImageRemote {
            bytes: Some(png_bytes(96, 96, [9, 9, 9, 255])),
            calls: AtomicUsize::new(0),
        });
        let tier = RemoteTier::new(remote, cache.clone());

        let sprite = tier.lookup("3").unwrap();
        assert_ne!(sprite, Sprite::placeholder());
        assert_eq!(sprite.size(), (96, 96));
        assert!(!cache.has_image("3"));
    }
}
