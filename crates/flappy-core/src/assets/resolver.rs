//! Character list and sprite resolution across memory, disk and network.

use super::local::LocalAssetCache;
use super::remote::RemoteCatalog;
use super::sprite::{Sprite, SpriteSize};
use super::tiers::{DiskTier, MemoryTier, RemoteTier, SpriteTier};
use crate::config::{FlappyConfig, SelectionDefaults};
use crate::error::{FlappyError, Result};
use crate::models::{with_builtin_first, CharacterEntry};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the selection flow needs from the asset pipeline.
///
/// [`AssetResolver`] never fails; the `Result` lets other sources (and test
/// doubles) report failures that the selection flow turns into its error state.
pub trait AssetSource: Send + Sync {
    fn resolve_list(&self, limit: usize) -> Result<Vec<CharacterEntry>>;

    fn resolve_sprite(&self, id: &str, size: SpriteSize) -> Result<Sprite>;

    /// The built-in sprite; its size is the size every sprite is scaled to.
    fn default_sprite(&self) -> Sprite;
}

/// Resolves the character list (disk cache, then network) and sprites
/// (memory, disk, network, then the built-in default).
pub struct AssetResolver {
    cache: Arc<LocalAssetCache>,
    remote: Arc<dyn RemoteCatalog>,
    memory: Arc<MemoryTier>,
    tiers: Vec<Arc<dyn SpriteTier>>,
    default_sprite: Sprite,
}

impl AssetResolver {
    /// Resolver over the disk layout in `config`, loading the default sprite
    /// from `assets/bird.png`.
    pub fn new(config: &FlappyConfig, remote: Arc<dyn RemoteCatalog>) -> Self {
        let cache = Arc::new(LocalAssetCache::from_config(config));
        let default_sprite = Sprite::load_default(&config.default_sprite_path());
        Self::with_parts(cache, remote, default_sprite, config.memory_cache_capacity)
    }

    pub fn with_parts(
        cache: Arc<LocalAssetCache>,
        remote: Arc<dyn RemoteCatalog>,
        default_sprite: Sprite,
        memory_capacity: u64,
    ) -> Self {
        let memory = Arc::new(MemoryTier::new(memory_capacity));
        let tiers: Vec<Arc<dyn SpriteTier>> = vec![
            memory.clone(),
            Arc::new(DiskTier::new(cache.clone())),
            Arc::new(RemoteTier::new(remote.clone(), cache.clone())),
        ];

        Self {
            cache,
            remote,
            memory,
            tiers,
            default_sprite,
        }
    }

    pub fn cache(&self) -> &LocalAssetCache {
        &self.cache
    }

    pub fn reference_size(&self) -> SpriteSize {
        self.default_sprite.size()
    }

    /// Whether a decoded sprite for `id` is held in memory.
    pub fn is_in_memory(&self, id: &str) -> bool {
        self.memory.contains(id)
    }

    /// The built-in entry followed by up to `limit` catalog entries.
    ///
    /// Served from the list cache when it holds at least `limit` entries,
    /// otherwise fetched (one list request plus one detail request per entry)
    /// and written back to the cache. Never empty.
    pub fn resolve_list(&self, limit: usize) -> Vec<CharacterEntry> {
        if let Some(entries) = self.cache.read_valid_list(limit) {
            debug!("Character list served from disk cache ({} entries)", entries.len());
            return with_builtin_first(entries);
        }

        let items = self.remote.fetch_list(limit);
        if items.is_empty() {
            warn!("Character catalog returned nothing, offering the default character only");
            return vec![CharacterEntry::builtin()];
        }

        let entries: Vec<CharacterEntry> = items
            .into_iter()
            .map(|item| {
                let detail = self.remote.fetch_detail(&item);
                CharacterEntry::from_catalog(item, detail)
            })
            .collect();
        info!("Fetched {} characters from the catalog", entries.len());

        if let Err(e) = self.cache.write_list(&entries) {
            warn!("Could not update the character list cache: {}", e);
        }

        with_builtin_first(entries)
    }

    /// Sprite for `id` scaled to `size`; falls back to the default sprite.
    pub fn resolve_sprite(&self, id: &str, size: SpriteSize) -> Sprite {
        if id == SelectionDefaults::BUILTIN_ID {
            return self.default_sprite.scaled(size);
        }

        for (index, tier) in self.tiers.iter().enumerate() {
            if let Some(sprite) = tier.lookup(id) {
                debug!("Sprite {} served from {} tier", id, tier.name());
                for upper in &self.tiers[..index] {
                    upper.admit(id, &sprite);
                }
                return sprite.scaled(size);
            }
        }

        warn!("{}, using the default", FlappyError::AssetMissing { id: id.to_string() });
        self.default_sprite.scaled(size)
    }
}

impl AssetSource for AssetResolver {
    fn resolve_list(&self, limit: usize) -> Result<Vec<CharacterEntry>> {
        Ok(AssetResolver::resolve_list(self, limit))
    }

    fn resolve_sprite(&self, id: &str, size: SpriteSize) -> Result<Sprite> {
        Ok(AssetResolver::resolve_sprite(self, id, size))
    }

    fn default_sprite(&self) -> Sprite {
        self.default_sprite.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::sprite::test_support::png_bytes;
    use crate::models::{CatalogItem, CharacterDetail};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[derive(Default)]
    struct CountingRemote {
        available: usize,
        list_calls: AtomicUsize,
        detail_calls: AtomicUsize,
        image_calls: AtomicUsize,
    }

    impl RemoteCatalog for CountingRemote {
        fn fetch_list(&self, limit: usize) -> Vec<CatalogItem> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            (1..=self.available.min(limit))
                .map(|i| CatalogItem {
                    id: i.to_string(),
                    name: format!("Mon{}", i),
                    sprite_url: format!("https://cdn.test/{}.png", i),
                    detail_url: format!("https://api.test/pokemon/{}", i),
                })
                .collect()
        }

        fn fetch_detail(&self, _item: &CatalogItem) -> CharacterDetail {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            CharacterDetail {
                type_tags: vec!["normal".into()],
                height_m: 1.0,
                weight_kg: 2.0,
            }
        }

        fn fetch_image_bytes(&self, _id: &str) -> Option<Vec<u8>> {
            self.image_calls.fetch_add(1, Ordering::SeqCst);
            (self.available > 0).then(|| png_bytes(96, 96, [200, 10, 10, 255]))
        }
    }

    fn resolver(temp_dir: &TempDir, remote: Arc<CountingRemote>) -> AssetResolver {
        let dir = temp_dir.path().join("assets").join("pokemon");
        let cache = Arc::new(LocalAssetCache::new(&dir, dir.join("pokemon_list.json")));
        AssetResolver::with_parts(cache, remote, Sprite::placeholder(), 64)
    }

    #[test]
    fn test_builtin_is_first_and_never_fetched() {
        let temp_dir = TempDir::new().unwrap();
        let remote = Arc::new(CountingRemote {
            available: 3,
            ..Default::default()
        });
        let resolver = resolver(&temp_dir, remote.clone());

        let entries = resolver.resolve_list(3);
        assert_eq!(entries.len(), 4);
        assert!(entries[0].is_builtin());

        let sprite = resolver.resolve_sprite("bird", resolver.reference_size());
        assert_eq!(sprite, Sprite::placeholder());
        assert_eq!(remote.image_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_catalog_yields_builtin_only_and_no_cache() {
        let temp_dir = TempDir::new().unwrap();
        let remote = Arc::new(CountingRemote::default());
        let resolver = resolver(&temp_dir, remote);

        let entries = resolver.resolve_list(20);
        assert_eq!(entries, vec![CharacterEntry::builtin()]);
        assert!(!resolver.cache().list_path().exists());
    }

    #[test]
    fn test_sprite_falls_back_to_default() {
        let temp_dir = TempDir::new().unwrap();
        let remote = Arc::new(CountingRemote::default());
        let resolver = resolver(&temp_dir, remote.clone());

        let sprite = resolver.resolve_sprite("151", (34, 24));
        assert_eq!(sprite, Sprite::placeholder());
        assert!(!resolver.is_in_memory("151"));
        assert_eq!(remote.image_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disk_hit_is_promoted_to_memory() {
        let temp_dir = TempDir::new().unwrap();
        let remote = Arc::new(CountingRemote::default());
        let resolver = resolver(&temp_dir, remote.clone());
        resolver
            .cache()
            .write_image("9", &png_bytes(20, 20, [1, 1, 1, 255]))
            .unwrap();

        let sprite = resolver.resolve_sprite("9", (34, 24));
        assert_eq!(sprite.size(), (34, 24));
        assert!(resolver.is_in_memory("9"));
        assert_eq!(remote.image_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_memory_keeps_native_size_across_requested_sizes() {
        let temp_dir = TempDir::new().unwrap();
        let remote = Arc::new(CountingRemote {
            available: 1,
            ..Default::default()
        });
        let resolver = resolver(&temp_dir, remote.clone());

        assert_eq!(resolver.resolve_sprite("1", (10, 10)).size(), (10, 10));
        assert_eq!(resolver.memory.lookup("1").unwrap().size(), (96, 96));

        let large = resolver.resolve_sprite("1", (96, 96));
        let direct = Sprite::decode(&png_bytes(96, 96, [200, 10, 10, 255])).unwrap();
        assert_eq!(large, direct);
        assert_eq!(remote.image_calls.load(Ordering::SeqCst), 1);
    }
}
