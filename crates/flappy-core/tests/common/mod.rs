//! Shared fixtures for integration tests.

#![allow(dead_code)]

use flappy_core::{
    CatalogItem, CharacterDetail, CharacterEntry, FlappyApi, FlappyConfig, RemoteCatalog,
};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// In-process catalog that counts every request it serves.
#[derive(Default)]
pub struct FakeCatalog {
    pub available: usize,
    pub offline: AtomicBool,
    pub list_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn with_entries(available: usize) -> Arc<Self> {
        Arc::new(Self {
            available,
            ..Default::default()
        })
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn total_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
            + self.detail_calls.load(Ordering::SeqCst)
            + self.image_calls.load(Ordering::SeqCst)
    }

    fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }
}

impl RemoteCatalog for FakeCatalog {
    fn fetch_list(&self, limit: usize) -> Vec<CatalogItem> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.is_offline() {
            return Vec::new();
        }
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
        if self.is_offline() {
            return CharacterDetail::placeholder();
        }
        CharacterDetail {
            type_tags: vec!["fire".into(), "flying".into()],
            height_m: 1.7,
            weight_kg: 90.5,
        }
    }

    fn fetch_image_bytes(&self, _id: &str) -> Option<Vec<u8>> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        if self.is_offline() {
            return None;
        }
        Some(png_bytes(96, 96, [220, 80, 20, 255]))
    }
}

/// Entries as the list cache would hold them for catalog ids `1..=count`.
pub fn catalog_entries(count: usize) -> Vec<CharacterEntry> {
    (1..=count)
        .map(|i| {
            CharacterEntry::from_catalog(
                CatalogItem {
                    id: i.to_string(),
                    name: format!("Mon{}", i),
                    sprite_url: format!("https://cdn.test/{}.png", i),
                    detail_url: format!("https://api.test/pokemon/{}", i),
                },
                CharacterDetail::placeholder(),
            )
        })
        .collect()
}

pub fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

/// Installation in a temp dir backed by `catalog`, with the given list limit.
pub fn create_test_api(catalog: Arc<FakeCatalog>, limit: usize) -> (TempDir, FlappyApi) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let api = open_api(temp_dir.path(), catalog, limit);
    (temp_dir, api)
}

/// Open (or reopen) the installation at `base_dir`.
pub fn open_api(base_dir: &std::path::Path, catalog: Arc<FakeCatalog>, limit: usize) -> FlappyApi {
    let config = FlappyConfig {
        character_limit: limit,
        ..FlappyConfig::default()
    };
    FlappyApi::builder(base_dir)
        .auto_create_dirs(true)
        .with_config(config)
        .with_remote(catalog)
        .build()
        .expect("Failed to build api")
}
