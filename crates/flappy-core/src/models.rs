//! Data types shared across the store, the asset pipeline and the selection flow.

use crate::config::SelectionDefaults;
use serde::{Deserialize, Serialize};

/// A player's committed character choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSelection {
    /// Sprite file name, `bird.png` or `<id>.png`.
    pub sprite_id: String,
    pub display_name: String,
}

impl Default for PlayerSelection {
    fn default() -> Self {
        Self {
            sprite_id: SelectionDefaults::SPRITE_PATH.to_string(),
            display_name: SelectionDefaults::DISPLAY_NAME.to_string(),
        }
    }
}

/// One row of `score_history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: i64,
    pub username: String,
    pub score: u32,
    /// RFC 3339 timestamp.
    pub recorded_at: String,
}

/// A character as returned by the catalog list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    /// Where the catalog says the sprite lives. Recorded in the list cache
    /// and shown to players; downloads go through the configured CDN keyed
    /// by `id`, so the disk cache name never depends on this value.
    pub sprite_url: String,
    pub detail_url: String,
}

/// Per-character detail fetched one request per entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterDetail {
    pub type_tags: Vec<String>,
    pub height_m: f64,
    pub weight_kg: f64,
}

impl CharacterDetail {
    /// Stand-in used when the detail request fails.
    pub fn placeholder() -> Self {
        Self {
            type_tags: vec!["Unknown".to_string()],
            height_m: 0.0,
            weight_kg: 0.0,
        }
    }
}

/// Where a character's sprite comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpriteRef {
    /// The default sprite shipped with the game.
    BuiltIn,
    /// A sprite downloaded from the CDN and cached as `<id>.png`. `url` is
    /// the catalog's advertised location, kept for display.
    Remote { url: String },
}

/// One selectable character. This is also the list cache's on-disk form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterEntry {
    pub id: String,
    pub display_name: String,
    pub type_tags: Vec<String>,
    pub height_m: f64,
    pub weight_kg: f64,
    pub sprite_ref: SpriteRef,
}

impl CharacterEntry {
    /// The default character, always first in any resolved list.
    pub fn builtin() -> Self {
        Self {
            id: SelectionDefaults::BUILTIN_ID.to_string(),
            display_name: SelectionDefaults::DISPLAY_NAME.to_string(),
            type_tags: vec![SelectionDefaults::TYPE_TAG.to_string()],
            height_m: SelectionDefaults::HEIGHT_M,
            weight_kg: SelectionDefaults::WEIGHT_KG,
            sprite_ref: SpriteRef::BuiltIn,
        }
    }

    pub fn from_catalog(item: CatalogItem, detail: CharacterDetail) -> Self {
        Self {
            id: item.id,
            display_name: item.name,
            type_tags: detail.type_tags,
            height_m: detail.height_m.max(0.0),
            weight_kg: detail.weight_kg.max(0.0),
            sprite_ref: SpriteRef::Remote {
                url: item.sprite_url,
            },
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.id == SelectionDefaults::BUILTIN_ID
    }

    /// File name stored as the player's selection.
    pub fn storage_path(&self) -> String {
        if self.is_builtin() {
            SelectionDefaults::SPRITE_PATH.to_string()
        } else {
            format!("{}.png", self.id)
        }
    }

    /// Advertised sprite location, `None` for the built-in character.
    pub fn sprite_url(&self) -> Option<&str> {
        match &self.sprite_ref {
            SpriteRef::BuiltIn => None,
            SpriteRef::Remote { url } => Some(url),
        }
    }

    /// Type tags joined for display, e.g. `grass/poison`.
    pub fn type_label(&self) -> String {
        self.type_tags.join("/")
    }
}

/// Put the built-in entry at index 0, dropping any other copy of it.
pub fn with_builtin_first(entries: Vec<CharacterEntry>) -> Vec<CharacterEntry> {
    let mut resolved = Vec::with_capacity(entries.len() + 1);
    resolved.push(CharacterEntry::builtin());
    resolved.extend(entries.into_iter().filter(|e| !e.is_builtin()));
    resolved
}

/// RGB badge colour for a character's primary type.
pub fn primary_type_color(type_tags: &[String]) -> (u8, u8, u8) {
    let primary = type_tags
        .first()
        .map(|t| t.trim().to_lowercase())
        .unwrap_or_default();
    match primary.as_str() {
        "normal" => (168, 168, 120),
        "fire" => (240, 128, 48),
        "water" => (104, 144, 240),
        "grass" => (120, 200, 80),
        "electric" => (248, 208, 48),
        "ice" => (152, 216, 216),
        "fighting" => (192, 48, 40),
        "poison" => (160, 64, 160),
        "ground" => (224, 192, 104),
        "flying" => (168, 144, 240),
        "psychic" => (248, 88, 136),
        "bug" => (168, 184, 32),
        "rock" => (184, 160, 56),
        "ghost" => (112, 88, 152),
        "dragon" => (112, 56, 248),
        "dark" => (112, 88, 72),
        "steel" => (184, 184, 208),
        "fairy" => (238, 153, 172),
        _ => (120, 120, 120),
    }
}
