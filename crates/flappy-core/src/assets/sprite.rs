//! Decoded sprite images.

use crate::config::SelectionDefaults;
use crate::error::{FlappyError, Result};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Width and height in pixels.
pub type SpriteSize = (u32, u32);

/// An RGBA sprite. Cloning shares the pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pixels: Arc<RgbaImage>,
}

impl Sprite {
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(image),
        }
    }

    /// Decode PNG (or any format the image crate recognizes) bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self::from_image(image.to_rgba8()))
    }

    /// Load and decode a sprite file.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| FlappyError::io_with_path(e, path))?;
        Self::decode(&bytes)
    }

    /// Solid placeholder used when no default sprite file is available.
    pub fn placeholder() -> Self {
        let (width, height) = SelectionDefaults::PLACEHOLDER_SIZE;
        Self::from_image(RgbaImage::from_pixel(width, height, Rgba([250, 200, 40, 255])))
    }

    /// Load the default sprite from `path`, or fall back to the placeholder.
    pub fn load_default(path: &Path) -> Self {
        match Self::open(path) {
            Ok(sprite) => sprite,
            Err(e) => {
                warn!(
                    "Default sprite {} unavailable, using placeholder: {}",
                    path.display(),
                    e
                );
                Self::placeholder()
            }
        }
    }

    pub fn size(&self) -> SpriteSize {
        self.pixels.dimensions()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Copy of this sprite resized to `size`; shares pixels if already that size.
    pub fn scaled(&self, size: SpriteSize) -> Self {
        if self.size() == size {
            return self.clone();
        }
        let (width, height) = size;
        Self::from_image(imageops::resize(
            self.pixels.as_ref(),
            width.max(1),
            height.max(1),
            FilterType::Nearest,
        ))
    }
}
