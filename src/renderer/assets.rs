//! Image assets, loaded once at startup

use std::path::Path;

use image::{RgbaImage, imageops};

use super::scene::SpriteId;
use crate::config::AssetConfig;
use crate::error::{StartupError, StartupResult};

#[derive(Debug, Clone, Default)]
pub struct Assets {
    /// Pre-scaled to the screen size
    pub background: Option<RgbaImage>,
    pub asteroid: Option<RgbaImage>,
}

fn load_image(path: &Path) -> StartupResult<RgbaImage> {
    let img = image::open(path).map_err(|source| StartupError::Asset {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        "Loaded asset {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(img.to_rgba8())
}

impl Assets {
    /// Load every configured asset. Unset paths fall back to plain shapes.
    pub fn load(config: &AssetConfig, screen_width: u32, screen_height: u32) -> StartupResult<Self> {
        let background = match &config.background {
            Some(path) => {
                let img = load_image(path)?;
                Some(imageops::resize(
                    &img,
                    screen_width,
                    screen_height,
                    imageops::FilterType::Triangle,
                ))
            }
            None => None,
        };
        let asteroid = config.asteroid_sprite.as_deref().map(load_image).transpose()?;
        Ok(Self {
            background,
            asteroid,
        })
    }

    pub fn sprite(&self, id: SpriteId) -> Option<&RgbaImage> {
        match id {
            SpriteId::Asteroid => self.asteroid.as_ref(),
        }
    }
}
