//! Tile atlas extraction
//!
//! Tile sheets store 16x16 tiles on a grid with a 1-pixel outer margin and
//! 2 pixels of padding between tiles. The atlas stacks every sheet's tiles
//! into one 16-pixel-wide indexed column, sheet after sheet.

use tracing::debug;

use super::palette::DecodedTexture;
use crate::config::ConversionConfig;
use crate::error::{Error, Result};

pub const TILE_SIZE: u32 = 16;
pub const ATLAS_WIDTH: u32 = TILE_SIZE;
/// Atlas capacity in tiles
pub const ATLAS_TILES: u32 = 0x400;
pub const ATLAS_HEIGHT: u32 = ATLAS_TILES * TILE_SIZE;

const TILE_PIXELS: usize = (TILE_SIZE * TILE_SIZE) as usize;

/// Indexed 16x16384 tile column
#[derive(Debug, Clone)]
pub struct TileAtlas {
    pixels: Vec<u8>,
    tile_count: u32,
}

impl Default for TileAtlas {
    fn default() -> Self {
        Self {
            pixels: vec![0; (ATLAS_WIDTH * ATLAS_HEIGHT) as usize],
            tile_count: 0,
        }
    }
}

impl TileAtlas {
    pub fn width(&self) -> u32 {
        ATLAS_WIDTH
    }

    pub fn height(&self) -> u32 {
        ATLAS_HEIGHT
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Tiles copied so far
    pub fn tile_count(&self) -> u32 {
        self.tile_count
    }

    pub fn tile(&self, index: u32) -> Option<&[u8]> {
        let start = index as usize * TILE_PIXELS;
        self.pixels.get(start..start + TILE_PIXELS)
    }

    /// Append `count` tiles read from a padded sheet
    pub fn append_sheet(&mut self, texture: &DecodedTexture, count: u32, margin: u32, padding: u32) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        if self.tile_count + count > ATLAS_TILES {
            return Err(Error::IndexOutOfRange {
                table: "tile atlas",
                index: (self.tile_count + count - 1) as usize,
                count: ATLAS_TILES as usize,
            });
        }

        let pitch = TILE_SIZE + padding;
        let columns = texture.width / pitch;
        if columns == 0 {
            return Err(Error::Config(format!(
                "texture {} is {} pixels wide, narrower than one tile cell",
                texture.index, texture.width
            )));
        }

        for tile in 0..count {
            let origin_x = margin + (tile % columns) * pitch;
            let origin_y = margin + (tile / columns) * pitch;
            let dst = (self.tile_count + tile) as usize * TILE_PIXELS;
            for py in 0..TILE_SIZE {
                for px in 0..TILE_SIZE {
                    let (x, y) = (origin_x + px, origin_y + py);
                    let value = texture.pixel(x, y).ok_or(Error::IndexOutOfRange {
                        table: "texture pixels",
                        index: y as usize * texture.width as usize + x as usize,
                        count: texture.indexed.len(),
                    })?;
                    self.pixels[dst + (py * TILE_SIZE + px) as usize] = value;
                }
            }
        }

        debug!(texture = texture.index, tiles = count, start = self.tile_count, "sheet copied into atlas");
        self.tile_count += count;
        Ok(())
    }
}

/// Build the atlas from every configured tile sheet, in texture order
pub fn extract(textures: &[DecodedTexture], config: &ConversionConfig) -> Result<TileAtlas> {
    let mut atlas = TileAtlas::default();
    for texture in textures {
        let count = config.tile_count(texture.index);
        atlas.append_sheet(texture, count, config.sheet_margin, config.sheet_padding)?;
    }
    Ok(atlas)
}
