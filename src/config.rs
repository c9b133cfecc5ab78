//! Conversion tables and constants
//!
//! Everything the pipeline needs to know about one game's asset layout lives
//! here and is passed into the pipeline explicitly. The defaults describe the
//! stock level set; a JSON file with the same shape overrides them.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A texture holding 16x16 tiles laid out on a padded grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSheet {
    pub texture_index: usize,
    pub tile_count: u32,
}

/// An external tileset referenced by the Tiled document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilesetRef {
    pub source: String,
    pub first_gid: u32,
    /// Texture whose tile ids this tileset covers
    pub texture_index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Texture whose samples seed the palette, if any
    pub palette_texture: Option<usize>,
    /// ABGR value skipped while scanning the palette texture
    pub transparent_abgr: u32,
    /// ABGR value used to pad the palette to 256 entries
    pub padding_abgr: u32,
    pub tile_sheets: Vec<TileSheet>,
    /// Margin and padding (pixels) around each tile in a sheet
    pub sheet_margin: u32,
    pub sheet_padding: u32,
    /// Cells per row in the static vertex buffer's texture
    pub static_columns: u32,
    /// Layers whose name contains this marker are alternate variants and skipped
    pub unused_layer_marker: String,
    /// Source layer name -> output scene layer slot
    pub layer_slots: IndexMap<String, usize>,
    /// Object type id (low 12 bits) -> class name
    pub object_names: IndexMap<u32, String>,
    pub tilesets: Vec<TilesetRef>,
    /// Base name of the Tiled document
    pub map_name: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        let layer_slots = [
            ("BG", 0),
            ("MG3", 1),
            ("MG2", 2),
            ("MG1.5", 3),
            ("MG1_TREES", 4),
            ("BGWATERFALL", 5),
            ("PF_BG_FORWATER", 6),
            ("PF_BG", 6),
            ("LADDER", 7),
            ("LADDER_SHOVEL", 7),
            ("PF", 7),
            ("PF_SHOVEL", 7),
        ]
        .into_iter()
        .map(|(name, slot)| (name.to_string(), slot))
        .collect();

        let object_names = [
            (1, "Player"),
            (3, "DirtBlockLarge"),
            (4, "DirtBlockSmall"),
            (11, "GemRed"),
            (12, "GemPink"),
            (13, "GemPile"),
            (14, "Platter"),
            (20, "Chest"),
            (25, "CheckpointUnbreakable"),
            (29, "PlatformBackForth"),
            (37, "Beeto"),
            (46, "FrontGrass"),
            (57, "Slime"),
            (72, "Note"),
            (106, "SwordSkeleton"),
            (112, "GemPileWall"),
            (132, "Skull"),
            (137, "GemSmall"),
            (147, "GreenDragon"),
            (150, "BossBlackKnightPlains"),
            (154, "Bubble"),
            (161, "BubbleDragon"),
            (162, "BreakableWall"),
        ]
        .into_iter()
        .map(|(id, name)| (id, name.to_string()))
        .collect();

        Self {
            palette_texture: Some(0),
            transparent_abgr: 0xFF00_FF00,
            padding_abgr: 0xFF7F_00FF,
            tile_sheets: vec![
                TileSheet { texture_index: 1, tile_count: 3 },
                TileSheet { texture_index: 2, tile_count: 401 },
            ],
            sheet_margin: 1,
            sheet_padding: 2,
            static_columns: 28,
            unused_layer_marker: "_PLAGUE".to_string(),
            layer_slots,
            object_names,
            tilesets: vec![
                TilesetRef { source: "Plains.tsx".to_string(), first_gid: 1, texture_index: 2 },
                TilesetRef {
                    source: "PlainsWaterfall.tsx".to_string(),
                    first_gid: 785,
                    texture_index: 1,
                },
            ],
            map_name: "Plains".to_string(),
        }
    }
}

impl ConversionConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Number of output scene layer slots
    pub fn slot_count(&self) -> usize {
        self.layer_slots.values().copied().max().map_or(0, |max| max + 1)
    }

    /// Atlas tile offset of each texture, from the running tile counts
    pub fn tile_starts(&self, texture_count: usize) -> Vec<u32> {
        let mut starts = vec![0u32; texture_count];
        let mut running = 0u32;
        for sheet in &self.tile_sheets {
            if let Some(start) = starts.get_mut(sheet.texture_index) {
                *start = running;
            }
            running += sheet.tile_count;
        }
        starts
    }

    pub fn tile_count(&self, texture_index: usize) -> u32 {
        self.tile_sheets
            .iter()
            .filter(|sheet| sheet.texture_index == texture_index)
            .map(|sheet| sheet.tile_count)
            .sum()
    }

    pub fn object_name(&self, type_id: u32) -> Option<&str> {
        self.object_names.get(&type_id).map(String::as_str)
    }

    pub fn tileset_for(&self, texture_index: u32) -> Option<&TilesetRef> {
        self.tilesets.iter().find(|t| t.texture_index == texture_index)
    }
}
