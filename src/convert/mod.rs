//! Conversion pipeline
//!
//! Runs in a fixed order over both containers:
//!   1. palette discovery and texture indexing
//!   2. tile atlas extraction
//!   3. static vertex grid
//!   4. layer resolution, then the slot size and fill passes
//!   5. object, rectangle and region resolution
//!
//! The result owns everything the emitters need; the containers are only borrowed.

pub mod atlas;
pub mod layers;
pub mod objects;
pub mod palette;

use std::collections::BTreeSet;

use tracing::info;

use crate::config::ConversionConfig;
use crate::container::{ObjectContainer, Region, TileContainer};
use crate::error::Result;
use crate::hash::NameCatalogue;

pub use atlas::TileAtlas;
pub use layers::{ConvertedLayer, LayerTiles, SlotGrid, StaticGrid, TileChunk};
pub use objects::{RectGroup, ResolvedObject, ResolvedProperty};
pub use palette::{DecodedTexture, Palette, TextureKind, PALETTE_SIZE};

/// Everything produced from one container pair
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Finished 256-entry ABGR palette
    pub palette: [u32; PALETTE_SIZE],
    pub discovered_colors: usize,
    pub textures: Vec<DecodedTexture>,
    pub atlas: TileAtlas,
    pub static_grid: StaticGrid,
    pub tile_starts: Vec<u32>,
    pub layers: Vec<ConvertedLayer>,
    /// Scene slots; `None` where no source layer landed
    pub slots: Vec<Option<SlotGrid>>,
    pub solid_tiles: BTreeSet<u16>,
    pub objects: Vec<ResolvedObject>,
    pub rect_groups: Vec<RectGroup>,
    pub regions: Vec<(String, Region)>,
}

impl Conversion {
    /// Palette texture payload, used to expand indexed textures
    pub fn palette_texture(&self, config: &ConversionConfig) -> Option<&DecodedTexture> {
        config.palette_texture.and_then(|index| self.textures.get(index))
    }
}

pub struct Converter<'a> {
    tiles: &'a TileContainer,
    objects: &'a ObjectContainer,
    config: &'a ConversionConfig,
    names: &'a NameCatalogue,
}

impl<'a> Converter<'a> {
    pub fn new(
        tiles: &'a TileContainer,
        objects: &'a ObjectContainer,
        config: &'a ConversionConfig,
        names: &'a NameCatalogue,
    ) -> Self {
        Self { tiles, objects, config, names }
    }

    pub fn run(&self) -> Result<Conversion> {
        let (palette, textures) = palette::discover(self.tiles, self.config)?;
        info!(colors = palette.len(), textures = textures.len(), "palette reconstructed");

        let atlas = atlas::extract(&textures, self.config)?;
        info!(tiles = atlas.tile_count(), "tile atlas built");

        let static_grid = StaticGrid::derive(self.tiles.quads(), self.config.static_columns);
        let tile_starts = self.config.tile_starts(self.tiles.textures.len());
        let layers = layers::convert_layers(self.tiles, &static_grid, &tile_starts, self.config)?;
        let (slots, solid_tiles) = layers::fill_slots(&layers, self.config.slot_count())?;
        info!(
            layers = layers.len(),
            skipped = self.tiles.layers.len() - layers.len(),
            solid_tiles = solid_tiles.len(),
            "layers converted"
        );

        let objects = objects::resolve_objects(self.objects, self.config, self.names)?;
        let rect_groups = objects::resolve_rect_groups(self.objects, self.names);
        let regions = self
            .objects
            .regions
            .iter()
            .map(|region| (objects::region_name(region, self.names), region.clone()))
            .collect();
        info!(objects = objects.len(), rect_groups = rect_groups.len(), "objects resolved");

        Ok(Conversion {
            palette: palette.finish(self.config.padding_abgr),
            discovered_colors: palette.len(),
            textures,
            atlas,
            static_grid,
            tile_starts,
            layers,
            slots,
            solid_tiles,
            objects,
            rect_groups,
            regions,
        })
    }
}
