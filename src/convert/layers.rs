//! Layer tile placement
//!
//! Static layers draw from a quad list shared by the whole level; the quad
//! centres are snapped back onto the 16-pixel grid to recover a tile index
//! per cell. Chunked layers carry their cells directly in 16x16 chunks.
//!
//! The scene output merges several source layers into fixed slots, so its
//! grids are sized in one pass over the layers and filled in a second.

use std::collections::BTreeSet;

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::config::ConversionConfig;
use crate::container::{LayerInfo, StaticVertex, TileBounds, TileCell, TileContainer, TileFlags, CHUNK_SIZE};
use crate::error::{Error, Result};

/// Tile ids in the scene output are 10 bits
pub const SCENE_TILE_MASK: u16 = 0x3FF;

/// Scene layers store their size as u16
pub const MAX_LAYER_EXTENT: u64 = u16::MAX as u64;
/// Cap on cells materialized for one layer or slot
pub const MAX_LAYER_CELLS: u64 = 1 << 24;

/// Quad positions are stored in world units scaled by 0.1 around the screen centre
const WORLD_SCALE: f64 = 0.1;
const ORIGIN_X: f64 = 240.0;
const ORIGIN_Y: f64 = 160.0;
const GRID_PIXELS: f64 = 16.0;
const UV_SCALE: f64 = 512.0;
const UV_CELL: f64 = 18.0;

/// Cells recovered from the static quad list; 0 is empty, otherwise `cell + 1`.
/// Only placed cells are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticGrid {
    width: usize,
    height: usize,
    cells: AHashMap<(usize, usize), u32>,
}

impl StaticGrid {
    pub fn derive<'a>(quads: impl IntoIterator<Item = &'a [StaticVertex]>, columns: u32) -> Self {
        let mut placed = Vec::new();
        for quad in quads {
            let Some(first) = quad.first() else { continue };
            let n = quad.len() as f64;
            let mean_x = quad.iter().map(|v| v.x as f64).sum::<f64>() / n;
            let mean_y = quad.iter().map(|v| v.y as f64).sum::<f64>() / n;

            let tile_x = ((mean_x / WORLD_SCALE + ORIGIN_X) / GRID_PIXELS).floor();
            let tile_y = ((mean_y / WORLD_SCALE + ORIGIN_Y) / GRID_PIXELS).floor();
            if !(tile_x >= 0.0 && tile_y >= 0.0) {
                warn!(tile_x, tile_y, "static quad left of or above the grid origin, dropped");
                continue;
            }

            let cell_x = (first.u as f64 * UV_SCALE / UV_CELL).floor() as u32;
            let cell_y = (first.v as f64 * UV_SCALE / UV_CELL).floor() as u32;
            let value = cell_y.saturating_mul(columns).saturating_add(cell_x).saturating_add(1);
            placed.push((tile_x as usize, tile_y as usize, value));
        }

        let width = placed.iter().map(|&(x, _, _)| x.saturating_add(1)).max().unwrap_or(0);
        let height = placed.iter().map(|&(_, y, _)| y.saturating_add(1)).max().unwrap_or(0);
        let mut cells = AHashMap::with_capacity(placed.len());
        // later quads overwrite earlier ones at the same cell
        for (x, y, value) in placed {
            cells.insert((x, y), value);
        }
        debug!(width, height, placed = cells.len(), "static vertex grid derived");
        Self { width, height, cells }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at a grid position; 0 outside the derived area
    pub fn get(&self, x: i64, y: i64) -> u32 {
        if x < 0 || y < 0 {
            return 0;
        }
        self.cells.get(&(x as usize, y as usize)).copied().unwrap_or(0)
    }
}

/// One 16x16 chunk of a chunked layer, in chunk-grid coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileChunk {
    pub column: u32,
    pub row: u32,
    /// Row-major, `CHUNK_SIZE * CHUNK_SIZE` cells
    pub cells: Vec<TileCell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerTiles {
    /// Row-major static-grid values over the layer bounds
    Static { cells: Vec<u32> },
    /// Non-empty chunks only
    Chunked { chunks: Vec<TileChunk> },
}

/// A kept source layer with its tiles resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedLayer {
    pub name: String,
    pub slot: Option<usize>,
    pub texture_index: u32,
    /// Atlas offset of the layer's texture
    pub tile_start: u32,
    pub bounds: TileBounds,
    pub camera_mult_x: f32,
    pub camera_mult_y: f32,
    pub tiles: LayerTiles,
}

impl ConvertedLayer {
    pub fn is_static(&self) -> bool {
        matches!(self.tiles, LayerTiles::Static { .. })
    }
}

/// Whether a source layer takes part in conversion at all
pub fn is_kept(layer: &LayerInfo, config: &ConversionConfig) -> bool {
    if !config.unused_layer_marker.is_empty() && layer.name.contains(&config.unused_layer_marker) {
        debug!(layer = %layer.name, "unused layer variant skipped");
        return false;
    }
    if layer.bounds.is_degenerate() {
        debug!(layer = %layer.name, bounds = ?layer.bounds, "degenerate layer skipped");
        return false;
    }
    true
}

/// Resolve every kept layer's tiles
pub fn convert_layers(
    tiles: &TileContainer,
    grid: &StaticGrid,
    tile_starts: &[u32],
    config: &ConversionConfig,
) -> Result<Vec<ConvertedLayer>> {
    let mut layers = Vec::new();
    for layer in tiles.layers.iter().filter(|l| is_kept(l, config)) {
        let texture_index = tiles.layer_texture(layer)?;
        let tile_start = tile_starts.get(texture_index as usize).copied().unwrap_or(0);
        let placement = if layer.uses_static_buffer {
            static_cells(layer, grid)?
        } else {
            chunked_cells(layer, tiles)?
        };
        let slot = config.layer_slots.get(&layer.name).copied();
        if slot.is_none() {
            debug!(layer = %layer.name, "layer has no scene slot");
        }
        layers.push(ConvertedLayer {
            name: layer.name.clone(),
            slot,
            texture_index,
            tile_start,
            bounds: layer.bounds,
            camera_mult_x: layer.camera_mult_x,
            camera_mult_y: layer.camera_mult_y,
            tiles: placement,
        });
    }
    Ok(layers)
}

/// Reject sizes that cannot be materialized or written as a scene layer
fn check_extent(layer: &str, width: u64, height: u64) -> Result<()> {
    if width > MAX_LAYER_EXTENT || height > MAX_LAYER_EXTENT || width * height > MAX_LAYER_CELLS {
        return Err(Error::LayerTooLarge { layer: layer.to_string(), width, height });
    }
    Ok(())
}

/// Static layers read the grid bottom-up: row `ty` maps to grid row `endY - ty`
fn static_cells(layer: &LayerInfo, grid: &StaticGrid) -> Result<LayerTiles> {
    let bounds = layer.bounds;
    check_extent(&layer.name, bounds.width() as u64, bounds.height() as u64)?;
    let mut cells = Vec::with_capacity(bounds.width() as usize * bounds.height() as usize);
    for ty in 0..bounds.height() as i64 {
        for tx in 0..bounds.width() as i64 {
            cells.push(grid.get(tx, bounds.end_y as i64 - ty));
        }
    }
    Ok(LayerTiles::Static { cells })
}

fn chunked_cells(layer: &LayerInfo, tiles: &TileContainer) -> Result<LayerTiles> {
    let mut chunks = Vec::new();
    for row in 0..layer.chunk_rows {
        for column in 0..layer.chunk_columns {
            let id = (row as u64)
                .checked_mul(layer.chunk_columns as u64)
                .and_then(|i| i.checked_add(column as u64))
                .and_then(|i| i.checked_add(layer.first_chunk as u64))
                .and_then(|i| usize::try_from(i).ok())
                .ok_or(Error::IndexOutOfRange {
                    table: "chunk starts",
                    index: usize::MAX,
                    count: tiles.chunk_starts.len(),
                })?;
            let start = tiles.chunk_start(id)?;
            if start == 0 {
                continue;
            }
            let cells = tiles.chunk_cells(start)?.iter().map(|&raw| TileCell::from_raw(raw)).collect();
            chunks.push(TileChunk { column, row, cells });
        }
    }
    Ok(LayerTiles::Chunked { chunks })
}

/// One merged output layer of the scene
#[derive(Debug, Clone, PartialEq)]
pub struct SlotGrid {
    pub slot: usize,
    /// Name of the last source layer written into the slot
    pub name: String,
    pub width: usize,
    pub height: usize,
    /// X camera multiplier of the last source layer
    pub camera_mult_x: f32,
    /// Row-major; `None` is empty
    pub cells: Vec<Option<TileCell>>,
}

impl SlotGrid {
    fn new(slot: usize, width: usize, height: usize) -> Self {
        Self {
            slot,
            name: String::new(),
            width,
            height,
            camera_mult_x: 1.0,
            cells: vec![None; width * height],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<TileCell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[y * self.width + x]
    }

    fn set(&mut self, x: i64, y: i64, cell: TileCell) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.cells[y as usize * self.width + x as usize] = Some(cell);
    }
}

/// Remap a source tile id into the atlas, truncated to the scene's 10-bit id
pub fn remap_tile(id: u32, tile_start: u32) -> u16 {
    (id as u64 + tile_start as u64).saturating_sub(1) as u16 & SCENE_TILE_MASK
}

/// Size pass then fill pass over the slotted layers; returns the grids and solid tile ids
pub fn fill_slots(layers: &[ConvertedLayer], slot_count: usize) -> Result<(Vec<Option<SlotGrid>>, BTreeSet<u16>)> {
    let mut sizes = vec![(0u64, 0u64); slot_count];
    for layer in layers {
        let Some(size) = layer.slot.and_then(|s| sizes.get_mut(s)) else { continue };
        size.0 = size.0.max((layer.bounds.end_x as i64 + 1).max(0) as u64);
        size.1 = size.1.max((layer.bounds.end_y as i64 + 1).max(0) as u64);
        check_extent(&layer.name, size.0, size.1)?;
    }

    let mut grids: Vec<Option<SlotGrid>> = sizes
        .iter()
        .enumerate()
        .map(|(slot, &(w, h))| (w > 0 && h > 0).then(|| SlotGrid::new(slot, w as usize, h as usize)))
        .collect();
    let mut solids = BTreeSet::new();

    for layer in layers {
        let Some(grid) = layer.slot.and_then(|s| grids.get_mut(s)).and_then(Option::as_mut) else {
            continue;
        };
        grid.name.clone_from(&layer.name);
        grid.camera_mult_x = layer.camera_mult_x;
        let bounds = layer.bounds;

        match &layer.tiles {
            LayerTiles::Static { cells } => {
                let width = bounds.width().max(1) as usize;
                for (i, &value) in cells.iter().enumerate() {
                    if value == 0 {
                        continue;
                    }
                    let (tx, ty) = ((i % width) as i64, (i / width) as i64);
                    let cell = TileCell { id: remap_tile(value, layer.tile_start), flags: TileFlags::empty() };
                    grid.set(bounds.start_x as i64 + tx, bounds.start_y as i64 + ty, cell);
                }
            }
            LayerTiles::Chunked { chunks } => {
                for chunk in chunks {
                    for (i, cell) in chunk.cells.iter().enumerate() {
                        if cell.is_empty() {
                            continue;
                        }
                        let x = bounds.start_x as i64 + (chunk.column as usize * CHUNK_SIZE + i % CHUNK_SIZE) as i64;
                        let y = bounds.start_y as i64 + (chunk.row as usize * CHUNK_SIZE + i / CHUNK_SIZE) as i64;
                        if !bounds.contains(x, y) {
                            continue;
                        }
                        let id = remap_tile(cell.id as u32, layer.tile_start);
                        if cell.solid() {
                            solids.insert(id);
                        }
                        grid.set(x, y, TileCell { id, flags: cell.flags });
                    }
                }
            }
        }
    }

    debug!(
        slots = grids.iter().flatten().count(),
        solid_tiles = solids.len(),
        "scene slots filled"
    );
    Ok((grids, solids))
}
