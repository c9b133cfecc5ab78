//! Readers for the two level containers

pub mod header;
pub mod geometry;
pub mod objects;

use std::path::Path;

use crate::error::{Error, Result};

pub use geometry::{
    LayerInfo, StaticVertex, TextureInfo, TileBounds, TileCell, TileContainer, TileFlags,
    VertexBufferInfo, CHUNK_SIZE, TILES_PER_CHUNK,
};
pub use header::{TableEntry, PREAMBLE_SIZE};
pub use objects::{ObjectContainer, ObjectRecord, PropertyRecord, Rect, RectBatch, Region, StringTable};

/// Reject paths whose extension does not name the expected container
pub fn check_extension(path: &Path, expected: &'static str) -> Result<()> {
    let matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(expected));
    if matches {
        Ok(())
    } else {
        Err(Error::ContainerFormat { path: path.to_path_buf(), expected })
    }
}
