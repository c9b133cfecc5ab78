//! Tile/geometry container (`.ltb`)
//!
//! ## Header (0x90 bytes, after the 16-byte preamble):
//!   Bytes 0x00-0x0F:  Format words (reserved, reserved, tile size, chunk width)
//!   Bytes 0x10-0x8F:  Eight (value, count, offset) entries:
//!                     layers, vertex buffers, textures, chunk starts,
//!                     tile buffer, UV points, static vertices, attached files
//!
//! ## Records:
//!   Layer            0x80 bytes
//!   Vertex buffer    0x14 bytes
//!   Texture          0x4C bytes
//!   Chunk start      u32 (0 = empty chunk)
//!   Tile cell        u16 (id:12, flip x:bit 13, flip y:bit 14, solid:bit 15)
//!   UV point         2 x f32
//!   Static vertex    5 x f32 (x, y, z, u, v), four per quad
//!   Attached file    u64 offset of the texture payload

use std::path::Path;

use bitflags::bitflags;
use tracing::{debug, info};

use super::header::{table_reader, TableEntry};
use super::check_extension;
use crate::codec::{wflz, BinaryReader};
use crate::error::{Error, Result};

pub const EXTENSION: &str = "ltb";

/// Tiles per chunk edge
pub const CHUNK_SIZE: usize = 16;
pub const TILES_PER_CHUNK: usize = CHUNK_SIZE * CHUNK_SIZE;

bitflags! {
    /// Flag bits of a packed tile-buffer cell
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TileFlags: u16 {
        const FLIP_X = 0x2000;
        const FLIP_Y = 0x4000;
        const SOLID = 0x8000;
    }
}

/// A decoded tile-buffer cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileCell {
    pub id: u16,
    pub flags: TileFlags,
}

impl TileCell {
    pub const ID_MASK: u16 = 0x0FFF;

    pub fn from_raw(raw: u16) -> Self {
        Self {
            id: raw & Self::ID_MASK,
            flags: TileFlags::from_bits_truncate(raw),
        }
    }

    pub fn is_empty(self) -> bool {
        self.id == 0
    }

    pub fn flip_x(self) -> bool {
        self.flags.contains(TileFlags::FLIP_X)
    }

    pub fn flip_y(self) -> bool {
        self.flags.contains(TileFlags::FLIP_Y)
    }

    pub fn solid(self) -> bool {
        self.flags.contains(TileFlags::SOLID)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeometryHeader {
    pub reserved: [u32; 2],
    pub tile_size: u32,
    pub chunk_width: u32,
    pub layers: TableEntry,
    pub vertex_buffers: TableEntry,
    pub textures: TableEntry,
    pub chunks: TableEntry,
    pub tile_buffer: TableEntry,
    pub uvs: TableEntry,
    pub static_vertices: TableEntry,
    pub attached_files: TableEntry,
}

impl GeometryHeader {
    pub const SIZE: usize = 0x90;

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let [r0, r1, tile_size, chunk_width] = reader.read_u32_words()?;
        Ok(Self {
            reserved: [r0, r1],
            tile_size,
            chunk_width,
            layers: TableEntry::read(reader)?,
            vertex_buffers: TableEntry::read(reader)?,
            textures: TableEntry::read(reader)?,
            chunks: TableEntry::read(reader)?,
            tile_buffer: TableEntry::read(reader)?,
            uvs: TableEntry::read(reader)?,
            static_vertices: TableEntry::read(reader)?,
            attached_files: TableEntry::read(reader)?,
        })
    }

    /// Chunk height is carried in the layer entry's value slot
    pub fn chunk_height(&self) -> u32 {
        self.layers.value
    }
}

/// Inclusive tile-coordinate bounds of a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileBounds {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
}

impl TileBounds {
    /// `end < start - 1` on either axis marks a layer with nothing to place
    pub fn is_degenerate(&self) -> bool {
        span(self.start_x, self.end_x) < -1 || span(self.start_y, self.end_y) < -1
    }

    pub fn width(&self) -> u32 {
        extent(self.start_x, self.end_x)
    }

    pub fn height(&self) -> u32 {
        extent(self.start_y, self.end_y)
    }

    /// Upper-bound check only; chunk cells are laid out from the start corner
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x <= self.end_x as i64 && y <= self.end_y as i64
    }
}

fn span(start: i32, end: i32) -> i64 {
    end as i64 - start as i64
}

/// Inclusive cell count along one axis, clamped into u32
fn extent(start: i32, end: i32) -> u32 {
    (span(start, end) + 1).clamp(0, u32::MAX as i64) as u32
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerInfo {
    pub name: String,
    pub name_hash: u32,
    pub camera_mult_x: f32,
    pub camera_mult_y: f32,
    /// Remaining floats of the leading float block, in file order
    pub unknown_floats: [f32; 6],
    pub reserved: [u32; 3],
    pub vertex_buffer_index: u32,
    pub uses_static_buffer: bool,
    pub reserved_flag: u32,
    pub chunk_columns: u32,
    pub chunk_rows: u32,
    pub first_chunk: u32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub bounds: TileBounds,
}

impl LayerInfo {
    pub const SIZE: usize = 0x80;

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let name = reader.read_fixed_string(32)?;
        let name_hash = reader.read_u32_le()?;
        let mut floats = [0f32; 8];
        for f in &mut floats {
            *f = reader.read_f32_le()?;
        }
        let reserved = reader.read_u32_words()?;
        let vertex_buffer_index = reader.read_u32_le()?;
        let uses_static_buffer = reader.read_u32_le()? != 0;
        let reserved_flag = reader.read_u32_le()?;
        let [chunk_columns, chunk_rows, first_chunk] = reader.read_u32_words()?;
        let offset_x = reader.read_f32_le()?;
        let offset_y = reader.read_f32_le()?;
        let bounds = TileBounds {
            start_x: reader.read_i32_le()?,
            start_y: reader.read_i32_le()?,
            end_x: reader.read_i32_le()?,
            end_y: reader.read_i32_le()?,
        };

        Ok(Self {
            name,
            name_hash,
            camera_mult_x: floats[2],
            camera_mult_y: floats[4],
            unknown_floats: [floats[0], floats[1], floats[3], floats[5], floats[6], floats[7]],
            reserved,
            vertex_buffer_index,
            uses_static_buffer,
            reserved_flag,
            chunk_columns,
            chunk_rows,
            first_chunk,
            offset_x,
            offset_y,
            bounds,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VertexBufferInfo {
    pub reserved0: u32,
    pub texture_index: u32,
    pub vertex_count: u32,
    pub reserved: [u32; 2],
}

impl VertexBufferInfo {
    pub const SIZE: usize = 0x14;

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let [reserved0, texture_index, vertex_count, r3, r4] = reader.read_u32_words()?;
        Ok(Self { reserved0, texture_index, vertex_count, reserved: [r3, r4] })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextureInfo {
    pub reserved0: u32,
    pub compressed: bool,
    pub width: u32,
    pub height: u32,
    pub scale: f32,
    pub reserved: [u32; 13],
    pub size: u32,
}

impl TextureInfo {
    pub const SIZE: usize = 0x4C;

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let [reserved0, compressed, width, height] = reader.read_u32_words()?;
        let scale = reader.read_f32_le()?;
        let reserved = reader.read_u32_words()?;
        let size = reader.read_u32_le()?;
        Ok(Self { reserved0, compressed: compressed != 0, width, height, scale, reserved, size })
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UvPoint {
    pub u: f32,
    pub v: f32,
}

impl UvPoint {
    pub const SIZE: usize = 8;

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        Ok(Self { u: reader.read_f32_le()?, v: reader.read_f32_le()? })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StaticVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub u: f32,
    pub v: f32,
}

impl StaticVertex {
    pub const SIZE: usize = 0x14;

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            x: reader.read_f32_le()?,
            y: reader.read_f32_le()?,
            z: reader.read_f32_le()?,
            u: reader.read_f32_le()?,
            v: reader.read_f32_le()?,
        })
    }
}

/// Parsed `.ltb` container; keeps its bytes for texture payload access
#[derive(Debug, Clone)]
pub struct TileContainer {
    data: Vec<u8>,
    pub header: GeometryHeader,
    pub layers: Vec<LayerInfo>,
    pub vertex_buffers: Vec<VertexBufferInfo>,
    pub textures: Vec<TextureInfo>,
    pub chunk_starts: Vec<u32>,
    pub tile_buffer: Vec<u16>,
    pub uvs: Vec<UvPoint>,
    pub static_vertices: Vec<StaticVertex>,
    pub attached_files: Vec<u64>,
}

impl TileContainer {
    pub fn open(path: &Path) -> Result<Self> {
        check_extension(path, EXTENSION)?;
        let data = std::fs::read(path)?;
        info!(path = %path.display(), bytes = data.len(), "reading tile container");
        Self::parse(data)
    }

    pub fn parse(data: Vec<u8>) -> Result<Self> {
        let header = {
            let mut reader = table_reader(&data, "geometry header", 0, 1, GeometryHeader::SIZE)?;
            GeometryHeader::read(&mut reader)?
        };
        debug!(?header, "geometry header");

        let layers = header.layers.read_records(&data, "layers", LayerInfo::SIZE, LayerInfo::read)?;
        let vertex_buffers = header.vertex_buffers.read_records(
            &data,
            "vertex buffers",
            VertexBufferInfo::SIZE,
            VertexBufferInfo::read,
        )?;
        let textures = header.textures.read_records(&data, "textures", TextureInfo::SIZE, TextureInfo::read)?;
        let chunk_starts = header.chunks.read_records(&data, "chunk starts", 4, |r| r.read_u32_le())?;
        let tile_buffer = header.tile_buffer.read_records(&data, "tile buffer", 2, |r| r.read_u16_le())?;
        let uvs = header.uvs.read_records(&data, "uv points", UvPoint::SIZE, UvPoint::read)?;
        let static_vertices = header.static_vertices.read_records(
            &data,
            "static vertices",
            StaticVertex::SIZE,
            StaticVertex::read,
        )?;
        let attached_files = header.attached_files.read_records(&data, "attached files", 8, |r| r.read_u64_le())?;

        debug!(
            layers = layers.len(),
            vertex_buffers = vertex_buffers.len(),
            textures = textures.len(),
            chunks = chunk_starts.len(),
            tiles = tile_buffer.len(),
            static_vertices = static_vertices.len(),
            "tile container parsed"
        );

        Ok(Self {
            data,
            header,
            layers,
            vertex_buffers,
            textures,
            chunk_starts,
            tile_buffer,
            uvs,
            static_vertices,
            attached_files,
        })
    }

    pub fn texture(&self, index: usize) -> Result<&TextureInfo> {
        self.textures.get(index).ok_or(Error::IndexOutOfRange {
            table: "textures",
            index,
            count: self.textures.len(),
        })
    }

    /// Payload bytes of a texture, decompressed when flagged
    pub fn texture_payload(&self, index: usize) -> Result<Vec<u8>> {
        let info = self.texture(index)?;
        let offset = *self.attached_files.get(index).ok_or(Error::IndexOutOfRange {
            table: "attached files",
            index,
            count: self.attached_files.len(),
        })?;

        if info.compressed {
            let mut reader = table_reader(&self.data, "texture payload", offset, 1, wflz::BLOCK_SIZE * 3)?;
            wflz::decompress(&mut reader)
        } else {
            let mut reader = table_reader(&self.data, "texture payload", offset, 1, info.size as usize)?;
            Ok(reader.read_bytes(info.size as usize)?.to_vec())
        }
    }

    pub fn vertex_buffer(&self, index: u32) -> Result<&VertexBufferInfo> {
        self.vertex_buffers.get(index as usize).ok_or(Error::IndexOutOfRange {
            table: "vertex buffers",
            index: index as usize,
            count: self.vertex_buffers.len(),
        })
    }

    /// Texture used by a layer, via its vertex buffer
    pub fn layer_texture(&self, layer: &LayerInfo) -> Result<u32> {
        Ok(self.vertex_buffer(layer.vertex_buffer_index)?.texture_index)
    }

    pub fn chunk_start(&self, chunk: usize) -> Result<u32> {
        self.chunk_starts.get(chunk).copied().ok_or(Error::IndexOutOfRange {
            table: "chunk starts",
            index: chunk,
            count: self.chunk_starts.len(),
        })
    }

    /// The 256 cells of a chunk starting at `start` in the tile buffer
    pub fn chunk_cells(&self, start: u32) -> Result<&[u16]> {
        let start = start as usize;
        self.tile_buffer
            .get(start..start + TILES_PER_CHUNK)
            .ok_or(Error::IndexOutOfRange {
                table: "tile buffer",
                index: start + TILES_PER_CHUNK - 1,
                count: self.tile_buffer.len(),
            })
    }

    /// Static vertices grouped into quads; a trailing partial quad is ignored
    pub fn quads(&self) -> impl Iterator<Item = &[StaticVertex]> {
        self.static_vertices.chunks_exact(4)
    }

    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}
