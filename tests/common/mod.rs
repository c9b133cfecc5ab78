//! Synthetic container builders for the integration tests

#![allow(dead_code)]

use indexmap::IndexMap;

use level_convert::codec::BinaryWriter;
use level_convert::config::{TileSheet, TilesetRef};
use level_convert::container::PREAMBLE_SIZE;
use level_convert::hash::{hash_name, NAME_SEED};
use level_convert::ConversionConfig;

/// ABGR colour filling the fixture texture
pub const FILL_ABGR: u32 = 0xFF20_40C0;
/// Raw cell written into the chunked layer: solid, tile id 2
pub const SOLID_CELL: u16 = 0x8002;
pub const SOLID_AT: (usize, usize) = (3, 2);

/// Lays out header entries and tables behind the 16-byte preamble
struct Layout {
    header_size: usize,
    entries: Vec<(u32, u32, u64)>,
    body: BinaryWriter,
}

impl Layout {
    fn new(header_size: usize) -> Self {
        Self { header_size, entries: Vec::new(), body: BinaryWriter::new() }
    }

    /// Append a table and return its offset relative to the end of the preamble
    fn table(&mut self, value: u32, count: u32, bytes: &[u8]) -> u64 {
        let offset = (self.header_size + self.body.len()) as u64;
        self.entries.push((value, count, offset));
        self.body.write_bytes(bytes);
        offset
    }

    fn offset_of_next(&self) -> u64 {
        (self.header_size + self.body.len()) as u64
    }

    fn finish(self, leading_words: &[u32]) -> Vec<u8> {
        let mut out = BinaryWriter::new();
        out.write_bytes(&[0u8; PREAMBLE_SIZE]);
        for &word in leading_words {
            out.write_u32_le(word);
        }
        for (value, count, offset) in &self.entries {
            out.write_u32_le(*value);
            out.write_u32_le(*count);
            out.write_u64_le(*offset);
        }
        assert_eq!(out.len(), PREAMBLE_SIZE + self.header_size);
        out.write_bytes(self.body.as_slice());
        out.into_vec()
    }
}

fn layer_record(
    name: &str,
    vertex_buffer: u32,
    uses_static: bool,
    chunks: (u32, u32, u32),
    bounds: (i32, i32, i32, i32),
    camera_mult_x: f32,
) -> Vec<u8> {
    let mut w = BinaryWriter::new();
    w.write_fixed_string(name, 32);
    w.write_u32_le(hash_name(name, NAME_SEED));
    for value in [0.0, 0.0, camera_mult_x, 0.0, 1.0, 0.0, 0.0, 0.0] {
        w.write_f32_le(value);
    }
    for _ in 0..3 {
        w.write_u32_le(0);
    }
    w.write_u32_le(vertex_buffer);
    w.write_u32_le(uses_static as u32);
    w.write_u32_le(0);
    w.write_u32_le(chunks.0);
    w.write_u32_le(chunks.1);
    w.write_u32_le(chunks.2);
    w.write_f32_le(0.0);
    w.write_f32_le(0.0);
    w.write_i32_le(bounds.0);
    w.write_i32_le(bounds.1);
    w.write_i32_le(bounds.2);
    w.write_i32_le(bounds.3);
    assert_eq!(w.len(), 0x80);
    w.into_vec()
}

/// One 18x18 RGBA texture, one vertex buffer, and four layers:
/// a chunked `PF` with a single solid cell, a static `BG` fed by one quad at
/// the world origin, a `BG_PLAGUE` variant and a degenerate `EMPTY` layer.
pub fn tile_container() -> Vec<u8> {
    let mut layout = Layout::new(0x90);

    let mut layers = Vec::new();
    layers.extend(layer_record("PF", 0, false, (1, 1, 1), (0, 0, 15, 15), 1.0));
    layers.extend(layer_record("BG", 0, true, (0, 0, 0), (0, 0, 15, 10), 0.5));
    layers.extend(layer_record("BG_PLAGUE", 0, true, (0, 0, 0), (0, 0, 15, 10), 0.5));
    layers.extend(layer_record("EMPTY", 0, false, (0, 0, 0), (0, 0, -5, 0), 1.0));
    layout.table(16, 4, &layers);

    let mut vb = BinaryWriter::new();
    for word in [0, 0, 4, 0, 0] {
        vb.write_u32_le(word);
    }
    layout.table(0, 1, vb.as_slice());

    let payload_len = 18 * 18 * 4;
    let mut tex = BinaryWriter::new();
    for word in [0u32, 0, 18, 18] {
        tex.write_u32_le(word);
    }
    tex.write_f32_le(1.0);
    for _ in 0..13 {
        tex.write_u32_le(0);
    }
    tex.write_u32_le(payload_len);
    layout.table(0, 1, tex.as_slice());

    let mut chunk_starts = BinaryWriter::new();
    chunk_starts.write_u32_le(0);
    chunk_starts.write_u32_le(1);
    layout.table(0, 2, chunk_starts.as_slice());

    // cell 0 pads the buffer so the populated chunk starts at 1
    let mut cells = vec![0u16; 1 + 256];
    cells[1 + SOLID_AT.1 * 16 + SOLID_AT.0] = SOLID_CELL;
    let mut tile_buffer = BinaryWriter::new();
    for cell in &cells {
        tile_buffer.write_u16_le(*cell);
    }
    layout.table(0, cells.len() as u32, tile_buffer.as_slice());

    layout.table(0, 0, &[]);

    let mut quad = BinaryWriter::new();
    for (x, y) in [(-0.8f32, -0.8f32), (0.8, -0.8), (-0.8, 0.8), (0.8, 0.8)] {
        quad.write_f32_le(x);
        quad.write_f32_le(y);
        quad.write_f32_le(0.0);
        quad.write_f32_le(0.0);
        quad.write_f32_le(0.0);
    }
    layout.table(0, 4, quad.as_slice());

    // the attached file table comes next, followed by the payload it points at
    let payload_offset = layout.offset_of_next() + 8;
    let mut attached = BinaryWriter::new();
    attached.write_u64_le(payload_offset);
    layout.table(0, 1, attached.as_slice());

    let mut payload = BinaryWriter::new();
    for _ in 0..18 * 18 {
        payload.write_u32_le(FILL_ABGR);
    }
    layout.body.write_bytes(payload.as_slice());

    // reserved words, tile size, chunk width; chunk height sits in the layer entry value
    layout.finish(&[0, 0, 16, 16])
}

/// Two objects, one of a known class with a single known property, and one of an
/// unknown type; no rectangles and no regions.
pub fn object_container() -> Vec<u8> {
    let mut layout = Layout::new(0x70);

    let mut counts = BinaryWriter::new();
    counts.write_u32_le(1);
    counts.write_u32_le(1);
    layout.table(0, 1, counts.as_slice());

    let mut objects = BinaryWriter::new();
    for (group_id, raw_type, x, y, property_count) in [(5u32, 1u32, 10.0f32, 20.0f32, 1u32), (6, 999, 1.0, 2.0, 0)] {
        objects.write_u32_le(group_id);
        objects.write_u32_le(0);
        objects.write_f32_le(x);
        objects.write_f32_le(y);
        objects.write_f32_le(1.0);
        objects.write_f32_le(1.0);
        objects.write_u32_le(0);
        objects.write_u32_le(raw_type);
        objects.write_u32_le(property_count);
        objects.write_u32_le(0);
        objects.write_u32_le(0);
        objects.write_u32_le(0);
    }
    layout.table(2, 2, objects.as_slice());

    layout.table(0, 0, &[]);
    layout.table(0, 0, &[]);

    let mut properties = BinaryWriter::new();
    properties.write_u32_le(hash_name("HEALTH", NAME_SEED));
    properties.write_u32_le(0);
    layout.table(0, 1, properties.as_slice());

    layout.table(0, 0, &[]);

    let strings = b"3\0";
    layout.table(0, strings.len() as u32, strings);

    layout.finish(&[])
}

pub fn config() -> ConversionConfig {
    let mut layer_slots = IndexMap::new();
    layer_slots.insert("BG".to_string(), 0);
    layer_slots.insert("PF".to_string(), 1);
    let mut object_names = IndexMap::new();
    object_names.insert(1, "Player".to_string());

    ConversionConfig {
        palette_texture: Some(0),
        tile_sheets: vec![TileSheet { texture_index: 0, tile_count: 1 }],
        layer_slots,
        object_names,
        tilesets: vec![TilesetRef { source: "Fixture.tsx".to_string(), first_gid: 1, texture_index: 0 }],
        map_name: "Fixture".to_string(),
        ..ConversionConfig::default()
    }
}
