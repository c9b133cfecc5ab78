//! Tiled map document (`.tmx` XML and `.tmj` JSON)
//!
//! Both files come from one document model. The model serializes straight
//! to the Tiled JSON shape; the XML form is written by hand from the same
//! values.
//!
//! Cell values are global tile ids: the tile id plus the first gid of the
//! tileset covering the layer's texture, minus one. Flip bits sit in the
//! top two bits and are only set on non-empty cells.

use ahash::AHashSet;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ConversionConfig;
use crate::container::{TileCell, CHUNK_SIZE};
use crate::convert::{Conversion, ConvertedLayer, LayerTiles};
use crate::property::PropertyValue;

pub const FLIPPED_HORIZONTALLY: u32 = 0x8000_0000;
pub const FLIPPED_VERTICALLY: u32 = 0x4000_0000;

const TILE_PIXELS: u32 = 16;
const TILED_VERSION: &str = "1.10";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum TypedValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
}

impl TypedValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
        }
    }

    fn text(&self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Bool(v) => v.to_string(),
            Self::String(v) => v.clone(),
        }
    }
}

impl From<&PropertyValue> for TypedValue {
    fn from(value: &PropertyValue) -> Self {
        match value {
            PropertyValue::UInt8(v) => Self::Int(*v as i64),
            PropertyValue::UInt16(v) => Self::Int(*v as i64),
            PropertyValue::UInt32(v) => Self::Int(*v as i64),
            PropertyValue::Int8(v) => Self::Int(*v as i64),
            PropertyValue::Int16(v) => Self::Int(*v as i64),
            PropertyValue::Int32(v) | PropertyValue::Enum(v) => Self::Int(*v as i64),
            PropertyValue::Bool(v) => Self::Bool(*v),
            PropertyValue::String(_) | PropertyValue::Vector2(..) | PropertyValue::Color(_) => {
                Self::String(value.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapProperty {
    pub name: String,
    #[serde(flatten)]
    pub value: TypedValue,
}

impl MapProperty {
    pub fn new(name: impl Into<String>, value: TypedValue) -> Self {
        Self { name: name.into(), value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TilesetLink {
    pub firstgid: u32,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub id: u32,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub offsetx: f64,
    pub offsety: f64,
    pub visible: bool,
    pub opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks: Option<Vec<Chunk>>,
    pub properties: Vec<MapProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapObject {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub class: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub visible: bool,
    pub point: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<MapProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectGroup {
    pub id: u32,
    pub name: String,
    pub visible: bool,
    pub opacity: f64,
    pub draworder: &'static str,
    pub objects: Vec<MapObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum MapLayer {
    #[serde(rename = "tilelayer")]
    Tiles(TileLayer),
    #[serde(rename = "objectgroup")]
    Objects(ObjectGroup),
}

impl MapLayer {
    pub fn name(&self) -> &str {
        match self {
            Self::Tiles(layer) => &layer.name,
            Self::Objects(group) => &group.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileMap {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub version: &'static str,
    pub orientation: &'static str,
    pub renderorder: &'static str,
    pub width: u32,
    pub height: u32,
    pub tilewidth: u32,
    pub tileheight: u32,
    pub infinite: bool,
    pub nextlayerid: u32,
    pub nextobjectid: u32,
    pub tilesets: Vec<TilesetLink>,
    pub layers: Vec<MapLayer>,
}

/// Global id of a non-empty cell with its flip bits
pub fn cell_gid(cell: TileCell, first_gid: u32) -> u32 {
    if cell.is_empty() {
        return 0;
    }
    let mut gid = offset_gid(cell.id as u32, first_gid);
    if cell.flip_x() {
        gid |= FLIPPED_HORIZONTALLY;
    }
    if cell.flip_y() {
        gid |= FLIPPED_VERTICALLY;
    }
    gid
}

/// Tile id shifted into the tileset's gid range; ids start at 1
fn offset_gid(id: u32, first_gid: u32) -> u32 {
    id.saturating_add(first_gid).saturating_sub(1)
}

/// Split a static layer into chunks, dropping chunks with no tiles
fn static_chunks(cells: &[u32], width: usize, first_gid: u32) -> Vec<Chunk> {
    let width = width.max(1);
    let height = cells.len().div_ceil(width);
    let mut chunks = Vec::new();
    for cy in (0..height).step_by(CHUNK_SIZE) {
        for cx in (0..width).step_by(CHUNK_SIZE) {
            let mut data = vec![0u32; CHUNK_SIZE * CHUNK_SIZE];
            let mut placed = false;
            for y in 0..CHUNK_SIZE.min(height - cy) {
                for x in 0..CHUNK_SIZE.min(width - cx) {
                    let value = cells.get((cy + y) * width + cx + x).copied().unwrap_or(0);
                    if value != 0 {
                        data[y * CHUNK_SIZE + x] = offset_gid(value, first_gid);
                        placed = true;
                    }
                }
            }
            if placed {
                chunks.push(Chunk {
                    x: cx as i32,
                    y: cy as i32,
                    width: CHUNK_SIZE as u32,
                    height: CHUNK_SIZE as u32,
                    data,
                });
            }
        }
    }
    chunks
}

fn first_gid(layer: &ConvertedLayer, config: &ConversionConfig) -> u32 {
    match config.tileset_for(layer.texture_index) {
        Some(tileset) => tileset.first_gid,
        None => {
            warn!(layer = %layer.name, texture = layer.texture_index, "no tileset for layer texture, using first gid 1");
            1
        }
    }
}

/// Tiled layer for a converted layer; infinite maps take chunks only
fn tile_layer(id: u32, layer: &ConvertedLayer, config: &ConversionConfig, infinite: bool) -> TileLayer {
    let first_gid = first_gid(layer, config);
    let (data, chunks, offset) = match &layer.tiles {
        LayerTiles::Static { cells } if infinite => {
            let chunks = static_chunks(cells, layer.bounds.width() as usize, first_gid);
            (None, Some(chunks), (0.0, 0.0))
        }
        LayerTiles::Static { cells } => {
            let data = cells.iter().map(|&v| if v == 0 { 0 } else { offset_gid(v, first_gid) }).collect();
            (Some(data), None, (0.0, 0.0))
        }
        LayerTiles::Chunked { chunks } => {
            let chunks = chunks
                .iter()
                .map(|chunk| Chunk {
                    x: (chunk.column as usize * CHUNK_SIZE) as i32,
                    y: (chunk.row as usize * CHUNK_SIZE) as i32,
                    width: CHUNK_SIZE as u32,
                    height: CHUNK_SIZE as u32,
                    data: chunk.cells.iter().map(|&cell| cell_gid(cell, first_gid)).collect(),
                })
                .collect();
            let offset = (
                (layer.bounds.start_x as i64 * TILE_PIXELS as i64) as f64,
                (layer.bounds.start_y as i64 * TILE_PIXELS as i64) as f64,
            );
            (None, Some(chunks), offset)
        }
    };

    TileLayer {
        id,
        name: layer.name.clone(),
        width: layer.bounds.width(),
        height: layer.bounds.height(),
        offsetx: offset.0,
        offsety: offset.1,
        visible: true,
        opacity: 1.0,
        data,
        chunks,
        properties: vec![
            MapProperty::new("camScrollX", TypedValue::Float(layer.camera_mult_x as f64)),
            MapProperty::new("camScrollY", TypedValue::Float(layer.camera_mult_y as f64)),
        ],
    }
}

/// Hands out object ids, moving repeats past the largest id seen.
/// Past `u32::MAX` the counter wraps to the lowest unused id.
struct ObjectIds {
    used: AHashSet<u32>,
    next: u32,
}

impl ObjectIds {
    fn new<'a>(preferred: impl IntoIterator<Item = &'a u32>) -> Self {
        let max = preferred.into_iter().copied().max().unwrap_or(0);
        Self { used: AHashSet::new(), next: successor(max) }
    }

    fn claim(&mut self, preferred: Option<u32>) -> u32 {
        if let Some(id) = preferred.filter(|&id| id != 0) {
            if self.used.insert(id) {
                return id;
            }
            debug!(id, "duplicate object id reassigned");
        }
        loop {
            let id = self.next;
            self.next = successor(id);
            if self.used.insert(id) {
                return id;
            }
        }
    }
}

/// Next nonzero id
fn successor(id: u32) -> u32 {
    id.checked_add(1).unwrap_or(1)
}

impl TileMap {
    pub fn from_conversion(conversion: &Conversion, config: &ConversionConfig) -> Self {
        let mut layers = Vec::new();
        let mut next_layer_id = 1u32;
        let mut width = 1u32;
        let mut height = 1u32;
        let infinite = conversion.layers.iter().any(|l| !l.is_static());

        for layer in &conversion.layers {
            width = width.max((layer.bounds.end_x as i64 + 1).clamp(0, u32::MAX as i64) as u32);
            height = height.max((layer.bounds.end_y as i64 + 1).clamp(0, u32::MAX as i64) as u32);
            layers.push(MapLayer::Tiles(tile_layer(next_layer_id, layer, config, infinite)));
            next_layer_id += 1;
        }

        let mut ids = ObjectIds::new(conversion.objects.iter().map(|o| &o.group_id));

        let mut by_class: IndexMap<String, Vec<MapObject>> = IndexMap::new();
        for object in &conversion.objects {
            let label = object.label();
            let map_object = MapObject {
                id: ids.claim(Some(object.group_id)),
                name: label.clone(),
                class: label.clone(),
                x: object.x as f64,
                y: object.y as f64,
                width: 0.0,
                height: 0.0,
                rotation: 0.0,
                visible: true,
                point: true,
                properties: object
                    .properties
                    .iter()
                    .map(|p| MapProperty::new(p.name.clone(), TypedValue::from(&p.value)))
                    .collect(),
            };
            by_class.entry(label).or_default().push(map_object);
        }

        let mut groups: Vec<(String, Vec<MapObject>)> = by_class.into_iter().collect();

        for group in &conversion.rect_groups {
            let objects = group
                .rects
                .iter()
                .map(|rect| MapObject {
                    id: ids.claim(None),
                    name: group.name.clone(),
                    class: "rect".to_string(),
                    x: rect.x as f64,
                    y: rect.y as f64,
                    width: rect.width as f64,
                    height: rect.height as f64,
                    rotation: 0.0,
                    visible: true,
                    point: false,
                    properties: vec![
                        MapProperty::new("depth", TypedValue::Int(rect.depth as i64)),
                        MapProperty::new("hash", TypedValue::String(format!("0x{:08X}", rect.hash))),
                    ],
                })
                .collect();
            groups.push((format!("rects {}", group.name), objects));
        }

        if !conversion.regions.is_empty() {
            let objects = conversion
                .regions
                .iter()
                .map(|(name, region)| {
                    let [left, top, right, bottom] = region.bounds.map(|v| v as f64);
                    MapObject {
                        id: ids.claim(None),
                        name: name.clone(),
                        class: "region".to_string(),
                        x: left,
                        y: top,
                        width: (right - left).abs(),
                        height: (bottom - top).abs(),
                        rotation: 0.0,
                        visible: true,
                        point: false,
                        properties: vec![
                            MapProperty::new("flags", TypedValue::Int(region.flags as i64)),
                            MapProperty::new("value", TypedValue::Float(region.value as f64)),
                        ],
                    }
                })
                .collect();
            groups.push(("regions".to_string(), objects));
        }

        for (name, objects) in groups {
            layers.push(MapLayer::Objects(ObjectGroup {
                id: next_layer_id,
                name,
                visible: true,
                opacity: 1.0,
                draworder: "topdown",
                objects,
            }));
            next_layer_id += 1;
        }

        let tilesets = config
            .tilesets
            .iter()
            .map(|t| TilesetLink { firstgid: t.first_gid, source: t.source.clone() })
            .collect();

        Self {
            kind: "map",
            version: TILED_VERSION,
            orientation: "orthogonal",
            renderorder: "right-down",
            width,
            height,
            tilewidth: TILE_PIXELS,
            tileheight: TILE_PIXELS,
            infinite,
            nextlayerid: next_layer_id,
            nextobjectid: ids.next,
            tilesets,
            layers,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_xml(&self) -> String {
        let mut xml = XmlWriter::default();
        xml.declaration();
        xml.open(
            "map",
            &[
                ("version", self.version.to_string()),
                ("orientation", self.orientation.to_string()),
                ("renderorder", self.renderorder.to_string()),
                ("width", self.width.to_string()),
                ("height", self.height.to_string()),
                ("tilewidth", self.tilewidth.to_string()),
                ("tileheight", self.tileheight.to_string()),
                ("infinite", (self.infinite as u8).to_string()),
                ("nextlayerid", self.nextlayerid.to_string()),
                ("nextobjectid", self.nextobjectid.to_string()),
            ],
        );
        for tileset in &self.tilesets {
            xml.empty("tileset", &[("firstgid", tileset.firstgid.to_string()), ("source", tileset.source.clone())]);
        }
        for layer in &self.layers {
            match layer {
                MapLayer::Tiles(layer) => write_tile_layer(&mut xml, layer),
                MapLayer::Objects(group) => write_object_group(&mut xml, group),
            }
        }
        xml.close("map");
        xml.finish()
    }
}

fn write_properties(xml: &mut XmlWriter, properties: &[MapProperty]) {
    if properties.is_empty() {
        return;
    }
    xml.open("properties", &[]);
    for property in properties {
        let mut attrs = vec![("name", property.name.clone())];
        if !matches!(property.value, TypedValue::String(_)) {
            attrs.push(("type", property.value.type_name().to_string()));
        }
        attrs.push(("value", property.value.text()));
        xml.empty("property", &attrs);
    }
    xml.close("properties");
}

fn csv_rows(data: &[u32], width: usize) -> String {
    data.chunks(width.max(1))
        .map(|row| row.iter().map(u32::to_string).collect::<Vec<_>>().join(","))
        .collect::<Vec<_>>()
        .join(",\n")
}

fn write_tile_layer(xml: &mut XmlWriter, layer: &TileLayer) {
    let mut attrs = vec![
        ("id", layer.id.to_string()),
        ("name", layer.name.clone()),
        ("width", layer.width.to_string()),
        ("height", layer.height.to_string()),
    ];
    if layer.offsetx != 0.0 || layer.offsety != 0.0 {
        attrs.push(("offsetx", layer.offsetx.to_string()));
        attrs.push(("offsety", layer.offsety.to_string()));
    }
    xml.open("layer", &attrs);
    write_properties(xml, &layer.properties);
    xml.open("data", &[("encoding", "csv".to_string())]);
    if let Some(data) = &layer.data {
        xml.text(&csv_rows(data, layer.width as usize));
    }
    for chunk in layer.chunks.iter().flatten() {
        xml.open(
            "chunk",
            &[
                ("x", chunk.x.to_string()),
                ("y", chunk.y.to_string()),
                ("width", chunk.width.to_string()),
                ("height", chunk.height.to_string()),
            ],
        );
        xml.text(&csv_rows(&chunk.data, chunk.width as usize));
        xml.close("chunk");
    }
    xml.close("data");
    xml.close("layer");
}

fn write_object_group(xml: &mut XmlWriter, group: &ObjectGroup) {
    xml.open("objectgroup", &[("id", group.id.to_string()), ("name", group.name.clone())]);
    for object in &group.objects {
        let mut attrs = vec![
            ("id", object.id.to_string()),
            ("name", object.name.clone()),
            ("type", object.class.clone()),
            ("x", object.x.to_string()),
            ("y", object.y.to_string()),
        ];
        if !object.point {
            attrs.push(("width", object.width.to_string()));
            attrs.push(("height", object.height.to_string()));
        }
        xml.open("object", &attrs);
        write_properties(xml, &object.properties);
        if object.point {
            xml.empty("point", &[]);
        }
        xml.close("object");
    }
    xml.close("objectgroup");
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Minimal indenting XML emitter
#[derive(Default)]
struct XmlWriter {
    out: String,
    depth: usize,
}

impl XmlWriter {
    fn declaration(&mut self) {
        self.out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push(' ');
        }
    }

    fn tag(&mut self, name: &str, attrs: &[(&str, String)], self_closing: bool) {
        self.indent();
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attrs {
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            self.out.push_str(&escape(value));
            self.out.push('"');
        }
        self.out.push_str(if self_closing { "/>\n" } else { ">\n" });
    }

    fn open(&mut self, name: &str, attrs: &[(&str, String)]) {
        self.tag(name, attrs, false);
        self.depth += 1;
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, String)]) {
        self.tag(name, attrs, true);
    }

    fn close(&mut self, name: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push_str(">\n");
    }

    fn text(&mut self, text: &str) {
        self.out.push_str(&escape(text));
        self.out.push('\n');
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{TileBounds, TileFlags};
    use crate::convert::TileChunk;

    fn layer(name: &str, texture_index: u32, tiles: LayerTiles) -> ConvertedLayer {
        ConvertedLayer {
            name: name.to_string(),
            slot: None,
            texture_index,
            tile_start: 0,
            bounds: TileBounds { start_x: 2, start_y: 0, end_x: 17, end_y: 15 },
            camera_mult_x: 0.5,
            camera_mult_y: 1.0,
            tiles,
        }
    }

    #[test]
    fn test_cell_gid() {
        assert_eq!(cell_gid(TileCell::from_raw(0), 785), 0);
        assert_eq!(cell_gid(TileCell::from_raw(0x2000), 1), 0);
        assert_eq!(cell_gid(TileCell::from_raw(5), 1), 5);
        assert_eq!(cell_gid(TileCell::from_raw(5), 785), 789);
        let flipped = TileCell { id: 2, flags: TileFlags::FLIP_X | TileFlags::FLIP_Y };
        assert_eq!(cell_gid(flipped, 1), 0xC000_0002);
    }

    #[test]
    fn test_chunked_layer_uses_tileset_of_texture() {
        let mut cells = vec![TileCell::default(); CHUNK_SIZE * CHUNK_SIZE];
        cells[0] = TileCell::from_raw(3);
        let chunked = layer("BGWATERFALL", 1, LayerTiles::Chunked { chunks: vec![TileChunk { column: 1, row: 0, cells }] });
        let tile = tile_layer(4, &chunked, &ConversionConfig::default(), true);

        let chunks = tile.chunks.unwrap();
        assert_eq!((chunks[0].x, chunks[0].y), (16, 0));
        assert_eq!(chunks[0].data[0], 787);
        assert_eq!(chunks[0].data.len(), 256);
        assert_eq!(tile.offsetx, 32.0);
        assert!(tile.data.is_none());
    }

    #[test]
    fn test_static_layer_chunked_in_infinite_map() {
        // 18 columns, so the second chunk column is partial
        let mut cells = vec![0u32; 18 * 16];
        cells[0] = 1;
        cells[17] = 4;
        let mut static_layer = layer("BG", 0, LayerTiles::Static { cells });
        static_layer.bounds = TileBounds { start_x: 0, start_y: 0, end_x: 17, end_y: 15 };
        let config = ConversionConfig::default();

        let tile = tile_layer(1, &static_layer, &config, true);
        assert!(tile.data.is_none());
        let chunks = tile.chunks.unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!((chunks[0].x, chunks[0].y, chunks[0].data[0]), (0, 0, 1));
        assert_eq!((chunks[1].x, chunks[1].y, chunks[1].data[1]), (16, 0, 4));
        assert_eq!(chunks[1].data.iter().filter(|&&v| v != 0).count(), 1);

        let tile = tile_layer(1, &static_layer, &config, false);
        assert!(tile.chunks.is_none());
        assert_eq!(tile.data.unwrap().len(), 18 * 16);
    }

    #[test]
    fn test_static_chunks_skip_empty() {
        let mut cells = vec![0u32; 40 * 40];
        cells[39 * 40 + 39] = 2;
        let chunks = static_chunks(&cells, 40, 10);
        assert_eq!(chunks.len(), 1);
        assert_eq!((chunks[0].x, chunks[0].y), (32, 32));
        assert_eq!(chunks[0].data[7 * CHUNK_SIZE + 7], 11);
    }

    #[test]
    fn test_gid_saturates() {
        assert_eq!(offset_gid(u32::MAX, 2), u32::MAX - 1);
        assert_eq!(offset_gid(3, 0), 2);
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_object_ids_reassign_duplicates() {
        let mut ids = ObjectIds::new(&[4, 9]);
        assert_eq!(ids.claim(Some(4)), 4);
        assert_eq!(ids.claim(Some(4)), 10);
        assert_eq!(ids.claim(Some(9)), 9);
        assert_eq!(ids.claim(None), 11);
        assert_eq!(ids.claim(Some(0)), 12);
    }

    #[test]
    fn test_object_ids_wrap_at_max() {
        let mut ids = ObjectIds::new(&[u32::MAX]);
        assert_eq!(ids.claim(Some(u32::MAX)), u32::MAX);
        assert_eq!(ids.claim(None), 1);
        assert_eq!(ids.claim(Some(1)), 2);
        assert_eq!(ids.claim(None), 3);

        let mut ids = ObjectIds::new(&[u32::MAX - 1]);
        assert_eq!(ids.claim(Some(u32::MAX - 1)), u32::MAX - 1);
        assert_eq!(ids.claim(None), u32::MAX);
        assert_eq!(ids.claim(None), 1);
    }

    #[test]
    fn test_json_property_shape() {
        let property = MapProperty::new("camScrollX", TypedValue::Float(0.5));
        let json = serde_json::to_value(&property).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "camScrollX", "type": "float", "value": 0.5 }));
    }

    #[test]
    fn test_csv_rows() {
        assert_eq!(csv_rows(&[1, 2, 3, 4], 2), "1,2,\n3,4");
    }
}
