//! Tile-engine scene file (`Scene1.bin`)
//!
//! ## Layout:
//!   u32       magic `SCN\0`
//!   metadata  u8, u32 colour, u32 colour, 7 bytes, u8-prefixed string, u8
//!   u8        layer count, then layers
//!   u8        class count, then classes
//!
//! ## Layer:
//!   u8 unused, u8-prefixed name, u8 behaviour, u8 draw flag,
//!   u16 width, u16 height, i16 relative speed, i16 constant speed,
//!   u16 scroll info count + 6-byte scroll infos,
//!   stream block of u8 scroll indexes (16 per row),
//!   stream block of u16 tiles, row-major, 0xFFFF empty
//!
//! ## Class:
//!   MD5 of the class name, u8 property count (counting the implicit
//!   position), per explicit property MD5 of its name + u8 type tag,
//!   u16 entity count. Entities are u16 slot, i32 x, i32 y (16.16), then
//!   one value per explicit property.

use indexmap::IndexMap;
use md5::{Digest, Md5};
use tracing::{debug, warn};

use crate::codec::{stream, BinaryReader, BinaryWriter};
use crate::container::TileCell;
use crate::convert::objects::{class_schema, to_fixed};
use crate::convert::{Conversion, ResolvedObject, SlotGrid};
use crate::error::{Error, Result};
use crate::property::{PropertyType, PropertyValue};

pub const SCENE_MAGIC: u32 = 0x004E_4353;
pub const FILE_NAME: &str = "Scene1.bin";

/// Implicit first property of every class
pub const SUB_OBJECT_ID: &str = "SubObjectID";

pub const EMPTY_TILE: u16 = 0xFFFF;
const FLIP_X: u16 = 0x0400;
const FLIP_Y: u16 = 0x0800;
const SOLID: u16 = 0xF000;

/// Scroll indexes per layer row
const SCROLL_INDEXES_PER_ROW: usize = 16;
const DEFAULT_SPEED: u16 = 0x100;

pub type NameDigest = [u8; 16];

pub fn name_digest(name: &str) -> NameDigest {
    Md5::digest(name.as_bytes()).into()
}

/// Scene tile word for a cell: id plus flip/solid bits
pub fn encode_cell(cell: Option<TileCell>) -> u16 {
    let Some(cell) = cell else { return EMPTY_TILE };
    let mut word = cell.id & 0x3FF;
    if cell.flip_x() {
        word |= FLIP_X;
    }
    if cell.flip_y() {
        word |= FLIP_Y;
    }
    if cell.solid() {
        word |= SOLID;
    }
    word
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorMetadata {
    pub unused: u8,
    pub background_primary: u32,
    pub background_secondary: u32,
    pub unknown: [u8; 7],
    pub label: String,
    pub trailing: u8,
}

impl Default for EditorMetadata {
    fn default() -> Self {
        Self {
            unused: 0,
            background_primary: 0xFFFF_FFFF,
            background_secondary: 0xFFCC_CCCC,
            unknown: [1, 1, 4, 0, 1, 4, 0],
            label: String::new(),
            trailing: 0,
        }
    }
}

impl EditorMetadata {
    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            unused: reader.read_u8()?,
            background_primary: reader.read_u32_le()?,
            background_secondary: reader.read_u32_le()?,
            unknown: reader.read_array()?,
            label: reader.read_prefixed_string()?,
            trailing: reader.read_u8()?,
        })
    }

    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u8(self.unused);
        writer.write_u32_le(self.background_primary);
        writer.write_u32_le(self.background_secondary);
        writer.write_bytes(&self.unknown);
        writer.write_prefixed_string(&self.label);
        writer.write_u8(self.trailing);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollInfo {
    pub relative_speed: u16,
    pub constant_speed: u16,
    pub behaviour: u8,
    pub draw_layer: u8,
}

impl Default for ScrollInfo {
    fn default() -> Self {
        Self { relative_speed: DEFAULT_SPEED, constant_speed: 0, behaviour: 0, draw_layer: 0 }
    }
}

impl ScrollInfo {
    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            relative_speed: reader.read_u16_le()?,
            constant_speed: reader.read_u16_le()?,
            behaviour: reader.read_u8()?,
            draw_layer: reader.read_u8()?,
        })
    }

    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u16_le(self.relative_speed);
        writer.write_u16_le(self.constant_speed);
        writer.write_u8(self.behaviour);
        writer.write_u8(self.draw_layer);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneLayer {
    pub unused: u8,
    pub name: String,
    pub behaviour: u8,
    pub draw_flag: u8,
    pub width: u16,
    pub height: u16,
    pub relative_speed: i16,
    pub constant_speed: i16,
    pub scroll_info: Vec<ScrollInfo>,
    pub scroll_indexes: Vec<u8>,
    /// Row-major tile words
    pub tiles: Vec<u16>,
}

impl SceneLayer {
    pub fn new(name: &str, width: u16, height: u16) -> Self {
        Self {
            unused: 0,
            name: name.to_string(),
            behaviour: 0,
            draw_flag: 0,
            width,
            height,
            relative_speed: DEFAULT_SPEED as i16,
            constant_speed: 0,
            scroll_info: vec![ScrollInfo::default()],
            scroll_indexes: vec![0; height as usize * SCROLL_INDEXES_PER_ROW],
            tiles: vec![EMPTY_TILE; width as usize * height as usize],
        }
    }

    pub fn from_slot(grid: &SlotGrid) -> Result<Self> {
        let width = u16::try_from(grid.width)
            .map_err(|_| Error::InvalidScene(format!("layer {} is {} tiles wide", grid.name, grid.width)))?;
        let height = u16::try_from(grid.height)
            .map_err(|_| Error::InvalidScene(format!("layer {} is {} tiles tall", grid.name, grid.height)))?;

        let mut layer = Self::new(&grid.name, width, height);
        layer.scroll_info[0].relative_speed = (grid.camera_mult_x as f64 * DEFAULT_SPEED as f64) as i32 as u16;
        layer.tiles = grid.cells.iter().map(|&cell| encode_cell(cell)).collect();
        Ok(layer)
    }

    pub fn tile(&self, x: u16, y: u16) -> Option<u16> {
        if x >= self.width {
            return None;
        }
        self.tiles.get(y as usize * self.width as usize + x as usize).copied()
    }

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let unused = reader.read_u8()?;
        let name = reader.read_prefixed_string()?;
        let behaviour = reader.read_u8()?;
        let draw_flag = reader.read_u8()?;
        let width = reader.read_u16_le()?;
        let height = reader.read_u16_le()?;
        let relative_speed = reader.read_i16_le()?;
        let constant_speed = reader.read_i16_le()?;
        let scroll_count = reader.read_u16_le()?;
        let scroll_info = (0..scroll_count).map(|_| ScrollInfo::read(reader)).collect::<Result<Vec<_>>>()?;
        let scroll_indexes = stream::decode_u8(reader)?;
        let mut tiles = stream::decode_u16(reader)?;
        tiles.resize(width as usize * height as usize, EMPTY_TILE);

        Ok(Self {
            unused,
            name,
            behaviour,
            draw_flag,
            width,
            height,
            relative_speed,
            constant_speed,
            scroll_info,
            scroll_indexes,
            tiles,
        })
    }

    pub fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_u8(self.unused);
        writer.write_prefixed_string(&self.name);
        writer.write_u8(self.behaviour);
        writer.write_u8(self.draw_flag);
        writer.write_u16_le(self.width);
        writer.write_u16_le(self.height);
        writer.write_i16_le(self.relative_speed);
        writer.write_i16_le(self.constant_speed);
        writer.write_u16_le(count_u16(self.scroll_info.len(), "scroll infos")?);
        for info in &self.scroll_info {
            info.write(writer);
        }
        stream::encode_u8(writer, &self.scroll_indexes)?;
        stream::encode_u16(writer, &self.tiles)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDef {
    pub hash: NameDigest,
    pub ty: PropertyType,
}

impl PropertyDef {
    pub fn named(name: &str, ty: PropertyType) -> Self {
        Self { hash: name_digest(name), ty }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub slot: u16,
    pub x: i32,
    pub y: i32,
    /// One per explicit class property, in declaration order
    pub values: Vec<PropertyValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneClass {
    pub hash: NameDigest,
    /// Explicit properties; position is implicit
    pub properties: Vec<PropertyDef>,
    pub entities: Vec<Entity>,
}

impl SceneClass {
    pub fn named(name: &str) -> Self {
        Self { hash: name_digest(name), properties: Vec::new(), entities: Vec::new() }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.hash == name_digest(name)
    }

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let hash = reader.read_array()?;
        let property_count = reader.read_u8()?;
        let mut properties = Vec::with_capacity(property_count.saturating_sub(1) as usize);
        for _ in 1..property_count {
            let hash = reader.read_array()?;
            let tag = reader.read_u8()?;
            let ty = PropertyType::from_u8(tag).ok_or_else(|| {
                Error::InvalidScene(format!("unknown property type {tag} at {:#x}", reader.position()))
            })?;
            properties.push(PropertyDef { hash, ty });
        }

        let entity_count = reader.read_u16_le()?;
        let mut entities = Vec::with_capacity(entity_count as usize);
        for _ in 0..entity_count {
            let slot = reader.read_u16_le()?;
            let x = reader.read_i32_le()?;
            let y = reader.read_i32_le()?;
            let values = properties
                .iter()
                .map(|p| PropertyValue::read(reader, p.ty))
                .collect::<Result<Vec<_>>>()?;
            entities.push(Entity { slot, x, y, values });
        }
        Ok(Self { hash, properties, entities })
    }

    pub fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_bytes(&self.hash);
        writer.write_u8(u8::try_from(self.properties.len() + 1).map_err(|_| {
            Error::InvalidScene(format!("class has {} properties", self.properties.len()))
        })?);
        for property in &self.properties {
            writer.write_bytes(&property.hash);
            writer.write_u8(property.ty as u8);
        }
        writer.write_u16_le(count_u16(self.entities.len(), "entities")?);
        for entity in &self.entities {
            writer.write_u16_le(entity.slot);
            writer.write_i32_le(entity.x);
            writer.write_i32_le(entity.y);
            for (property, value) in self.properties.iter().zip(&entity.values) {
                value.coerce(property.ty).write(writer);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scene {
    pub metadata: EditorMetadata,
    pub layers: Vec<SceneLayer>,
    pub classes: Vec<SceneClass>,
}

impl Scene {
    /// Build the scene and the ordered list of class names it uses
    pub fn from_conversion(conversion: &Conversion) -> Result<(Self, Vec<String>)> {
        let layers = conversion
            .slots
            .iter()
            .flatten()
            .map(SceneLayer::from_slot)
            .collect::<Result<Vec<_>>>()?;

        let mut by_class: IndexMap<&str, Vec<&ResolvedObject>> = IndexMap::new();
        for object in &conversion.objects {
            match &object.class_name {
                Some(name) => by_class.entry(name.as_str()).or_default().push(object),
                None => warn!(type_id = object.type_id, "object type has no class name, left out of the scene"),
            }
        }

        let mut classes = Vec::with_capacity(by_class.len());
        for (name, objects) in &by_class {
            let mut class = SceneClass::named(name);
            class.properties.push(PropertyDef::named(SUB_OBJECT_ID, PropertyType::UInt8));
            let schema = class_schema(objects.iter().copied());
            for (property, ty) in schema.iter().filter(|(p, _)| p.as_str() != SUB_OBJECT_ID) {
                class.properties.push(PropertyDef::named(property, *ty));
            }

            for object in objects {
                let mut values = vec![PropertyValue::UInt8(0)];
                for (property, ty) in schema.iter().filter(|(p, _)| p.as_str() != SUB_OBJECT_ID) {
                    let value = object
                        .properties
                        .iter()
                        .find(|p| &p.name == property)
                        .map_or_else(|| ty.default_value(), |p| p.value.coerce(*ty));
                    values.push(value);
                }
                class.entities.push(Entity { slot: 0, x: to_fixed(object.x), y: to_fixed(object.y), values });
            }
            debug!(class = %name, entities = class.entities.len(), properties = class.properties.len(), "scene class");
            classes.push(class);
        }

        let mut scene = Self { metadata: EditorMetadata::default(), layers, classes };
        scene.assign_slots();
        let names = by_class.keys().map(|name| name.to_string()).collect();
        Ok((scene, names))
    }

    /// Number entities sequentially across classes
    pub fn assign_slots(&mut self) {
        let mut slot = 0u16;
        for entity in self.classes.iter_mut().flat_map(|c| c.entities.iter_mut()) {
            entity.slot = slot;
            slot = slot.wrapping_add(1);
        }
    }

    pub fn class(&self, name: &str) -> Option<&SceneClass> {
        self.classes.iter().find(|c| c.is_named(name))
    }

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let magic = reader.read_u32_le()?;
        if magic != SCENE_MAGIC {
            return Err(Error::InvalidScene(format!("scene magic {magic:#x}")));
        }
        let metadata = EditorMetadata::read(reader)?;
        let layer_count = reader.read_u8()?;
        let layers = (0..layer_count).map(|_| SceneLayer::read(reader)).collect::<Result<Vec<_>>>()?;
        let class_count = reader.read_u8()?;
        let classes = (0..class_count).map(|_| SceneClass::read(reader)).collect::<Result<Vec<_>>>()?;
        Ok(Self { metadata, layers, classes })
    }

    pub fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_u32_le(SCENE_MAGIC);
        self.metadata.write(writer);
        writer.write_u8(count_u8(self.layers.len(), "layers")?);
        for layer in &self.layers {
            layer.write(writer)?;
        }
        debug!(offset = writer.len(), "scene class table");
        writer.write_u8(count_u8(self.classes.len(), "classes")?);
        for class in &self.classes {
            class.write(writer)?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = BinaryWriter::new();
        self.write(&mut writer)?;
        Ok(writer.into_vec())
    }
}

fn count_u8(n: usize, what: &str) -> Result<u8> {
    u8::try_from(n).map_err(|_| Error::InvalidScene(format!("{n} {what} do not fit a u8 count")))
}

fn count_u16(n: usize, what: &str) -> Result<u16> {
    u16::try_from(n).map_err(|_| Error::InvalidScene(format!("{n} {what} do not fit a u16 count")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::TileFlags;

    #[test]
    fn test_encode_cell() {
        assert_eq!(encode_cell(None), 0xFFFF);
        assert_eq!(encode_cell(Some(TileCell { id: 7, flags: TileFlags::empty() })), 7);
        let cell = TileCell { id: 0x123, flags: TileFlags::FLIP_X | TileFlags::FLIP_Y | TileFlags::SOLID };
        assert_eq!(encode_cell(Some(cell)), 0xF000 | 0x800 | 0x400 | 0x123);
    }

    #[test]
    fn test_name_digest() {
        assert_eq!(
            name_digest(""),
            [
                0xd4, 0x1d, 0x8c, 0xd9, 0x8f, 0x00, 0xb2, 0x04, 0xe9, 0x80, 0x09, 0x98, 0xec, 0xf8, 0x42, 0x7e
            ]
        );
    }

    #[test]
    fn test_metadata_layout() {
        let mut writer = BinaryWriter::new();
        EditorMetadata::default().write(&mut writer);
        let bytes = writer.into_vec();
        assert_eq!(bytes.len(), 1 + 4 + 4 + 7 + 1 + 1);
        assert_eq!(&bytes[1..5], &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&bytes[5..9], &[0xCC, 0xCC, 0xCC, 0xFF]);
        assert_eq!(&bytes[9..16], &[1, 1, 4, 0, 1, 4, 0]);
    }

    #[test]
    fn test_scene_read_back() {
        let mut layer = SceneLayer::new("PF", 3, 2);
        layer.tiles[4] = 0xF005;
        let mut class = SceneClass::named("Beeto");
        class.properties.push(PropertyDef::named(SUB_OBJECT_ID, PropertyType::UInt8));
        class.properties.push(PropertyDef::named("SPEED", PropertyType::Int32));
        class.entities.push(Entity {
            slot: 0,
            x: 0x10000,
            y: -0x20000,
            values: vec![PropertyValue::UInt8(0), PropertyValue::Int32(3)],
        });
        let scene = Scene { metadata: EditorMetadata::default(), layers: vec![layer], classes: vec![class] };

        let bytes = scene.to_bytes().unwrap();
        assert_eq!(&bytes[..4], &[0x53, 0x43, 0x4E, 0x00]);
        let back = Scene::read(&mut BinaryReader::new(&bytes)).unwrap();
        assert_eq!(back, scene);
        assert_eq!(back.layers[0].tile(1, 1), Some(0xF005));
        assert_eq!(back.layers[0].scroll_indexes.len(), 32);
        assert!(back.class("Beeto").is_some());
    }

    #[test]
    fn test_property_count_includes_position() {
        let mut class = SceneClass::named("Skull");
        class.properties.push(PropertyDef::named(SUB_OBJECT_ID, PropertyType::UInt8));
        let mut writer = BinaryWriter::new();
        class.write(&mut writer).unwrap();
        let bytes = writer.into_vec();
        assert_eq!(bytes[16], 2);
        assert_eq!(bytes[16 + 1 + 16], PropertyType::UInt8 as u8);
    }

    #[test]
    fn test_entity_count_overflow_rejected() {
        let mut class = SceneClass::named("GemSmall");
        class.entities = vec![Entity { slot: 0, x: 0, y: 0, values: Vec::new() }; u16::MAX as usize + 1];
        let mut writer = BinaryWriter::new();
        match class.write(&mut writer) {
            Err(Error::InvalidScene(message)) => assert!(message.contains("65536 entities")),
            other => panic!("expected an entity count error, got {other:?}"),
        }

        class.entities.truncate(u16::MAX as usize);
        let mut writer = BinaryWriter::new();
        class.write(&mut writer).unwrap();
        assert_eq!(&writer.as_slice()[17..19], &[0xFF, 0xFF]);
    }
}
