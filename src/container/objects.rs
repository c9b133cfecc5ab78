//! Object/property container (`.lvb`)
//!
//! ## Header (0x70 bytes, after the 16-byte preamble):
//!   Seven (value, count, offset) entries:
//!   0x00  Property counts per object type   8 bytes each
//!   0x10  Object placements                  0x30 bytes each, `value` records
//!   0x20  Rectangle batches                  0x14 bytes each
//!   0x30  Rectangles                         0x18 bytes each
//!   0x40  Property values                    8 bytes each (name hash, string offset)
//!   0x50  Regions                            0x90 bytes each, `count - 1` records
//!   0x60  String table                       `count` bytes of NUL-terminated strings

use std::path::Path;

use tracing::{debug, info};

use super::check_extension;
use super::header::{table_reader, TableEntry};
use crate::codec::BinaryReader;
use crate::error::{Error, Result};

pub const EXTENSION: &str = "lvb";

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ObjectHeader {
    pub property_counts: TableEntry,
    pub objects: TableEntry,
    pub rect_batches: TableEntry,
    pub rects: TableEntry,
    pub property_values: TableEntry,
    pub regions: TableEntry,
    pub strings: TableEntry,
}

impl ObjectHeader {
    pub const SIZE: usize = 0x70;

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            property_counts: TableEntry::read(reader)?,
            objects: TableEntry::read(reader)?,
            rect_batches: TableEntry::read(reader)?,
            rects: TableEntry::read(reader)?,
            property_values: TableEntry::read(reader)?,
            regions: TableEntry::read(reader)?,
            strings: TableEntry::read(reader)?,
        })
    }
}

/// Declared property count of an object type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropertyCount {
    pub type_id: u32,
    pub count: u32,
}

impl PropertyCount {
    pub const SIZE: usize = 8;

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        Ok(Self { type_id: reader.read_u32_le()?, count: reader.read_u32_le()? })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ObjectRecord {
    /// Also used as the object id in the Tiled document
    pub group_id: u32,
    pub name_hash: u32,
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub flags: u32,
    pub raw_type: u32,
    pub property_count: u32,
    pub property_start: u32,
    pub reserved: [u32; 2],
}

impl ObjectRecord {
    pub const SIZE: usize = 0x30;
    pub const TYPE_MASK: u32 = 0xFFF;

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            group_id: reader.read_u32_le()?,
            name_hash: reader.read_u32_le()?,
            x: reader.read_f32_le()?,
            y: reader.read_f32_le()?,
            scale_x: reader.read_f32_le()?,
            scale_y: reader.read_f32_le()?,
            flags: reader.read_u32_le()?,
            raw_type: reader.read_u32_le()?,
            property_count: reader.read_u32_le()?,
            property_start: reader.read_u32_le()?,
            reserved: reader.read_u32_words()?,
        })
    }

    pub fn type_id(&self) -> u32 {
        self.raw_type & Self::TYPE_MASK
    }

    pub fn property_range(&self) -> std::ops::Range<usize> {
        let start = self.property_start as usize;
        start..start + self.property_count as usize
    }
}

/// A named group of rectangles, referencing a contiguous range of the rectangle table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RectBatch {
    pub name_hash: u32,
    pub flags: u32,
    pub first: u32,
    pub count: u32,
    pub reserved: u32,
}

impl RectBatch {
    pub const SIZE: usize = 0x14;

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let [name_hash, flags, first, count, reserved] = reader.read_u32_words()?;
        Ok(Self { name_hash, flags, first, count, reserved })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub hash: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub depth: i32,
}

impl Rect {
    pub const SIZE: usize = 0x18;

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let [hash, x, y, width, height] = reader.read_u32_words()?;
        Ok(Self { hash, x, y, width, height, depth: reader.read_i32_le()? })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropertyRecord {
    pub name_hash: u32,
    pub string_offset: u32,
}

impl PropertyRecord {
    pub const SIZE: usize = 8;

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        Ok(Self { name_hash: reader.read_u32_le()?, string_offset: reader.read_u32_le()? })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Region {
    /// left, top, right, bottom
    pub bounds: [f32; 4],
    pub reserved: [u32; 8],
    pub name_hash: u32,
    pub name: String,
    pub flags: u32,
    pub value: f32,
    pub trailing: [u32; 13],
}

impl Region {
    pub const SIZE: usize = 0x90;

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let mut bounds = [0f32; 4];
        for b in &mut bounds {
            *b = reader.read_f32_le()?;
        }
        Ok(Self {
            bounds,
            reserved: reader.read_u32_words()?,
            name_hash: reader.read_u32_le()?,
            name: reader.read_fixed_string(32)?,
            flags: reader.read_u32_le()?,
            value: reader.read_f32_le()?,
            trailing: reader.read_u32_words()?,
        })
    }
}

/// Packed NUL-terminated strings addressed by byte offset
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    bytes: Vec<u8>,
}

impl StringTable {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn get(&self, offset: u32) -> Result<String> {
        let offset = offset as usize;
        if offset >= self.bytes.len() {
            return Err(Error::Bounds {
                table: "string table",
                offset: offset as u64,
                end: offset as u64 + 1,
                len: self.bytes.len(),
            });
        }
        BinaryReader::at(&self.bytes, offset).read_cstring()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Parsed `.lvb` container
#[derive(Debug, Clone, Default)]
pub struct ObjectContainer {
    pub header: ObjectHeader,
    pub property_counts: Vec<PropertyCount>,
    pub objects: Vec<ObjectRecord>,
    pub rect_batches: Vec<RectBatch>,
    pub rects: Vec<Rect>,
    pub property_values: Vec<PropertyRecord>,
    pub regions: Vec<Region>,
    pub strings: StringTable,
}

impl ObjectContainer {
    pub fn open(path: &Path) -> Result<Self> {
        check_extension(path, EXTENSION)?;
        let data = std::fs::read(path)?;
        info!(path = %path.display(), bytes = data.len(), "reading object container");
        Self::parse(&data)
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = {
            let mut reader = table_reader(data, "object header", 0, 1, ObjectHeader::SIZE)?;
            ObjectHeader::read(&mut reader)?
        };
        debug!(?header, "object header");

        let property_counts =
            header.property_counts.read_records(data, "property counts", PropertyCount::SIZE, PropertyCount::read)?;
        // Placement count lives in the value slot
        let objects = TableEntry { count: header.objects.value, ..header.objects }.read_records(
            data,
            "objects",
            ObjectRecord::SIZE,
            ObjectRecord::read,
        )?;
        let rect_batches = header.rect_batches.read_records(data, "rect batches", RectBatch::SIZE, RectBatch::read)?;
        let rects = header.rects.read_records(data, "rects", Rect::SIZE, Rect::read)?;
        let property_values =
            header.property_values.read_records(data, "property values", PropertyRecord::SIZE, PropertyRecord::read)?;
        let regions = TableEntry { count: header.regions.count.saturating_sub(1), ..header.regions }.read_records(
            data,
            "regions",
            Region::SIZE,
            Region::read,
        )?;
        let strings = {
            let len = header.strings.count as usize;
            let mut reader = table_reader(data, "string table", header.strings.offset, len, 1)?;
            StringTable::new(reader.read_bytes(len)?.to_vec())
        };

        let container = Self {
            header,
            property_counts,
            objects,
            rect_batches,
            rects,
            property_values,
            regions,
            strings,
        };
        container.validate()?;

        debug!(
            objects = container.objects.len(),
            properties = container.property_values.len(),
            rect_batches = container.rect_batches.len(),
            regions = container.regions.len(),
            strings = container.strings.len(),
            "object container parsed"
        );
        Ok(container)
    }

    /// Every property range and string offset must resolve
    fn validate(&self) -> Result<()> {
        for object in &self.objects {
            let range = object.property_range();
            if range.end > self.property_values.len() {
                return Err(Error::IndexOutOfRange {
                    table: "property values",
                    index: range.end.saturating_sub(1),
                    count: self.property_values.len(),
                });
            }
        }
        for record in &self.property_values {
            self.strings.get(record.string_offset)?;
        }
        Ok(())
    }

    pub fn properties_of(&self, object: &ObjectRecord) -> &[PropertyRecord] {
        self.property_values.get(object.property_range()).unwrap_or(&[])
    }

    pub fn declared_property_count(&self, type_id: u32) -> Option<u32> {
        self.property_counts.iter().find(|p| p.type_id == type_id).map(|p| p.count)
    }

    /// Rectangles of a batch; `None` if the batch's range is out of the table
    pub fn batch_rects(&self, batch: &RectBatch) -> Option<&[Rect]> {
        let start = batch.first as usize;
        self.rects.get(start..start + batch.count as usize)
    }
}
