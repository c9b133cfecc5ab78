//! Typed object property values
//!
//! Scene entities store one value per class property; the class declares
//! each property's type tag, and the tag alone decides the value's width
//! and shape on disk.
//!
//! | Tag | Type    | Encoding                          |
//! |-----|---------|-----------------------------------|
//! | 0   | UInt8   | u8                                |
//! | 1   | UInt16  | u16 LE                            |
//! | 2   | UInt32  | u32 LE                            |
//! | 3   | Int8    | i8                                |
//! | 4   | Int16   | i16 LE                            |
//! | 5   | Int32   | i32 LE                            |
//! | 6   | Enum    | i32 LE                            |
//! | 7   | Bool    | u32 LE                            |
//! | 8   | String  | u16 length + UTF-16 code units    |
//! | 9   | Vector2 | 2 x i32 LE (16.16 fixed point)    |
//! | 11  | Color   | u32 LE                            |

use crate::codec::{BinaryReader, BinaryWriter};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PropertyType {
    UInt8 = 0,
    UInt16 = 1,
    UInt32 = 2,
    Int8 = 3,
    Int16 = 4,
    Int32 = 5,
    Enum = 6,
    Bool = 7,
    String = 8,
    Vector2 = 9,
    Color = 11,
}

impl PropertyType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::UInt8),
            1 => Some(Self::UInt16),
            2 => Some(Self::UInt32),
            3 => Some(Self::Int8),
            4 => Some(Self::Int16),
            5 => Some(Self::Int32),
            6 => Some(Self::Enum),
            7 => Some(Self::Bool),
            8 => Some(Self::String),
            9 => Some(Self::Vector2),
            11 => Some(Self::Color),
            _ => None,
        }
    }

    /// Zero value written for entities that lack the property
    pub fn default_value(self) -> PropertyValue {
        match self {
            Self::UInt8 => PropertyValue::UInt8(0),
            Self::UInt16 => PropertyValue::UInt16(0),
            Self::UInt32 => PropertyValue::UInt32(0),
            Self::Int8 => PropertyValue::Int8(0),
            Self::Int16 => PropertyValue::Int16(0),
            Self::Int32 => PropertyValue::Int32(0),
            Self::Enum => PropertyValue::Enum(0),
            Self::Bool => PropertyValue::Bool(false),
            Self::String => PropertyValue::String(String::new()),
            Self::Vector2 => PropertyValue::Vector2(0, 0),
            Self::Color => PropertyValue::Color(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Enum(i32),
    Bool(bool),
    String(String),
    Vector2(i32, i32),
    Color(u32),
}

impl PropertyValue {
    pub fn property_type(&self) -> PropertyType {
        match self {
            Self::UInt8(_) => PropertyType::UInt8,
            Self::UInt16(_) => PropertyType::UInt16,
            Self::UInt32(_) => PropertyType::UInt32,
            Self::Int8(_) => PropertyType::Int8,
            Self::Int16(_) => PropertyType::Int16,
            Self::Int32(_) => PropertyType::Int32,
            Self::Enum(_) => PropertyType::Enum,
            Self::Bool(_) => PropertyType::Bool,
            Self::String(_) => PropertyType::String,
            Self::Vector2(..) => PropertyType::Vector2,
            Self::Color(_) => PropertyType::Color,
        }
    }

    /// Type a string pulled from the object container's string table
    pub fn infer(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Self::Bool(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Self::Bool(false)
        } else if let Ok(v) = trimmed.parse::<i32>() {
            Self::Int32(v)
        } else {
            Self::String(text.to_string())
        }
    }

    /// Convert to `ty`, falling back to the type's zero value when the shapes differ
    pub fn coerce(&self, ty: PropertyType) -> Self {
        if self.property_type() == ty {
            return self.clone();
        }
        match (self, ty) {
            (Self::Int32(v), PropertyType::Enum) => Self::Enum(*v),
            (Self::Bool(b), PropertyType::Int32) => Self::Int32(*b as i32),
            (_, PropertyType::String) => Self::String(self.to_string()),
            _ => ty.default_value(),
        }
    }

    pub fn read(reader: &mut BinaryReader, ty: PropertyType) -> Result<Self> {
        Ok(match ty {
            PropertyType::UInt8 => Self::UInt8(reader.read_u8()?),
            PropertyType::UInt16 => Self::UInt16(reader.read_u16_le()?),
            PropertyType::UInt32 => Self::UInt32(reader.read_u32_le()?),
            PropertyType::Int8 => Self::Int8(reader.read_i8()?),
            PropertyType::Int16 => Self::Int16(reader.read_i16_le()?),
            PropertyType::Int32 => Self::Int32(reader.read_i32_le()?),
            PropertyType::Enum => Self::Enum(reader.read_i32_le()?),
            PropertyType::Bool => Self::Bool(reader.read_u32_le()? != 0),
            PropertyType::String => {
                let len = reader.read_u16_le()? as usize;
                let mut units = Vec::with_capacity(len);
                for _ in 0..len {
                    units.push(reader.read_u16_le()?);
                }
                Self::String(String::from_utf16(&units).map_err(|_| {
                    Error::InvalidScene(format!("invalid UTF-16 string at {:#x}", reader.position()))
                })?)
            }
            PropertyType::Vector2 => Self::Vector2(reader.read_i32_le()?, reader.read_i32_le()?),
            PropertyType::Color => Self::Color(reader.read_u32_le()?),
        })
    }

    pub fn write(&self, writer: &mut BinaryWriter) {
        match self {
            Self::UInt8(v) => writer.write_u8(*v),
            Self::UInt16(v) => writer.write_u16_le(*v),
            Self::UInt32(v) => writer.write_u32_le(*v),
            Self::Int8(v) => writer.write_i8(*v),
            Self::Int16(v) => writer.write_i16_le(*v),
            Self::Int32(v) | Self::Enum(v) => writer.write_i32_le(*v),
            Self::Bool(v) => writer.write_u32_le(*v as u32),
            Self::String(s) => {
                let units: Vec<u16> = s.encode_utf16().collect();
                writer.write_u16_le(units.len() as u16);
                for unit in units {
                    writer.write_u16_le(unit);
                }
            }
            Self::Vector2(x, y) => {
                writer.write_i32_le(*x);
                writer.write_i32_le(*y);
            }
            Self::Color(v) => writer.write_u32_le(*v),
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UInt8(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) | Self::Enum(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
            Self::Vector2(x, y) => write!(f, "{x},{y}"),
            Self::Color(v) => write!(f, "#{:06x}", v & 0xFF_FFFF),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer() {
        assert_eq!(PropertyValue::infer("12"), PropertyValue::Int32(12));
        assert_eq!(PropertyValue::infer(" -3 "), PropertyValue::Int32(-3));
        assert_eq!(PropertyValue::infer("TRUE"), PropertyValue::Bool(true));
        assert_eq!(PropertyValue::infer("1.5"), PropertyValue::String("1.5".into()));
        assert_eq!(PropertyValue::infer("left"), PropertyValue::String("left".into()));
    }

    #[test]
    fn test_coerce() {
        let v = PropertyValue::Int32(4);
        assert_eq!(v.coerce(PropertyType::Enum), PropertyValue::Enum(4));
        assert_eq!(v.coerce(PropertyType::String), PropertyValue::String("4".into()));
        assert_eq!(PropertyValue::String("x".into()).coerce(PropertyType::Int32), PropertyValue::Int32(0));
    }

    #[test]
    fn test_read_write_each_type() {
        let values = vec![
            PropertyValue::UInt8(200),
            PropertyValue::UInt16(60000),
            PropertyValue::UInt32(0xDEADBEEF),
            PropertyValue::Int8(-5),
            PropertyValue::Int16(-300),
            PropertyValue::Int32(-70000),
            PropertyValue::Enum(3),
            PropertyValue::Bool(true),
            PropertyValue::String("Gem é".into()),
            PropertyValue::Vector2(0x10000, -0x8000),
            PropertyValue::Color(0xFF00FF),
        ];

        let mut writer = BinaryWriter::new();
        for v in &values {
            v.write(&mut writer);
        }
        let data = writer.into_vec();
        let mut reader = BinaryReader::new(&data);
        for v in &values {
            assert_eq!(&PropertyValue::read(&mut reader, v.property_type()).unwrap(), v);
        }
        assert!(reader.is_empty());
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(PropertyType::from_u8(10), None);
        assert_eq!(PropertyType::from_u8(11), Some(PropertyType::Color));
    }
}
