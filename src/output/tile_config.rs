//! Tile collision file (`TileConfig.bin`)
//!
//! A `TIL\0` magic followed by one stream block holding two collision
//! planes of 0x400 masks each. A mask is 0x26 bytes:
//!   16 bytes height per column, 16 bytes column-has-collision,
//!   ceiling flag, top/left/right/bottom angles, behaviour.

use std::collections::BTreeSet;

use crate::codec::{stream, BinaryReader, BinaryWriter};
use crate::error::{Error, Result};

pub const TILE_CONFIG_MAGIC: u32 = 0x004C_4954;
pub const FILE_NAME: &str = "TileConfig.bin";

/// Masks per collision plane
pub const TILE_COUNT: usize = 0x400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionMask {
    pub collision: [u8; 16],
    pub has_collision: [u8; 16],
    pub is_ceiling: bool,
    pub top_angle: u8,
    pub left_angle: u8,
    pub right_angle: u8,
    pub bottom_angle: u8,
    pub behaviour: u8,
}

impl Default for CollisionMask {
    fn default() -> Self {
        Self {
            collision: [0; 16],
            has_collision: [0; 16],
            is_ceiling: false,
            top_angle: 0x00,
            left_angle: 0xC0,
            right_angle: 0x40,
            bottom_angle: 0x80,
            behaviour: 0,
        }
    }
}

impl CollisionMask {
    pub const SIZE: usize = 0x26;

    /// Mask with every column colliding
    pub fn solid() -> Self {
        Self { has_collision: [1; 16], ..Self::default() }
    }

    pub fn is_solid(&self) -> bool {
        self.has_collision.iter().all(|&c| c != 0)
    }

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            collision: reader.read_array()?,
            has_collision: reader.read_array()?,
            is_ceiling: reader.read_bool()?,
            top_angle: reader.read_u8()?,
            left_angle: reader.read_u8()?,
            right_angle: reader.read_u8()?,
            bottom_angle: reader.read_u8()?,
            behaviour: reader.read_u8()?,
        })
    }

    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_bytes(&self.collision);
        writer.write_bytes(&self.has_collision);
        writer.write_bool(self.is_ceiling);
        writer.write_u8(self.top_angle);
        writer.write_u8(self.left_angle);
        writer.write_u8(self.right_angle);
        writer.write_u8(self.bottom_angle);
        writer.write_u8(self.behaviour);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileConfig {
    pub plane_a: Vec<CollisionMask>,
    pub plane_b: Vec<CollisionMask>,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            plane_a: vec![CollisionMask::default(); TILE_COUNT],
            plane_b: vec![CollisionMask::default(); TILE_COUNT],
        }
    }
}

impl TileConfig {
    /// Only the listed tiles collide, fully, on both planes
    pub fn with_solids(solids: &BTreeSet<u16>) -> Self {
        let mut config = Self::default();
        for &id in solids {
            let id = id as usize;
            if id < TILE_COUNT {
                config.plane_a[id] = CollisionMask::solid();
                config.plane_b[id] = CollisionMask::solid();
            }
        }
        config
    }

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let magic = reader.read_u32_le()?;
        if magic != TILE_CONFIG_MAGIC {
            return Err(Error::InvalidScene(format!("tile config magic {magic:#x}")));
        }
        let payload = stream::decode(reader)?;
        if payload.len() != 2 * TILE_COUNT * CollisionMask::SIZE {
            return Err(Error::InvalidScene(format!("tile config payload is {} bytes", payload.len())));
        }

        let mut masks = BinaryReader::new(&payload);
        let mut read_plane = || (0..TILE_COUNT).map(|_| CollisionMask::read(&mut masks)).collect::<Result<Vec<_>>>();
        let plane_a = read_plane()?;
        let plane_b = read_plane()?;
        Ok(Self { plane_a, plane_b })
    }

    pub fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_u32_le(TILE_CONFIG_MAGIC);
        let mut masks = BinaryWriter::with_capacity(2 * TILE_COUNT * CollisionMask::SIZE);
        for mask in self.plane_a.iter().chain(&self.plane_b) {
            mask.write(&mut masks);
        }
        stream::encode(writer, masks.as_slice())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = BinaryWriter::new();
        self.write(&mut writer)?;
        Ok(writer.into_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_layout() {
        let mut writer = BinaryWriter::new();
        CollisionMask::default().write(&mut writer);
        let bytes = writer.into_vec();
        assert_eq!(bytes.len(), CollisionMask::SIZE);
        assert_eq!(&bytes[32..], &[0, 0x00, 0xC0, 0x40, 0x80, 0]);
    }

    #[test]
    fn test_solids_on_both_planes() {
        let solids: BTreeSet<u16> = [7, 0x3FF].into_iter().collect();
        let config = TileConfig::with_solids(&solids);
        assert!(config.plane_a[7].is_solid() && config.plane_b[7].is_solid());
        assert!(config.plane_a[0x3FF].is_solid());
        assert_eq!(config.plane_a.iter().filter(|m| m.is_solid()).count(), 2);
        assert_eq!(config.plane_a[7].collision, [0; 16]);
    }

    #[test]
    fn test_read_back() {
        let solids: BTreeSet<u16> = [3].into_iter().collect();
        let config = TileConfig::with_solids(&solids);
        let bytes = config.to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"TIL\0");
        let back = TileConfig::read(&mut BinaryReader::new(&bytes)).unwrap();
        assert_eq!(back, config);
    }
}
