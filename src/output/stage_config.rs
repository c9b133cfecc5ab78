//! Stage configuration file (`StageConfig.bin`)
//!
//! ## Layout:
//!   u32   magic `CFG\0`
//!   u8    load global objects
//!   u8    class name count, u8-prefixed names
//!   8 x   palette bank: u16 row mask, then 16 RGB triples per set row
//!   u8    sound count, per sound a u8-prefixed name and u8 max concurrent plays

use crate::codec::{BinaryReader, BinaryWriter};
use crate::convert::palette::rgb;
use crate::convert::PALETTE_SIZE;
use crate::error::{Error, Result};

pub const STAGE_CONFIG_MAGIC: u32 = 0x0047_4643;
pub const FILE_NAME: &str = "StageConfig.bin";

pub const PALETTE_BANKS: usize = 8;
pub const PALETTE_ROWS: usize = 16;
pub const PALETTE_COLUMNS: usize = 16;

pub type Rgb = [u8; 3];
pub type PaletteRow = [Rgb; PALETTE_COLUMNS];

/// 16 optional rows of 16 colours
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteBank {
    pub rows: [Option<PaletteRow>; PALETTE_ROWS],
}

impl Default for PaletteBank {
    fn default() -> Self {
        Self { rows: [Some([[0; 3]; PALETTE_COLUMNS]); PALETTE_ROWS] }
    }
}

impl PaletteBank {
    /// Bank holding a full 256-entry ABGR palette
    pub fn from_abgr(entries: &[u32; PALETTE_SIZE]) -> Self {
        let mut bank = Self::default();
        for (i, &abgr) in entries.iter().enumerate() {
            if let Some(row) = &mut bank.rows[i / PALETTE_COLUMNS] {
                row[i % PALETTE_COLUMNS] = rgb(abgr);
            }
        }
        bank
    }

    pub fn color(&self, index: usize) -> Option<Rgb> {
        self.rows.get(index / PALETTE_COLUMNS)?.map(|row| row[index % PALETTE_COLUMNS])
    }

    fn row_mask(&self) -> u16 {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_some())
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let mask = reader.read_u16_le()?;
        let mut rows = [None; PALETTE_ROWS];
        for (i, row) in rows.iter_mut().enumerate() {
            if mask & (1 << i) == 0 {
                continue;
            }
            let mut colors = [[0u8; 3]; PALETTE_COLUMNS];
            for color in &mut colors {
                *color = reader.read_array()?;
            }
            *row = Some(colors);
        }
        Ok(Self { rows })
    }

    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u16_le(self.row_mask());
        for row in self.rows.iter().flatten() {
            for color in row {
                writer.write_bytes(color);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundConfig {
    pub name: String,
    pub max_concurrent_plays: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageConfig {
    pub load_global_objects: bool,
    pub class_names: Vec<String>,
    pub palettes: [PaletteBank; PALETTE_BANKS],
    pub sounds: Vec<SoundConfig>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            load_global_objects: false,
            class_names: Vec::new(),
            palettes: std::array::from_fn(|_| PaletteBank::default()),
            sounds: Vec::new(),
        }
    }
}

impl StageConfig {
    pub fn new(class_names: Vec<String>, palette: &[u32; PALETTE_SIZE]) -> Self {
        let mut config = Self { class_names, ..Self::default() };
        config.palettes[0] = PaletteBank::from_abgr(palette);
        config
    }

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let magic = reader.read_u32_le()?;
        if magic != STAGE_CONFIG_MAGIC {
            return Err(Error::InvalidScene(format!("stage config magic {magic:#x}")));
        }
        let load_global_objects = reader.read_bool()?;
        let name_count = reader.read_u8()?;
        let class_names = (0..name_count).map(|_| reader.read_prefixed_string()).collect::<Result<Vec<_>>>()?;

        let mut palettes: [PaletteBank; PALETTE_BANKS] = std::array::from_fn(|_| PaletteBank::default());
        for bank in &mut palettes {
            *bank = PaletteBank::read(reader)?;
        }

        let sound_count = reader.read_u8()?;
        let mut sounds = Vec::with_capacity(sound_count as usize);
        for _ in 0..sound_count {
            sounds.push(SoundConfig { name: reader.read_prefixed_string()?, max_concurrent_plays: reader.read_u8()? });
        }
        Ok(Self { load_global_objects, class_names, palettes, sounds })
    }

    pub fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_u32_le(STAGE_CONFIG_MAGIC);
        writer.write_bool(self.load_global_objects);
        writer.write_u8(
            u8::try_from(self.class_names.len())
                .map_err(|_| Error::InvalidScene(format!("{} class names", self.class_names.len())))?,
        );
        for name in &self.class_names {
            writer.write_prefixed_string(name);
        }
        for bank in &self.palettes {
            bank.write(writer);
        }
        writer.write_u8(
            u8::try_from(self.sounds.len()).map_err(|_| Error::InvalidScene(format!("{} sounds", self.sounds.len())))?,
        );
        for sound in &self.sounds {
            writer.write_prefixed_string(&sound.name);
            writer.write_u8(sound.max_concurrent_plays);
        }
        Ok(())
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
    use crate::convert::palette::MAGENTA_ABGR;

    #[test]
    fn test_default_size() {
        let bytes = StageConfig::default().to_bytes().unwrap();
        // magic, flag, name count, 8 banks of mask + 768 bytes, sound count
        assert_eq!(bytes.len(), 4 + 1 + 1 + PALETTE_BANKS * (2 + 768) + 1);
        assert_eq!(&bytes[6..8], &[0xFF, 0xFF]);
    }

    #[test]
    fn test_palette_bank_from_abgr() {
        let mut entries = [0xFF7F_00FF; PALETTE_SIZE];
        entries[0] = MAGENTA_ABGR;
        entries[17] = 0xFF11_2233;
        let bank = PaletteBank::from_abgr(&entries);
        assert_eq!(bank.color(0), Some([0xFF, 0x00, 0xFF]));
        assert_eq!(bank.color(17), Some([0x33, 0x22, 0x11]));
        assert_eq!(bank.color(255), Some([0xFF, 0x00, 0x7F]));
    }

    #[test]
    fn test_read_back() {
        let mut entries = [0u32; PALETTE_SIZE];
        entries[1] = 0x00AB_CDEF;
        let mut config = StageConfig::new(vec!["Player".into(), "Beeto".into()], &entries);
        config.palettes[3].rows[2] = None;
        config.sounds.push(SoundConfig { name: "Jump.wav".into(), max_concurrent_plays: 0xFF });

        let bytes = config.to_bytes().unwrap();
        let back = StageConfig::read(&mut BinaryReader::new(&bytes)).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.palettes[0].color(1), Some([0xEF, 0xCD, 0xAB]));
    }
}
