//! Palette reconstruction from embedded textures
//!
//! Colours are ABGR words as stored in 4-byte texture samples; the RGB
//! triple of an entry is its low three bytes (R in the lowest byte).

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::config::ConversionConfig;
use crate::container::TileContainer;
use crate::error::{Error, Result};

pub const PALETTE_SIZE: usize = 256;

/// Index 0 is always shown as magenta (transparent)
pub const MAGENTA_ABGR: u32 = 0xFFFF_00FF;

/// Pixel layout of a decoded texture payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    /// Four bytes per pixel, ABGR
    Rgba,
    /// One byte per pixel, already palette-indexed
    Indexed,
}

impl TextureKind {
    /// `len == w * h * 4` is the only signal the container gives
    pub fn detect(payload_len: usize, pixel_count: usize) -> Self {
        if pixel_count > 0 && payload_len == pixel_count * 4 {
            Self::Rgba
        } else {
            Self::Indexed
        }
    }
}

/// A texture payload with its palette-indexed view
#[derive(Debug, Clone)]
pub struct DecodedTexture {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub kind: TextureKind,
    pub payload: Vec<u8>,
    pub indexed: Vec<u8>,
}

impl DecodedTexture {
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width {
            return None;
        }
        self.indexed.get(y as usize * self.width as usize + x as usize).copied()
    }
}

/// Colours in first-seen order, at most 256
#[derive(Debug, Clone, Default)]
pub struct Palette {
    colors: Vec<u32>,
    lookup: AHashMap<u32, u8>,
    overflowed: usize,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Colours that did not fit and were mapped to their nearest entry
    pub fn overflowed(&self) -> usize {
        self.overflowed
    }

    /// Index of `abgr`, assigning the next free index if it is new
    pub fn index_or_insert(&mut self, abgr: u32) -> u8 {
        if let Some(&index) = self.lookup.get(&abgr) {
            return index;
        }
        if self.colors.len() < PALETTE_SIZE {
            let index = self.colors.len() as u8;
            self.colors.push(abgr);
            self.lookup.insert(abgr, index);
            return index;
        }
        self.overflowed += 1;
        self.nearest(abgr)
    }

    pub fn index_of(&self, abgr: u32) -> Option<u8> {
        self.lookup.get(&abgr).copied()
    }

    /// Closest entry by squared RGB distance
    pub fn nearest(&self, abgr: u32) -> u8 {
        let [r, g, b] = rgb(abgr).map(i32::from);
        self.colors
            .iter()
            .enumerate()
            .min_by_key(|(_, &c)| {
                let [cr, cg, cb] = rgb(c).map(i32::from);
                (r - cr).pow(2) + (g - cg).pow(2) + (b - cb).pow(2)
            })
            .map_or(0, |(i, _)| i as u8)
    }

    /// Discovered colours padded to 256 entries, index 0 forced to magenta
    pub fn finish(&self, padding_abgr: u32) -> [u32; PALETTE_SIZE] {
        let mut entries = [padding_abgr; PALETTE_SIZE];
        entries[..self.colors.len()].copy_from_slice(&self.colors);
        entries[0] = MAGENTA_ABGR;
        entries
    }
}

/// RGB bytes of an ABGR word
pub fn rgb(abgr: u32) -> [u8; 3] {
    [abgr as u8, (abgr >> 8) as u8, (abgr >> 16) as u8]
}

/// 768-byte RGB table of a finished palette
pub fn rgb_table(entries: &[u32; PALETTE_SIZE]) -> Vec<u8> {
    entries.iter().flat_map(|&c| rgb(c)).collect()
}

fn abgr_samples(payload: &[u8]) -> impl Iterator<Item = u32> + '_ {
    payload.chunks_exact(4).map(|s| u32::from_le_bytes([s[0], s[1], s[2], s[3]]))
}

/// Scan every texture, building the palette and each texture's indexed view
pub fn discover(tiles: &TileContainer, config: &ConversionConfig) -> Result<(Palette, Vec<DecodedTexture>)> {
    let mut palette = Palette::new();
    let mut payloads = Vec::with_capacity(tiles.textures.len());
    for index in 0..tiles.textures.len() {
        payloads.push(tiles.texture_payload(index)?);
    }

    if let Some(index) = config.palette_texture {
        let payload = payloads.get(index).ok_or(Error::IndexOutOfRange {
            table: "textures",
            index,
            count: payloads.len(),
        })?;
        for abgr in abgr_samples(payload) {
            if abgr != config.transparent_abgr {
                palette.index_or_insert(abgr);
            }
        }
        debug!(texture = index, colors = palette.len(), "palette texture scanned");
    }

    let mut textures = Vec::with_capacity(payloads.len());
    for (index, payload) in payloads.into_iter().enumerate() {
        let info = tiles.texture(index)?;
        let kind = TextureKind::detect(payload.len(), info.pixel_count());
        let indexed = match kind {
            TextureKind::Rgba if Some(index) == config.palette_texture => abgr_samples(&payload)
                .map(|abgr| palette.index_of(abgr).unwrap_or_else(|| palette.nearest(abgr)))
                .collect(),
            TextureKind::Rgba => abgr_samples(&payload).map(|abgr| palette.index_or_insert(abgr)).collect(),
            TextureKind::Indexed => payload.iter().map(|b| b >> 3).collect(),
        };
        debug!(texture = index, width = info.width, height = info.height, ?kind, "texture decoded");
        textures.push(DecodedTexture {
            index,
            width: info.width,
            height: info.height,
            kind,
            payload,
            indexed,
        });
    }

    if palette.overflowed() > 0 {
        warn!(extra = palette.overflowed(), "more than 256 colours; extras mapped to nearest entry");
    }
    Ok((palette, textures))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_order() {
        let mut palette = Palette::new();
        assert_eq!(palette.index_or_insert(0xFF112233), 0);
        assert_eq!(palette.index_or_insert(0xFF445566), 1);
        assert_eq!(palette.index_or_insert(0xFF112233), 0);
        assert_eq!(palette.len(), 2);
    }

    #[test]
    fn test_finish_pads_and_forces_magenta() {
        let mut palette = Palette::new();
        palette.index_or_insert(0xFF000000);
        palette.index_or_insert(0xFF0000FF);
        let entries = palette.finish(0xFF7F00FF);
        assert_eq!(entries[0], MAGENTA_ABGR);
        assert_eq!(entries[1], 0xFF0000FF);
        assert!(entries[2..].iter().all(|&c| c == 0xFF7F00FF));
        assert_eq!(&rgb_table(&entries)[..3], &[0xFF, 0x00, 0xFF]);
    }

    #[test]
    fn test_overflow_maps_to_nearest() {
        let mut palette = Palette::new();
        for i in 0..256u32 {
            palette.index_or_insert(0xFF00_0000 | i);
        }
        assert_eq!(palette.len(), PALETTE_SIZE);
        // red 0x0A exists at index 10; a slight green shift lands on it
        assert_eq!(palette.index_or_insert(0xFF00_010A), 10);
        assert_eq!(palette.len(), PALETTE_SIZE);
        assert_eq!(palette.overflowed(), 1);
    }

    #[test]
    fn test_rgb_byte_order() {
        assert_eq!(rgb(0xFF7F00FF), [0xFF, 0x00, 0x7F]);
    }

    #[test]
    fn test_texture_kind() {
        assert_eq!(TextureKind::detect(64, 16), TextureKind::Rgba);
        assert_eq!(TextureKind::detect(16, 16), TextureKind::Indexed);
        assert_eq!(TextureKind::detect(0, 0), TextureKind::Indexed);
    }
}
