//! Image side outputs: the indexed tile atlas (GIF) and per-texture PNGs

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use tracing::{debug, info};

use crate::config::ConversionConfig;
use crate::convert::palette::{rgb, rgb_table};
use crate::convert::{Conversion, DecodedTexture, TextureKind, TileAtlas};
use crate::error::{Error, Result};

pub const ATLAS_FILE_NAME: &str = "16x16Tiles.gif";

pub fn texture_file_name(index: usize) -> String {
    format!("texture_{index}.png")
}

/// Encode the atlas as a single-frame GIF, trailer included; hands `out` back
pub fn encode_atlas<W: Write>(out: W, atlas: &TileAtlas, palette: &[u32; 256]) -> Result<W> {
    let palette = rgb_table(palette);
    let mut encoder = gif::Encoder::new(out, atlas.width() as u16, atlas.height() as u16, &palette)
        .map_err(|e| Error::Image(e.to_string()))?;
    let frame = gif::Frame {
        width: atlas.width() as u16,
        height: atlas.height() as u16,
        buffer: Cow::Borrowed(atlas.pixels()),
        ..gif::Frame::default()
    };
    encoder.write_frame(&frame).map_err(|e| Error::Image(e.to_string()))?;
    Ok(encoder.into_inner()?)
}

/// Write the atlas as a single-frame GIF carrying the reconstructed palette
pub fn write_atlas(path: &Path, conversion: &Conversion) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    let mut file = encode_atlas(file, &conversion.atlas, &conversion.palette)?;
    file.flush()?;
    info!(path = %path.display(), tiles = conversion.atlas.tile_count(), "atlas written");
    Ok(())
}

/// RGBA pixels of a texture. Indexed samples are scaled to a 32-entry
/// lookup into the palette texture's RGBA bytes; without a palette texture
/// the reconstructed palette is used.
pub fn texture_rgba(texture: &DecodedTexture, palette_texture: Option<&DecodedTexture>, palette: &[u32; 256]) -> Vec<u8> {
    match texture.kind {
        TextureKind::Rgba => texture.payload.clone(),
        TextureKind::Indexed => {
            let mut rgba = Vec::with_capacity(texture.payload.len() * 4);
            for &sample in &texture.payload {
                match palette_texture {
                    Some(source) => {
                        let offset = (sample as usize * 32 / 255) << 2;
                        match source.payload.get(offset..offset + 4) {
                            Some(px) => rgba.extend_from_slice(px),
                            None => rgba.extend_from_slice(&[0, 0, 0, 0]),
                        }
                    }
                    None => {
                        let [r, g, b] = rgb(palette[(sample >> 3) as usize]);
                        rgba.extend_from_slice(&[r, g, b, 0xFF]);
                    }
                }
            }
            rgba
        }
    }
}

/// Write every texture as PNG into `dir`; returns the written paths
pub fn write_textures(dir: &Path, conversion: &Conversion, config: &ConversionConfig) -> Result<Vec<PathBuf>> {
    let source = conversion.palette_texture(config);
    let mut written = Vec::new();
    for texture in &conversion.textures {
        let rgba = texture_rgba(texture, source, &conversion.palette);
        let Some(image) = RgbaImage::from_raw(texture.width, texture.height, rgba) else {
            debug!(texture = texture.index, "texture payload does not cover its dimensions, not exported");
            continue;
        };
        let path = dir.join(texture_file_name(texture.index));
        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| Error::Image(format!("{}: {e}", path.display())))?;
        written.push(path);
    }
    info!(count = written.len(), "textures exported");
    Ok(written)
}
