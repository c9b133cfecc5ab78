//! Length-prefixed zlib blocks
//!
//! ## Layout:
//!   Bytes 0-3:   Stored length (u32 LE) = compressed byte count + 4
//!   Bytes 4-7:   Decompressed length (u32 BE)
//!   Bytes 8+:    zlib stream
//!
//! Used for scene layer scroll indexes (u8), scene layer tiles (u16) and the
//! tile collision mask block.

use std::io::{Read, Write};

use byteorder::{ByteOrder, LittleEndian};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::{BinaryReader, BinaryWriter};
use crate::error::{Error, Result};

/// Read one block and return exactly its declared decompressed bytes
pub fn decode(reader: &mut BinaryReader) -> Result<Vec<u8>> {
    let stored = reader.read_u32_le()?;
    let expected = reader.read_u32_be()? as usize;
    let compressed_len = stored.checked_sub(4).ok_or_else(|| {
        Error::Decompression(format!("stored block length {stored} is smaller than its header"))
    })? as usize;
    let compressed = reader.read_bytes(compressed_len)?;

    let mut decoder = ZlibDecoder::new(compressed);
    let mut out = Vec::with_capacity(expected);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::Decompression(format!("zlib error: {e}")))?;

    if out.len() != expected {
        return Err(Error::Decompression(format!(
            "zlib block declared {expected} bytes, produced {}",
            out.len()
        )));
    }
    Ok(out)
}

/// Compress `payload` and write it as one block
pub fn encode(writer: &mut BinaryWriter, payload: &[u8]) -> Result<()> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload)?;
    let compressed = encoder.finish()?;

    writer.write_u32_le(compressed.len() as u32 + 4);
    writer.write_u32_be(payload.len() as u32);
    writer.write_bytes(&compressed);
    Ok(())
}

pub fn decode_u8(reader: &mut BinaryReader) -> Result<Vec<u8>> {
    decode(reader)
}

/// Decoded block length must be a whole number of `width`-byte elements
fn check_width(raw: &[u8], width: usize) -> Result<()> {
    if raw.len() % width != 0 {
        return Err(Error::Decompression(format!(
            "block of {} bytes is not a whole number of {width}-byte values",
            raw.len()
        )));
    }
    Ok(())
}

pub fn decode_u16(reader: &mut BinaryReader) -> Result<Vec<u16>> {
    let raw = decode(reader)?;
    check_width(&raw, 2)?;
    let mut values = vec![0u16; raw.len() / 2];
    LittleEndian::read_u16_into(&raw, &mut values);
    Ok(values)
}

pub fn decode_u32(reader: &mut BinaryReader) -> Result<Vec<u32>> {
    let raw = decode(reader)?;
    check_width(&raw, 4)?;
    let mut values = vec![0u32; raw.len() / 4];
    LittleEndian::read_u32_into(&raw, &mut values);
    Ok(values)
}

pub fn encode_u8(writer: &mut BinaryWriter, values: &[u8]) -> Result<()> {
    encode(writer, values)
}

pub fn encode_u16(writer: &mut BinaryWriter, values: &[u16]) -> Result<()> {
    let mut raw = vec![0u8; values.len() * 2];
    LittleEndian::write_u16_into(values, &mut raw);
    encode(writer, &raw)
}

pub fn encode_u32(writer: &mut BinaryWriter, values: &[u32]) -> Result<()> {
    let mut raw = vec![0u8; values.len() * 4];
    LittleEndian::write_u32_into(values, &mut raw);
    encode(writer, &raw)
}
