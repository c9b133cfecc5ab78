//! Block LZ decoder for embedded texture payloads
//!
//! ## Header (12 bytes):
//!   Bytes 0-3:   Magic "WFLZ"
//!   Bytes 4-7:   Compressed size (u32 LE)
//!   Bytes 8-11:  Decompressed size (u32 LE)
//!
//! ## Control block (4 bytes):
//!   Bytes 0-1:   Back-reference distance (u16 LE)
//!   Byte 2:      Match length minus (MIN_MATCH_LEN - 1), 0 = no match
//!   Byte 3:      Literal count following the match
//!
//! The first block after the header only contributes its literal count.
//! A block with zero distance and zero length, once its literals are
//! consumed, terminates the stream.

use super::BinaryReader;
use crate::error::{Error, Result};

pub const MAGIC: [u8; 4] = *b"WFLZ";
pub const BLOCK_SIZE: usize = 4;
pub const MIN_MATCH_LEN: usize = BLOCK_SIZE + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WflzHeader {
    pub compressed_size: u32,
    pub decompressed_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ControlBlock {
    distance: u16,
    length: u8,
    literals: u8,
}

impl ControlBlock {
    fn read(reader: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            distance: reader.read_u16_le().map_err(truncated)?,
            length: reader.read_u8().map_err(truncated)?,
            literals: reader.read_u8().map_err(truncated)?,
        })
    }

    fn is_terminator(&self) -> bool {
        self.distance == 0 && self.length == 0
    }
}

pub fn read_header(reader: &mut BinaryReader) -> Result<WflzHeader> {
    let magic: [u8; 4] = reader.read_array().map_err(truncated)?;
    if magic != MAGIC {
        return Err(Error::Decompression(format!("bad magic {magic:02X?}")));
    }
    Ok(WflzHeader {
        compressed_size: reader.read_u32_le().map_err(truncated)?,
        decompressed_size: reader.read_u32_le().map_err(truncated)?,
    })
}

/// Decode one stream starting at the reader's position
pub fn decompress(reader: &mut BinaryReader) -> Result<Vec<u8>> {
    let header = read_header(reader)?;
    let size = header.decompressed_size as usize;
    let mut out = vec![0u8; size];
    let mut pos = 0usize;

    let mut literals = ControlBlock::read(reader)?.literals as usize;
    let mut previous: Option<ControlBlock> = None;

    loop {
        if literals != 0 {
            if pos + literals > size {
                return Err(overrun(size));
            }
            let bytes = reader.read_bytes(literals).map_err(truncated)?;
            out[pos..pos + literals].copy_from_slice(bytes);
            pos += literals;
        } else if previous.is_some_and(|block| block.is_terminator()) {
            break;
        }

        let block = ControlBlock::read(reader)?;
        literals = block.literals as usize;
        previous = Some(block);

        if block.length != 0 {
            let distance = block.distance as usize;
            let length = block.length as usize + MIN_MATCH_LEN - 1;
            if distance == 0 || distance > pos {
                return Err(Error::Decompression(format!(
                    "back reference distance {distance} at output offset {pos}"
                )));
            }
            if pos + length > size {
                return Err(overrun(size));
            }
            // Byte-wise: distance may be shorter than length
            for _ in 0..length {
                out[pos] = out[pos - distance];
                pos += 1;
            }
        }
    }

    if pos != size {
        return Err(Error::Decompression(format!(
            "stream ended after {pos} of {size} bytes"
        )));
    }
    Ok(out)
}

pub fn decompress_slice(data: &[u8]) -> Result<Vec<u8>> {
    decompress(&mut BinaryReader::new(data))
}

/// Compression is not supported; always returns an empty buffer.
pub fn compress(_data: &[u8]) -> Vec<u8> {
    Vec::new()
}

fn truncated(e: Error) -> Error {
    Error::Decompression(format!("truncated stream: {e}"))
}

fn overrun(size: usize) -> Error {
    Error::Decompression(format!("stream writes past declared size {size}"))
}
