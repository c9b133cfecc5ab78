use crate::error::{Error, Result};

/// Bounds-checked little/big-endian reader over a byte slice
#[derive(Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Reader over the same data, positioned at an absolute offset
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let v = self.data[self.pos];
        self.pos += 1;
        Ok(v)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16_le(&mut self) -> Result<i16> {
        Ok(self.read_u16_le()? as i16)
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        Ok(self.read_u32_le()? as i32)
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32_le(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read `N` consecutive little-endian u32 words
    pub fn read_u32_words<const N: usize>(&mut self) -> Result<[u32; N]> {
        let mut words = [0u32; N];
        for word in &mut words {
            *word = self.read_u32_le()?;
        }
        Ok(words)
    }

    /// Read a fixed-width field holding a NUL-padded UTF-8 string
    pub fn read_fixed_string(&mut self, width: usize) -> Result<String> {
        let offset = self.pos;
        let bytes = self.read_bytes(width)?;
        decode_until_nul(bytes, offset)
    }

    /// Read a u8-length-prefixed string, truncated at the first NUL
    pub fn read_prefixed_string(&mut self) -> Result<String> {
        let len = self.read_u8()? as usize;
        let offset = self.pos;
        let bytes = self.read_bytes(len)?;
        decode_until_nul(bytes, offset)
    }

    /// Read a NUL-terminated string, consuming the terminator
    pub fn read_cstring(&mut self) -> Result<String> {
        let offset = self.pos;
        let rest = &self.data[self.pos.min(self.data.len())..];
        let len = rest.iter().position(|&b| b == 0).ok_or(Error::UnexpectedEof {
            offset,
            need: rest.len() + 1,
            have: rest.len(),
        })?;
        let bytes = self.read_bytes(len)?;
        self.pos += 1;
        String::from_utf8(bytes.to_vec()).map_err(|_| Error::InvalidString { offset })
    }

    /// Read remaining bytes
    pub fn read_remaining(&mut self) -> &'a [u8] {
        let slice = &self.data[self.pos.min(self.data.len())..];
        self.pos = self.data.len();
        slice
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(Error::UnexpectedEof {
                offset: self.pos,
                need: n,
                have: self.remaining(),
            });
        }
        Ok(())
    }
}

fn decode_until_nul(bytes: &[u8], offset: usize) -> Result<String> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8(bytes[..end].to_vec()).map_err(|_| Error::InvalidString { offset })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.read_u16_le().unwrap(), 0x0302);
        assert_eq!(reader.read_u32_le().unwrap(), 0x07060504);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_big_endian() {
        let data = [0x00, 0x00, 0x01, 0x00];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_u32_be().unwrap(), 0x100);
    }

    #[test]
    fn test_read_fixed_string() {
        let mut data = b"PF_BG".to_vec();
        data.resize(32, 0);
        data.push(0xAA);
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_fixed_string(32).unwrap(), "PF_BG");
        assert_eq!(reader.read_u8().unwrap(), 0xAA);
    }

    #[test]
    fn test_read_prefixed_string_stops_at_nul() {
        let data = [0x04, b'B', b'G', 0x00, b'x'];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_prefixed_string().unwrap(), "BG");
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_cstring() {
        let data = b"one\0two\0";
        let mut reader = BinaryReader::at(data, 4);
        assert_eq!(reader.read_cstring().unwrap(), "two");
        assert_eq!(reader.position(), 8);

        let mut unterminated = BinaryReader::new(b"abc");
        assert!(matches!(unterminated.read_cstring(), Err(Error::UnexpectedEof { .. })));
    }

    #[test]
    fn test_short_read_reports_offset() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);
        reader.skip(1).unwrap();
        match reader.read_u32_le() {
            Err(Error::UnexpectedEof { offset, need, have }) => {
                assert_eq!((offset, need, have), (1, 4, 1));
            }
            other => panic!("expected eof, got {other:?}"),
        }
    }
}
