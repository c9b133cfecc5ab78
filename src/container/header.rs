use tracing::debug;

use crate::codec::BinaryReader;
use crate::error::{Error, Result};

/// Both containers start with 16 reserved/hash bytes; table offsets are relative to the end of it
pub const PREAMBLE_SIZE: usize = 0x10;

/// One `(value, count, offset)` header triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableEntry {
    pub value: u32,
    pub count: u32,
    pub offset: u64,
}

impl TableEntry {
    pub const SIZE: usize = 16;

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            value: reader.read_u32_le()?,
            count: reader.read_u32_le()?,
            offset: reader.read_u64_le()?,
        })
    }

    /// Read `self.count` records of `record_size` bytes at `self.offset`
    pub fn read_records<'a, T>(
        &self,
        data: &'a [u8],
        table: &'static str,
        record_size: usize,
        read: impl FnMut(&mut BinaryReader<'a>) -> Result<T>,
    ) -> Result<Vec<T>> {
        read_table(data, table, self.offset, self.count as usize, record_size, read)
    }
}

/// Resolve `records` fixed-size records at `entry.offset` and return a reader positioned on them.
///
/// Fails with [`Error::Bounds`] unless the whole range lies inside `data`.
pub fn table_reader<'a>(
    data: &'a [u8],
    table: &'static str,
    offset: u64,
    records: usize,
    record_size: usize,
) -> Result<BinaryReader<'a>> {
    let start = (PREAMBLE_SIZE as u64).checked_add(offset);
    let end = start.and_then(|s| s.checked_add((records as u64).checked_mul(record_size as u64)?));
    match (start, end) {
        (Some(start), Some(end)) if end <= data.len() as u64 => {
            debug!(table, start, records, "resolved table");
            Ok(BinaryReader::at(data, start as usize))
        }
        _ => Err(Error::Bounds {
            table,
            offset: start.unwrap_or(u64::MAX),
            end: end.unwrap_or(u64::MAX),
            len: data.len(),
        }),
    }
}

/// Read `count` records with `read` from a bounds-checked table
pub fn read_table<'a, T>(
    data: &'a [u8],
    table: &'static str,
    offset: u64,
    count: usize,
    record_size: usize,
    mut read: impl FnMut(&mut BinaryReader<'a>) -> Result<T>,
) -> Result<Vec<T>> {
    let mut reader = table_reader(data, table, offset, count, record_size)?;
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        records.push(read(&mut reader)?);
    }
    Ok(records)
}
