use std::io::Cursor;

use crate::database::{DatabaseView, layout::Header};

use super::{
    Alphabets, InwardCode, OutwardCode, Records,
    error::DatabaseError,
    layout::{METADATA_FIELDS, OffsetsBytesIter, validate_offsets_iter, validate_records},
    rw::read_u32_bytes,
    util::{INWARD_RECORD_SIZE, OUTWARD_RECORD_SIZE, SECTOR_MEAN_FLAG},
};

impl<'a> DatabaseView<'a> {
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self, DatabaseError> {
        let header = Header::from_bytes(bytes)?;

        let alphabet_bytes = bytes
            .get(header.alphabets_offset..)
            .ok_or(DatabaseError::TooShort)?;
        let alphabets =
            Alphabets::from_reader(&mut Cursor::new(alphabet_bytes)).map_err(|err| match err {
                DatabaseError::DecompressionFailed => DatabaseError::TooShort,
                other => other,
            })?;

        let expected_metadata_offset = header.expected_metadata_offset(alphabets.encoded_len())?;
        if header.metadata_offset != expected_metadata_offset {
            return Err(DatabaseError::InvalidLayout);
        }

        let metadata_data_offset = header
            .metadata_offset
            .checked_add(Header::metadata_offsets_len())
            .ok_or(DatabaseError::InvalidLayout)?;
        if metadata_data_offset > bytes.len() {
            return Err(DatabaseError::TooShort);
        }
        let metadata_data_len = validate_offsets_iter(OffsetsBytesIter::new(
            bytes,
            header.metadata_offset,
            METADATA_FIELDS + 1,
        ))? as usize;

        let expected_outward_offset = header.expected_outward_offset(metadata_data_len)?;
        if header.outward_offset != expected_outward_offset {
            return Err(DatabaseError::InvalidLayout);
        }

        let version = metadata_string(bytes, header.metadata_offset, metadata_data_offset, 0)
            .ok_or(DatabaseError::InvalidLayout)?;
        let copyright = metadata_string(bytes, header.metadata_offset, metadata_data_offset, 1)
            .ok_or(DatabaseError::InvalidLayout)?;

        if header.inward_offset != header.expected_inward_offset()? {
            return Err(DatabaseError::InvalidLayout);
        }
        if header.expected_end()? > bytes.len() {
            return Err(DatabaseError::TooShort);
        }

        let view = Self {
            bytes,
            alphabets,
            version,
            copyright,
            outward_count: header.outward_count,
            inward_count: header.inward_count,
            outward_offset: header.outward_offset,
            inward_offset: header.inward_offset,
        };

        validate_records(&view)?;
        Ok(view)
    }

    /// Return true when the file holds no postcodes.
    pub fn is_empty(&self) -> bool {
        self.inward_count == 0
    }

    pub fn version(&self) -> &'a str {
        self.version
    }

    pub fn copyright(&self) -> &'a str {
        self.copyright
    }

    fn outward_record(&self, index: usize) -> Option<usize> {
        if index >= self.outward_count as usize {
            return None;
        }
        record_offset(self.bytes, self.outward_offset, index, OUTWARD_RECORD_SIZE)
    }

    fn inward_record(&self, index: usize) -> Option<usize> {
        if index >= self.inward_count as usize {
            return None;
        }
        record_offset(self.bytes, self.inward_offset, index, INWARD_RECORD_SIZE)
    }
}

impl Records for DatabaseView<'_> {
    fn alphabets(&self) -> &Alphabets {
        &self.alphabets
    }

    fn outward_count(&self) -> usize {
        self.outward_count as usize
    }

    fn inward_count(&self) -> usize {
        self.inward_count as usize
    }

    fn outward_at(&self, index: usize) -> Option<OutwardCode> {
        let base = self.outward_record(index)?;
        Some(OutwardCode {
            key: read_u32_bytes(self.bytes, base)?,
            origin_e: read_u32_bytes(self.bytes, base + 4)?,
            origin_n: read_u32_bytes(self.bytes, base + 8)?,
            max_offset_e: read_u32_bytes(self.bytes, base + 12)?,
            max_offset_n: read_u32_bytes(self.bytes, base + 16)?,
            inward_start: read_u32_bytes(self.bytes, base + 20)?,
        })
    }

    fn inward_at(&self, index: usize) -> Option<InwardCode> {
        let base = self.inward_record(index)?;
        let flags = *self.bytes.get(base + 12)?;
        Some(InwardCode {
            key: read_u32_bytes(self.bytes, base)?,
            offset_e: read_u32_bytes(self.bytes, base + 4)?,
            offset_n: read_u32_bytes(self.bytes, base + 8)?,
            sector_mean: flags & SECTOR_MEAN_FLAG != 0,
        })
    }

    // binary searches only need the key
    fn outward_key(&self, index: usize) -> Option<u32> {
        read_u32_bytes(self.bytes, self.outward_record(index)?)
    }

    fn inward_key(&self, index: usize) -> Option<u32> {
        read_u32_bytes(self.bytes, self.inward_record(index)?)
    }
}

fn record_offset(bytes: &[u8], section: usize, index: usize, size: usize) -> Option<usize> {
    let offset = index.checked_mul(size)?;
    let base = section.checked_add(offset)?;
    if base.checked_add(size)? <= bytes.len() {
        Some(base)
    } else {
        None
    }
}

fn metadata_string(
    bytes: &[u8],
    offsets_offset: usize,
    data_offset: usize,
    index: usize,
) -> Option<&str> {
    let start = read_u32_bytes(bytes, offsets_offset + index * 4)? as usize;
    let end = read_u32_bytes(bytes, offsets_offset + (index + 1) * 4)? as usize;
    if start > end {
        return None;
    }

    let start_abs = data_offset.checked_add(start)?;
    let end_abs = data_offset.checked_add(end)?;
    std::str::from_utf8(bytes.get(start_abs..end_abs)?).ok()
}
