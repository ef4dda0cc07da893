use std::io::{Cursor, Read};

use crate::database::error::DatabaseError;

use super::{
    Records,
    rw::{read_u32_bytes, read_u32_reader},
    util::{DATABASE_HEADER_SIZE, DATABASE_MAGIC, INWARD_RECORD_SIZE, OUTWARD_RECORD_SIZE},
};

/// Version and copyright strings.
pub(crate) const METADATA_FIELDS: usize = 2;

pub(crate) struct Header {
    pub(crate) outward_count: u32,
    pub(crate) inward_count: u32,
    pub(crate) alphabets_offset: usize,
    pub(crate) metadata_offset: usize,
    pub(crate) outward_offset: usize,
    pub(crate) inward_offset: usize,
}

impl Header {
    pub(crate) fn validate_base(&self) -> Result<(), DatabaseError> {
        if self.alphabets_offset != DATABASE_HEADER_SIZE {
            return Err(DatabaseError::InvalidLayout);
        }
        Ok(())
    }

    pub(crate) fn metadata_offsets_len() -> usize {
        (METADATA_FIELDS + 1) * 4
    }

    pub(crate) fn expected_metadata_offset(
        &self,
        alphabets_len: usize,
    ) -> Result<usize, DatabaseError> {
        self.alphabets_offset
            .checked_add(alphabets_len)
            .ok_or(DatabaseError::InvalidLayout)
    }

    pub(crate) fn expected_outward_offset(
        &self,
        metadata_data_len: usize,
    ) -> Result<usize, DatabaseError> {
        self.metadata_offset
            .checked_add(Self::metadata_offsets_len())
            .and_then(|offset| offset.checked_add(metadata_data_len))
            .ok_or(DatabaseError::InvalidLayout)
    }

    pub(crate) fn outward_len(&self) -> Result<usize, DatabaseError> {
        (self.outward_count as usize)
            .checked_mul(OUTWARD_RECORD_SIZE)
            .ok_or(DatabaseError::InvalidLayout)
    }

    pub(crate) fn inward_len(&self) -> Result<usize, DatabaseError> {
        (self.inward_count as usize)
            .checked_mul(INWARD_RECORD_SIZE)
            .ok_or(DatabaseError::InvalidLayout)
    }

    pub(crate) fn expected_inward_offset(&self) -> Result<usize, DatabaseError> {
        self.outward_offset
            .checked_add(self.outward_len()?)
            .ok_or(DatabaseError::InvalidLayout)
    }

    pub(crate) fn expected_end(&self) -> Result<usize, DatabaseError> {
        self.inward_offset
            .checked_add(self.inward_len()?)
            .ok_or(DatabaseError::InvalidLayout)
    }

    pub(crate) fn from_reader<R: Read>(reader: &mut R) -> Result<Self, DatabaseError> {
        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|_| DatabaseError::DecompressionFailed)?;
        if magic != DATABASE_MAGIC {
            return Err(DatabaseError::InvalidMagic);
        }

        let outward_count = read_u32_reader(reader)?;
        let inward_count = read_u32_reader(reader)?;

        let alphabets_offset = read_u32_reader(reader)? as usize;
        let metadata_offset = read_u32_reader(reader)? as usize;
        let outward_offset = read_u32_reader(reader)? as usize;
        let inward_offset = read_u32_reader(reader)? as usize;

        let header = Self {
            outward_count,
            inward_count,
            alphabets_offset,
            metadata_offset,
            outward_offset,
            inward_offset,
        };

        header.validate_base()?;
        Ok(header)
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<Header, DatabaseError> {
        if bytes.len() < DATABASE_HEADER_SIZE {
            return Err(DatabaseError::TooShort);
        }
        let mut cursor = Cursor::new(bytes);
        Header::from_reader(&mut cursor)
    }
}

/// Check that string offsets start at zero and never decrease; returns the
/// total data length.
pub(crate) fn validate_offsets_iter<I>(iter: I) -> Result<u32, DatabaseError>
where
    I: IntoIterator<Item = Result<u32, DatabaseError>>,
{
    let mut iter = iter.into_iter();
    let first = iter
        .next()
        .transpose()?
        .ok_or(DatabaseError::InvalidLayout)?;
    if first != 0 {
        return Err(DatabaseError::InvalidLayout);
    }

    let mut prev = first;
    for value in iter {
        let value = value?;
        if value < prev {
            return Err(DatabaseError::InvalidLayout);
        }
        prev = value;
    }
    Ok(prev)
}

/// Check the ordering invariants lookups rely on: outward keys strictly
/// ascending, contiguous inward ranges, each range strictly ascending, and
/// every key decodable with the dataset's alphabets.
pub(crate) fn validate_records<R: Records + ?Sized>(records: &R) -> Result<(), DatabaseError> {
    let outward_capacity = records.alphabets().outward_capacity();
    let inward_capacity = records.alphabets().inward_capacity();

    let mut prev_key = None;
    for index in 0..records.outward_count() {
        let code = records
            .outward_at(index)
            .ok_or(DatabaseError::InvalidLayout)?;
        if code.key as u64 >= outward_capacity {
            return Err(DatabaseError::InvalidLayout);
        }
        if prev_key.is_some_and(|prev| prev >= code.key) {
            return Err(DatabaseError::UnsortedRecords);
        }
        if index == 0 && code.inward_start != 0 {
            return Err(DatabaseError::InvalidLayout);
        }
        prev_key = Some(code.key);

        let range = records
            .inward_range(index)
            .ok_or(DatabaseError::InvalidLayout)?;
        let mut prev_inward = None;
        for inward_index in range {
            let key = records
                .inward_key(inward_index)
                .ok_or(DatabaseError::InvalidLayout)?;
            if key as u64 >= inward_capacity {
                return Err(DatabaseError::InvalidLayout);
            }
            if prev_inward.is_some_and(|prev| prev >= key) {
                return Err(DatabaseError::UnsortedRecords);
            }
            prev_inward = Some(key);
        }
    }

    // inward records not owned by any outward group
    if records.outward_count() == 0 && records.inward_count() != 0 {
        return Err(DatabaseError::InvalidLayout);
    }

    Ok(())
}

pub(crate) struct OffsetsBytesIter<'a> {
    bytes: &'a [u8],
    base: usize,
    count: usize,
    index: usize,
}

impl<'a> OffsetsBytesIter<'a> {
    pub(crate) fn new(bytes: &'a [u8], base: usize, count: usize) -> Self {
        Self {
            bytes,
            base,
            count,
            index: 0,
        }
    }
}

impl<'a> Iterator for OffsetsBytesIter<'a> {
    type Item = Result<u32, DatabaseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let index = self.index;
        self.index += 1;

        let offset = match index
            .checked_mul(4)
            .and_then(|delta| self.base.checked_add(delta))
        {
            Some(offset) => offset,
            None => return Some(Err(DatabaseError::InvalidLayout)),
        };

        match read_u32_bytes(self.bytes, offset) {
            Some(value) => Some(Ok(value)),
            None => Some(Err(DatabaseError::TooShort)),
        }
    }
}
