#[cfg(feature = "compressed_database")]
use std::io::Read;

#[cfg(feature = "compressed_database")]
use super::{
    Alphabets, Database, InwardCode, OutwardCode,
    error::DatabaseError,
    layout::{Header, METADATA_FIELDS, validate_offsets_iter, validate_records},
    rw::{read_bytes, read_offsets, read_u32_reader},
    util::SECTOR_MEAN_FLAG,
};

#[cfg(feature = "compressed_database")]
const MAX_PREALLOCATED_RECORDS: usize = 1 << 16;

#[cfg(feature = "compressed_database")]
impl Database {
    /// Decode a database from a binary reader.
    pub(crate) fn from_reader<R: Read>(mut reader: R) -> Result<Self, DatabaseError> {
        let header = Header::from_reader(&mut reader)?;

        let alphabets = Alphabets::from_reader(&mut reader)?;
        let expected_metadata_offset = header.expected_metadata_offset(alphabets.encoded_len())?;
        if header.metadata_offset != expected_metadata_offset {
            return Err(DatabaseError::InvalidLayout);
        }

        let metadata_offsets = read_offsets(&mut reader, METADATA_FIELDS + 1)?;
        let metadata_data_len =
            validate_offsets_iter(metadata_offsets.iter().copied().map(Ok))? as usize;
        let expected_outward_offset = header.expected_outward_offset(metadata_data_len)?;
        if header.outward_offset != expected_outward_offset {
            return Err(DatabaseError::InvalidLayout);
        }

        let metadata_data = read_bytes(&mut reader, metadata_data_len)?;
        let mut metadata = decode_strings(&metadata_offsets, &metadata_data)?.into_iter();
        let version = metadata.next().ok_or(DatabaseError::InvalidLayout)?;
        let copyright = metadata.next().ok_or(DatabaseError::InvalidLayout)?;

        if header.inward_offset != header.expected_inward_offset()? {
            return Err(DatabaseError::InvalidLayout);
        }

        // counts come from an unchecked header, so only preallocate a bounded amount
        let mut outward_codes =
            Vec::with_capacity((header.outward_count as usize).min(MAX_PREALLOCATED_RECORDS));
        for _ in 0..header.outward_count {
            outward_codes.push(OutwardCode {
                key: read_u32_reader(&mut reader)?,
                origin_e: read_u32_reader(&mut reader)?,
                origin_n: read_u32_reader(&mut reader)?,
                max_offset_e: read_u32_reader(&mut reader)?,
                max_offset_n: read_u32_reader(&mut reader)?,
                inward_start: read_u32_reader(&mut reader)?,
            });
        }

        let mut inward_codes =
            Vec::with_capacity((header.inward_count as usize).min(MAX_PREALLOCATED_RECORDS));
        for _ in 0..header.inward_count {
            let key = read_u32_reader(&mut reader)?;
            let offset_e = read_u32_reader(&mut reader)?;
            let offset_n = read_u32_reader(&mut reader)?;
            let flags = read_bytes(&mut reader, 1)?[0];

            inward_codes.push(InwardCode {
                key,
                offset_e,
                offset_n,
                sector_mean: flags & SECTOR_MEAN_FLAG != 0,
            });
        }

        let database = Self {
            version,
            copyright,
            alphabets,
            outward_codes,
            inward_codes,
        };

        validate_records(&database)?;
        Ok(database)
    }
}

#[cfg(feature = "compressed_database")]
fn decode_strings(offsets: &[u32], data: &[u8]) -> Result<Vec<String>, DatabaseError> {
    if offsets.len() < 2 {
        return Err(DatabaseError::InvalidLayout);
    }
    let mut strings = Vec::with_capacity(offsets.len() - 1);
    for window in offsets.windows(2) {
        let start = window[0] as usize;
        let end = window[1] as usize;
        if start > end || end > data.len() {
            return Err(DatabaseError::InvalidLayout);
        }
        let value =
            std::str::from_utf8(&data[start..end]).map_err(|_| DatabaseError::InvalidLayout)?;
        strings.push(value.to_string());
    }
    Ok(strings)
}
