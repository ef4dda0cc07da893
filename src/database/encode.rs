use std::io::{self, Write};

#[cfg(feature = "create")]
use std::{fs::File, path::Path};

#[cfg(all(feature = "create", feature = "compressed_database"))]
use flate2::{Compression, write::GzEncoder};

use super::{
    Database,
    layout::METADATA_FIELDS,
    util::{DATABASE_HEADER_SIZE, DATABASE_MAGIC, OUTWARD_RECORD_SIZE, SECTOR_MEAN_FLAG},
};

impl Database {
    /// Serialize the database to a file (compressed when the
    /// `compressed_database` feature is enabled).
    #[cfg(feature = "create")]
    pub fn encode(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;

        #[cfg(feature = "compressed_database")]
        {
            let mut encoder = GzEncoder::new(file, Compression::default());
            self.write_to(&mut encoder)?;
            encoder.finish()?;
            Ok(())
        }

        #[cfg(not(feature = "compressed_database"))]
        {
            let mut writer = io::BufWriter::new(file);
            self.write_to(&mut writer)?;
            writer.flush()
        }
    }

    /// Write the uncompressed binary layout.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let outward_count = u32::try_from(self.outward_codes.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "outward count overflow"))?;
        let inward_count = u32::try_from(self.inward_codes.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "inward count overflow"))?;

        let alphabets = self.alphabets.to_bytes();
        let metadata = [self.version.as_str(), self.copyright.as_str()];
        let metadata_len: usize = metadata.iter().map(|value| value.len()).sum();

        let alphabets_offset = DATABASE_HEADER_SIZE;
        let metadata_offset = alphabets_offset + alphabets.len();
        let outward_offset = metadata_offset + (METADATA_FIELDS + 1) * 4 + metadata_len;
        let inward_offset = outward_offset + self.outward_codes.len() * OUTWARD_RECORD_SIZE;

        let offset_u32 = |offset: usize| {
            u32::try_from(offset)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "database too large"))
        };

        writer.write_all(&DATABASE_MAGIC)?;
        writer.write_all(&outward_count.to_le_bytes())?;
        writer.write_all(&inward_count.to_le_bytes())?;
        writer.write_all(&offset_u32(alphabets_offset)?.to_le_bytes())?;
        writer.write_all(&offset_u32(metadata_offset)?.to_le_bytes())?;
        writer.write_all(&offset_u32(outward_offset)?.to_le_bytes())?;
        writer.write_all(&offset_u32(inward_offset)?.to_le_bytes())?;

        writer.write_all(&alphabets)?;

        let mut offset = 0u32;
        writer.write_all(&offset.to_le_bytes())?;
        for value in metadata {
            offset = offset.saturating_add(value.len() as u32);
            writer.write_all(&offset.to_le_bytes())?;
        }
        for value in metadata {
            writer.write_all(value.as_bytes())?;
        }

        for code in &self.outward_codes {
            writer.write_all(&code.key.to_le_bytes())?;
            writer.write_all(&code.origin_e.to_le_bytes())?;
            writer.write_all(&code.origin_n.to_le_bytes())?;
            writer.write_all(&code.max_offset_e.to_le_bytes())?;
            writer.write_all(&code.max_offset_n.to_le_bytes())?;
            writer.write_all(&code.inward_start.to_le_bytes())?;
        }

        for code in &self.inward_codes {
            writer.write_all(&code.key.to_le_bytes())?;
            writer.write_all(&code.offset_e.to_le_bytes())?;
            writer.write_all(&code.offset_n.to_le_bytes())?;
            let flags = if code.sector_mean { SECTOR_MEAN_FLAG } else { 0 };
            writer.write_all(&[flags])?;
        }

        Ok(())
    }
}
