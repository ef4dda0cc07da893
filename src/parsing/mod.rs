mod codepoint;

use std::{
    error::Error,
    fs::File,
    io::{Cursor, Read, Seek},
    path::Path,
    time::Instant,
};

pub use codepoint::{CsvError, parse_codepoint_csv};
use rayon::prelude::*;
use zip::ZipArchive;

use crate::{PostcodeRecord, log_with_elapsed};

const CSV_DIR: &str = "Data/CSV/";

#[derive(Default, Debug)]
pub struct ParsedData {
    pub records: Vec<PostcodeRecord>,
}

impl ParsedData {
    /// Load and parse Code-Point Open data from a zip archive.
    pub fn from_codepoint_zip(zip_path: &Path, start: Instant) -> Result<ParsedData, Box<dyn Error>> {
        let f = File::open(zip_path)?;
        ParsedData::from_codepoint_archive(f, start)
    }

    pub fn from_codepoint_archive<R: Read + Seek>(
        reader: R,
        start: Instant,
    ) -> Result<ParsedData, Box<dyn Error>> {
        let files = read_csv_entries(reader)?;
        let total_bytes: usize = files.iter().map(|(_, bytes)| bytes.len()).sum();
        log_with_elapsed(
            start,
            &format!("Read {} CSV files ({total_bytes} bytes)", files.len()),
        );

        let parsed: Vec<Vec<PostcodeRecord>> = files
            .par_iter()
            .map(|(name, bytes)| {
                parse_codepoint_csv(Cursor::new(bytes.as_slice()))
                    .map_err(|err| format!("{name}: {err}"))
            })
            .collect::<Result<_, _>>()?;

        let records: Vec<PostcodeRecord> = parsed.into_iter().flatten().collect();
        log_with_elapsed(start, &format!("Parsed {} postcodes", records.len()));

        Ok(ParsedData { records })
    }
}

/// Collect the CSV entries in name order, so builds are reproducible.
fn read_csv_entries<R: Read + Seek>(reader: R) -> Result<Vec<(String, Vec<u8>)>, Box<dyn Error>> {
    let mut zip = ZipArchive::new(reader)?;
    let mut files = Vec::new();

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let name = entry.name().to_string();

        if entry.is_dir() || !name.starts_with(CSV_DIR) || !name.ends_with(".csv") {
            continue;
        }

        let mut buf = Vec::new();
        entry.read_to_end(&mut buf)?;
        files.push((name, buf));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}
