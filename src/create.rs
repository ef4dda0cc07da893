use std::{
    error::Error,
    path::{Path, PathBuf},
    time::Instant,
};

use crate::{Alphabets, Database, log_with_elapsed, parsing::ParsedData};

static DOWNLOAD_URL: &str =
    "https://api.os.uk/downloads/v1/products/CodePointOpen/downloads?area=GB&format=CSV&redirect";
static ZIP_PATH: &str = "data/codepo_gb.zip";
static OUTPUT_PATH: &str = "data/postcodes.bin";

static DEFAULT_VERSION: &str = "Code-Point Open";
static COPYRIGHT: &str = "Contains OS data (C) Crown copyright and database right\n\
Contains Royal Mail data (C) Royal Mail copyright and database right\n\
Contains National Statistics data (C) Crown copyright and database right";

/// Build the postcode database file if it does not already exist.
pub fn create_database() -> Result<(), Box<dyn Error>> {
    let start = Instant::now();
    let output_path = Path::new(OUTPUT_PATH);

    if output_path.exists() && output_path.metadata()?.len() > 0 {
        log_with_elapsed(start, "Postcode database already exists, skipping creation.");
        return Ok(());
    }

    let zip_path = ensure_zip_available(start)?;
    let data = ParsedData::from_codepoint_zip(&zip_path, start)?;
    let database = build_database(data, data_version())?;

    log_with_elapsed(
        start,
        &format!(
            "Created database structure: {} outward codes, {} postcodes.",
            database.outward_codes.len(),
            database.inward_codes.len()
        ),
    );

    database.encode(output_path)?;

    log_with_elapsed(start, &format!("Encoded database written to {OUTPUT_PATH}"));

    Ok(())
}

fn build_database(data: ParsedData, version: String) -> Result<Database, Box<dyn Error>> {
    Database::from_records(
        data.records,
        Alphabets::gb(),
        version,
        COPYRIGHT.to_string(),
    )
}

/// Version label stored in the database, from `POSTCODES_DATA_VERSION`.
fn data_version() -> String {
    std::env::var("POSTCODES_DATA_VERSION")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_VERSION.to_string())
}

fn ensure_zip_available(start: Instant) -> Result<PathBuf, Box<dyn Error>> {
    let zip_path = PathBuf::from(ZIP_PATH);

    if zip_path.exists() {
        log_with_elapsed(start, "Using existing Code-Point Open zip file.");
        return Ok(zip_path);
    }

    if let Some(parent) = zip_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    log_with_elapsed(start, "Downloading Code-Point Open data...");

    let status = std::process::Command::new("curl")
        .arg("-L")
        .arg("-o")
        .arg(&zip_path)
        .arg(DOWNLOAD_URL)
        .status()?;

    if !status.success() {
        return Err(format!("Failed to download file from {DOWNLOAD_URL}").into());
    }

    log_with_elapsed(start, "Download complete.");

    Ok(zip_path)
}
