use std::error::Error;

use crate::{Alphabets, Database, PostcodeIndex, PostcodeRecord, index_postcodes};

impl Database {
    /// Build a database from postcode positions.
    pub fn from_records(
        records: Vec<PostcodeRecord>,
        alphabets: Alphabets,
        version: String,
        copyright: String,
    ) -> Result<Database, Box<dyn Error>> {
        let PostcodeIndex {
            outward_codes,
            inward_codes,
        } = index_postcodes(records, &alphabets)?;

        Ok(Database {
            version,
            copyright,
            alphabets,
            outward_codes,
            inward_codes,
        })
    }
}
