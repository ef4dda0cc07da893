mod database;
mod logging;
mod postcode;
mod transform;

#[cfg(feature = "create")]
mod create;

#[cfg(feature = "create")]
mod parsing;

pub use database::{
    Alphabet, Alphabets, Coordinate, Database, DatabaseError, DatabaseHandle, DatabaseView,
    InwardCode, NearestPostcode, OutwardCode, PostcodeStatus, decode, encode,
    read_database_file,
};
pub use logging::{log_event, log_with_elapsed, logging_disabled};
pub use postcode::{InwardComponents, PostcodeComponents, format_postcode, parse_postcode};
pub use transform::{PostcodeIndex, PostcodeRecord, index_postcodes};

#[cfg(feature = "create")]
pub use create::create_database;

#[cfg(feature = "create")]
pub use parsing::{CsvError, ParsedData, parse_codepoint_csv};
