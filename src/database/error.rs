#[derive(Debug)]
pub enum DatabaseError {
    NotFound,
    Io(std::io::Error),
    TooShort,
    InvalidMagic,
    InvalidLayout,
    InvalidAlphabet,
    UnsortedRecords,
    DecompressionFailed,
}

impl std::fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            DatabaseError::NotFound => "postcode database file not found",
            DatabaseError::Io(err) => {
                return write!(f, "postcode database file unreadable: {err}");
            }
            DatabaseError::TooShort => "postcode database file too short",
            DatabaseError::InvalidMagic => "postcode database file has invalid magic",
            DatabaseError::InvalidLayout => "postcode database file layout invalid",
            DatabaseError::InvalidAlphabet => "postcode database alphabet table invalid",
            DatabaseError::UnsortedRecords => "postcode database records are not sorted by key",
            DatabaseError::DecompressionFailed => "postcode database file decompression failed",
        };
        f.write_str(message)
    }
}

impl std::error::Error for DatabaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatabaseError::Io(err) => Some(err),
            _ => None,
        }
    }
}
