mod alphabet;
mod codec;
mod create;
mod decode;
mod encode;
mod error;
mod layout;
mod lookup;
mod nearest;
mod rw;
mod util;
mod view;

use std::{io, ops::Range, path::Path};

use crate::postcode::PostcodeComponents;

pub use alphabet::{Alphabet, Alphabets};
pub use codec::{decode, encode};
pub use error::DatabaseError;

/// One outward code (e.g. `SW1A`) and the box around all its postcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutwardCode {
    pub key: u32,
    pub origin_e: u32,
    pub origin_n: u32,
    pub max_offset_e: u32,
    pub max_offset_n: u32,
    /// Index of this group's first record in the inward array.
    pub inward_start: u32,
}

impl OutwardCode {
    pub fn max_e(&self) -> u64 {
        self.origin_e as u64 + self.max_offset_e as u64
    }

    pub fn max_n(&self) -> u64 {
        self.origin_n as u64 + self.max_offset_n as u64
    }

    /// Offset of `(e, n)` from the origin when it lies inside the box (edges
    /// included).
    pub(crate) fn offset_within(&self, e: u32, n: u32) -> Option<(u32, u32)> {
        let inside = e >= self.origin_e
            && n >= self.origin_n
            && e as u64 <= self.max_e()
            && n as u64 <= self.max_n();
        inside.then(|| (e - self.origin_e, n - self.origin_n))
    }
}

/// One postcode within an outward group, positioned relative to its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InwardCode {
    pub key: u32,
    pub offset_e: u32,
    pub offset_n: u32,
    pub sector_mean: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostcodeStatus {
    NotFound,
    /// Only the sector centroid is known for this postcode.
    SectorMeanOnly,
    Ok,
}

/// Easting/northing in metres on the British National Grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinate {
    pub e: u32,
    pub n: u32,
    pub status: PostcodeStatus,
}

impl Coordinate {
    pub const NOT_FOUND: Coordinate = Coordinate {
        e: 0,
        n: 0,
        status: PostcodeStatus::NotFound,
    };

    pub fn is_found(&self) -> bool {
        self.status != PostcodeStatus::NotFound
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestPostcode {
    pub components: PostcodeComponents,
    pub coordinate: Coordinate,
    /// Straight-line distance from the query point, in metres.
    pub distance: f64,
}

pub struct Database {
    pub version: String,
    pub copyright: String,
    pub alphabets: Alphabets,
    pub outward_codes: Vec<OutwardCode>,
    pub inward_codes: Vec<InwardCode>,
}

/// Zero-copy reader over an uncompressed database file.
pub struct DatabaseView<'a> {
    bytes: &'a [u8],
    alphabets: Alphabets,
    version: &'a str,
    copyright: &'a str,
    outward_count: u32,
    inward_count: u32,
    outward_offset: usize,
    inward_offset: usize,
}

/// Record access shared by the owned and zero-copy representations.
pub(crate) trait Records {
    fn alphabets(&self) -> &Alphabets;

    fn outward_count(&self) -> usize;

    fn inward_count(&self) -> usize;

    fn outward_at(&self, index: usize) -> Option<OutwardCode>;

    fn inward_at(&self, index: usize) -> Option<InwardCode>;

    fn outward_key(&self, index: usize) -> Option<u32> {
        self.outward_at(index).map(|code| code.key)
    }

    fn inward_key(&self, index: usize) -> Option<u32> {
        self.inward_at(index).map(|code| code.key)
    }

    /// Half-open range of inward records owned by the outward group at `index`.
    fn inward_range(&self, index: usize) -> Option<Range<usize>> {
        let start = self.outward_at(index)?.inward_start as usize;
        let end = if index + 1 < self.outward_count() {
            self.outward_at(index + 1)?.inward_start as usize
        } else {
            self.inward_count()
        };
        (start <= end && end <= self.inward_count()).then_some(start..end)
    }
}

impl Records for Database {
    fn alphabets(&self) -> &Alphabets {
        &self.alphabets
    }

    fn outward_count(&self) -> usize {
        self.outward_codes.len()
    }

    fn inward_count(&self) -> usize {
        self.inward_codes.len()
    }

    fn outward_at(&self, index: usize) -> Option<OutwardCode> {
        self.outward_codes.get(index).copied()
    }

    fn inward_at(&self, index: usize) -> Option<InwardCode> {
        self.inward_codes.get(index).copied()
    }
}

impl Database {
    /// Return true when there are no postcodes loaded.
    pub fn is_empty(&self) -> bool {
        self.inward_codes.is_empty()
    }
}

/// Read a database file into memory, ready for [`DatabaseHandle::load`].
pub fn read_database_file(path: &Path) -> Result<Vec<u8>, DatabaseError> {
    std::fs::read(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => DatabaseError::NotFound,
        _ => DatabaseError::Io(err),
    })
}

pub enum DatabaseHandle<'a> {
    Decoded(Database),
    View(DatabaseView<'a>),
}

impl<'a> DatabaseHandle<'a> {
    /// Open a database file held in memory.
    ///
    /// Gzip input is decompressed into an owned [`Database`] (requires the
    /// `compressed_database` feature); anything else is read in place.
    pub fn load(bytes: &'a [u8]) -> Result<DatabaseHandle<'a>, DatabaseError> {
        #[cfg(feature = "compressed_database")]
        if bytes.starts_with(&util::GZIP_MAGIC) {
            use flate2::bufread::GzDecoder;

            let mut decoder = GzDecoder::new(bytes);
            let db = Database::from_reader(&mut decoder)?;
            return Ok(DatabaseHandle::Decoded(db));
        }

        let view = DatabaseView::from_bytes(bytes)?;
        Ok(DatabaseHandle::View(view))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            DatabaseHandle::Decoded(db) => db.is_empty(),
            DatabaseHandle::View(view) => view.is_empty(),
        }
    }

    pub fn version(&self) -> &str {
        match self {
            DatabaseHandle::Decoded(db) => &db.version,
            DatabaseHandle::View(view) => view.version(),
        }
    }

    pub fn copyright(&self) -> &str {
        match self {
            DatabaseHandle::Decoded(db) => &db.copyright,
            DatabaseHandle::View(view) => view.copyright(),
        }
    }

    /// Number of outward codes.
    pub fn outward_count(&self) -> usize {
        match self {
            DatabaseHandle::Decoded(db) => db.outward_count(),
            DatabaseHandle::View(view) => view.outward_count(),
        }
    }

    /// Number of full postcodes.
    pub fn postcode_count(&self) -> usize {
        match self {
            DatabaseHandle::Decoded(db) => db.inward_count(),
            DatabaseHandle::View(view) => view.inward_count(),
        }
    }

    pub fn lookup_coordinate(&self, components: &PostcodeComponents) -> Coordinate {
        match self {
            DatabaseHandle::Decoded(db) => db.lookup_coordinate(components),
            DatabaseHandle::View(view) => view.lookup_coordinate(components),
        }
    }

    pub fn lookup_outward(&self, components: &PostcodeComponents) -> Option<OutwardCode> {
        match self {
            DatabaseHandle::Decoded(db) => db.lookup_outward(components),
            DatabaseHandle::View(view) => view.lookup_outward(components),
        }
    }

    pub fn nearest_postcode(&self, e: u32, n: u32) -> Option<NearestPostcode> {
        match self {
            DatabaseHandle::Decoded(db) => db.nearest_postcode(e, n),
            DatabaseHandle::View(view) => view.nearest_postcode(e, n),
        }
    }
}
