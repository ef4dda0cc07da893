use std::io::Read;

use super::{error::DatabaseError, rw::read_bytes};

const AREA0_SYMBOLS: &[u8] = b"ABCDEFGHIJKLMNOPRSTUWYZ";
const AREA1_SYMBOLS: &[u8] = b"ABCDEFGHKLMNOPQRSTUVWXY";
const DIGIT_SYMBOLS: &[u8] = b"0123456789";
const DISTRICT1_SYMBOLS: &[u8] = b"0123456789ABCDEFGHJKMNPRSTUVWXY";
const UNIT_SYMBOLS: &[u8] = b"ABDEFGHJLNPQRSTUWXYZ";

/// A sorted set of symbols valid at one postcode position.
///
/// Optional positions also accept "absent", which ranks before every symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    absent: bool,
    symbols: Vec<u8>,
}

impl Alphabet {
    /// Build an alphabet from strictly ascending printable ASCII symbols.
    pub fn new(absent: bool, symbols: &[u8]) -> Result<Self, DatabaseError> {
        let ascending = symbols.windows(2).all(|pair| pair[0] < pair[1]);
        let printable = symbols.iter().all(u8::is_ascii_graphic);
        if !ascending || !printable || symbols.len() > u8::MAX as usize {
            return Err(DatabaseError::InvalidAlphabet);
        }
        if symbols.is_empty() && !absent {
            return Err(DatabaseError::InvalidAlphabet);
        }

        Ok(Self {
            absent,
            symbols: symbols.to_vec(),
        })
    }

    /// Number of distinct values, counting "absent" when allowed.
    pub fn len(&self) -> usize {
        self.symbols.len() + self.absent as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn allows_absent(&self) -> bool {
        self.absent
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// Zero-based rank of `symbol`, or `None` when it is not in the alphabet.
    pub fn rank(&self, symbol: Option<u8>) -> Option<usize> {
        let offset = self.absent as usize;
        match symbol {
            None => self.absent.then_some(0),
            Some(c) => self.symbols.binary_search(&c).ok().map(|index| index + offset),
        }
    }

    /// Inverse of [`Alphabet::rank`].
    pub fn symbol(&self, rank: usize) -> Option<Option<u8>> {
        if self.absent {
            match rank {
                0 => Some(None),
                _ => self.symbols.get(rank - 1).copied().map(Some),
            }
        } else {
            self.symbols.get(rank).copied().map(Some)
        }
    }

    pub(crate) fn encoded_len(&self) -> usize {
        2 + self.symbols.len()
    }

    pub(crate) fn write_bytes(&self, out: &mut Vec<u8>) {
        out.push(self.absent as u8);
        out.push(self.symbols.len() as u8);
        out.extend_from_slice(&self.symbols);
    }

    pub(crate) fn from_reader<R: Read>(reader: &mut R) -> Result<Self, DatabaseError> {
        let head = read_bytes(reader, 2)?;
        let absent = match head[0] {
            0 => false,
            1 => true,
            _ => return Err(DatabaseError::InvalidAlphabet),
        };
        let symbols = read_bytes(reader, head[1] as usize)?;
        Alphabet::new(absent, &symbols)
    }
}

/// The per-position alphabets a dataset is keyed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabets {
    pub area0: Alphabet,
    pub area1: Alphabet,
    pub district0: Alphabet,
    pub district1: Alphabet,
    pub sector: Alphabet,
    pub unit0: Alphabet,
    pub unit1: Alphabet,
}

impl Alphabets {
    /// Symbols seen in GB postcodes at each position.
    pub fn gb() -> Self {
        let alphabet = |absent, symbols: &'static [u8]| Alphabet {
            absent,
            symbols: symbols.to_vec(),
        };

        Self {
            area0: alphabet(false, AREA0_SYMBOLS),
            area1: alphabet(true, AREA1_SYMBOLS),
            district0: alphabet(false, DIGIT_SYMBOLS),
            district1: alphabet(true, DISTRICT1_SYMBOLS),
            sector: alphabet(false, DIGIT_SYMBOLS),
            unit0: alphabet(false, UNIT_SYMBOLS),
            unit1: alphabet(false, UNIT_SYMBOLS),
        }
    }

    fn in_file_order(&self) -> [&Alphabet; 7] {
        [
            &self.area0,
            &self.area1,
            &self.district0,
            &self.district1,
            &self.sector,
            &self.unit0,
            &self.unit1,
        ]
    }

    /// Size of the alphabets section in the database file.
    pub(crate) fn encoded_len(&self) -> usize {
        self.in_file_order().iter().map(|a| a.encoded_len()).sum()
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        for alphabet in self.in_file_order() {
            alphabet.write_bytes(&mut out);
        }
        out
    }

    pub(crate) fn from_reader<R: Read>(reader: &mut R) -> Result<Self, DatabaseError> {
        Ok(Self {
            area0: Alphabet::from_reader(reader)?,
            area1: Alphabet::from_reader(reader)?,
            district0: Alphabet::from_reader(reader)?,
            district1: Alphabet::from_reader(reader)?,
            sector: Alphabet::from_reader(reader)?,
            unit0: Alphabet::from_reader(reader)?,
            unit1: Alphabet::from_reader(reader)?,
        })
    }
}

impl Default for Alphabets {
    fn default() -> Self {
        Self::gb()
    }
}
