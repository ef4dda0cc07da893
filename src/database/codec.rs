//! Mixed-radix packing of postcode characters into integer keys.
//!
//! Positions are listed least significant first; each position's radix is
//! the size of its alphabet. Outward keys are packed as
//! `district1, district0, area1, area0` and inward keys as
//! `unit1, unit0, sector`, so sorting by key sorts by area, then district.

use crate::postcode::{InwardComponents, PostcodeComponents};

use super::alphabet::{Alphabet, Alphabets};

/// Encode `(symbol, alphabet)` pairs, least significant first.
///
/// Returns `None` when a symbol is missing from its alphabet or the key does
/// not fit in a `u32`.
pub fn encode(digits: &[(Option<u8>, &Alphabet)]) -> Option<u32> {
    let mut key = 0u64;
    let mut place = 1u64;
    for (symbol, alphabet) in digits {
        let rank = alphabet.rank(*symbol)? as u64;
        key = key.checked_add(rank.checked_mul(place)?)?;
        place = place.checked_mul(alphabet.len() as u64)?;
    }
    u32::try_from(key).ok()
}

/// Decode a key produced by [`encode`] with the same alphabets, least
/// significant first. Keys beyond the alphabets' capacity return `None`.
pub fn decode<const N: usize>(key: u32, alphabets: [&Alphabet; N]) -> Option<[Option<u8>; N]> {
    let mut places = [1u64; N];
    for index in 1..N {
        places[index] = places[index - 1].checked_mul(alphabets[index - 1].len() as u64)?;
    }

    let mut symbols = [None; N];
    let mut rest = key as u64;
    for index in (0..N).rev() {
        let place = places[index];
        if place == 0 {
            return None;
        }
        symbols[index] = alphabets[index].symbol((rest / place) as usize)?;
        rest %= place;
    }
    Some(symbols)
}

/// Number of distinct keys the alphabets can produce.
pub(crate) fn capacity(alphabets: &[&Alphabet]) -> u64 {
    alphabets
        .iter()
        .try_fold(1u64, |acc, alphabet| acc.checked_mul(alphabet.len() as u64))
        .unwrap_or(u64::MAX)
}

impl Alphabets {
    fn outward_order(&self) -> [&Alphabet; 4] {
        [&self.district1, &self.district0, &self.area1, &self.area0]
    }

    fn inward_order(&self) -> [&Alphabet; 3] {
        [&self.unit1, &self.unit0, &self.sector]
    }

    pub fn outward_key(&self, components: &PostcodeComponents) -> Option<u32> {
        encode(&[
            (components.district1, &self.district1),
            (Some(components.district0), &self.district0),
            (components.area1, &self.area1),
            (Some(components.area0), &self.area0),
        ])
    }

    pub fn inward_key(&self, inward: &InwardComponents) -> Option<u32> {
        encode(&[
            (Some(inward.unit1), &self.unit1),
            (Some(inward.unit0), &self.unit0),
            (Some(inward.sector), &self.sector),
        ])
    }

    /// Rebuild outward-only components from an outward key.
    pub fn decode_outward(&self, key: u32) -> Option<PostcodeComponents> {
        let [district1, district0, area1, area0] = decode(key, self.outward_order())?;
        Some(PostcodeComponents {
            area0: area0?,
            area1,
            district0: district0?,
            district1,
            inward: None,
        })
    }

    pub fn decode_inward(&self, key: u32) -> Option<InwardComponents> {
        let [unit1, unit0, sector] = decode(key, self.inward_order())?;
        Some(InwardComponents {
            sector: sector?,
            unit0: unit0?,
            unit1: unit1?,
        })
    }

    pub(crate) fn outward_capacity(&self) -> u64 {
        capacity(&self.outward_order())
    }

    pub(crate) fn inward_capacity(&self) -> u64 {
        capacity(&self.inward_order())
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};
    use crate::{Alphabet, Alphabets, InwardComponents, parse_postcode};

    #[test]
    fn outward_key_places_area_first() {
        let gb = Alphabets::gb();
        let e1 = parse_postcode("E1", true).unwrap();

        // district0 '1' has rank 1 (radix 32), area0 'E' has rank 4 (place 32 * 10 * 24)
        assert_eq!(gb.outward_key(&e1), Some(32 + 4 * 7680));
    }

    #[test]
    fn inward_key_extremes() {
        let gb = Alphabets::gb();
        let first = parse_postcode("A1 0AA", false).unwrap().inward.unwrap();
        let last = parse_postcode("A1 9ZZ", false).unwrap().inward.unwrap();

        assert_eq!(gb.inward_key(&first), Some(0));
        assert_eq!(gb.inward_key(&last), Some(3999));
        assert_eq!(gb.inward_capacity(), 4000);
    }

    #[test]
    fn keys_sort_like_postcodes() {
        let gb = Alphabets::gb();
        let key = |text| gb.outward_key(&parse_postcode(text, true).unwrap()).unwrap();

        assert!(key("E1") < key("E1W"));
        assert!(key("E1W") < key("E2"));
        assert!(key("E9") < key("EC1A"));
        assert!(key("EC1A") < key("EC1V"));
        assert!(key("AB99") < key("B1"));
    }

    #[test]
    fn encode_misses_unknown_symbols() {
        let gb = Alphabets::gb();

        // C never appears in a unit position
        let inward = parse_postcode("E1 0AC", false).unwrap().inward.unwrap();
        assert_eq!(gb.inward_key(&inward), None);

        // Q never starts an area
        let outward = parse_postcode("Q1", true).unwrap();
        assert_eq!(gb.outward_key(&outward), None);
    }

    #[test]
    fn encode_overflow_is_a_miss() {
        let wide = Alphabet::new(false, &(b'!'..=b'~').collect::<Vec<_>>()).unwrap();
        let digits: Vec<_> = (0..6).map(|_| (Some(b'~'), &wide)).collect();

        assert_eq!(encode(&digits), None);
    }

    fn ranks(alphabet: &Alphabet) -> Vec<Option<u8>> {
        let absent = alphabet.allows_absent().then_some(None);
        absent
            .into_iter()
            .chain(alphabet.symbols().iter().copied().map(Some))
            .collect()
    }

    #[test]
    fn decode_inverts_encode_across_alphabets() {
        let gb = Alphabets::gb();
        let order = [&gb.district1, &gb.district0, &gb.area1, &gb.area0];
        let mut count = 0u64;

        for area0 in ranks(&gb.area0) {
            for area1 in ranks(&gb.area1) {
                for district0 in ranks(&gb.district0) {
                    for district1 in ranks(&gb.district1) {
                        let tuple = [district1, district0, area1, area0];
                        let digits: Vec<_> = tuple.iter().copied().zip(order).collect();
                        let key = encode(&digits).unwrap();
                        assert_eq!(decode(key, order), Some(tuple));
                        count += 1;
                    }
                }
            }
        }

        assert_eq!(count, gb.outward_capacity());
    }

    #[test]
    fn inward_keys_cover_every_combination_once() {
        let gb = Alphabets::gb();
        let mut seen = vec![false; gb.inward_capacity() as usize];

        for &sector in gb.sector.symbols() {
            for &unit0 in gb.unit0.symbols() {
                for &unit1 in gb.unit1.symbols() {
                    let inward = InwardComponents {
                        sector,
                        unit0,
                        unit1,
                    };
                    let key = gb.inward_key(&inward).unwrap();
                    assert!(!seen[key as usize], "duplicate key {key}");
                    seen[key as usize] = true;
                    assert_eq!(gb.decode_inward(key), Some(inward));
                }
            }
        }

        assert!(seen.iter().all(|&hit| hit));
    }

    #[test]
    fn decode_rejects_out_of_range_keys() {
        let gb = Alphabets::gb();

        assert_eq!(gb.decode_inward(3999).map(|i| i.unit1), Some(b'Z'));
        assert_eq!(gb.decode_inward(4000), None);
        assert_eq!(gb.decode_outward(gb.outward_capacity() as u32), None);
    }

    #[test]
    fn decodes_components() {
        let gb = Alphabets::gb();
        let pc = parse_postcode("SW1A 1AA", false).unwrap();

        let outward = gb.decode_outward(gb.outward_key(&pc).unwrap()).unwrap();
        let inward = gb.decode_inward(gb.inward_key(&pc.inward.unwrap()).unwrap());

        assert_eq!(outward, pc.outward());
        assert_eq!(inward, pc.inward);
    }
}
