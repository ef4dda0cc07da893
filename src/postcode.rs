use std::fmt::{self, Write};

/// Longest cleaned postcode, e.g. `AA9A9AA`.
const MAX_POSTCODE_LEN: usize = 7;
const MIN_FULL_LEN: usize = 5;
const MIN_OUTWARD_LEN: usize = 2;
const INWARD_LEN: usize = 3;

/// Sector and unit characters of a full postcode, e.g. `0AA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InwardComponents {
    pub sector: u8,
    pub unit0: u8,
    pub unit1: u8,
}

/// A parsed postcode. Only the parser and the dataset decoder create these,
/// so every value is well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostcodeComponents {
    pub area0: u8,
    pub area1: Option<u8>,
    pub district0: u8,
    pub district1: Option<u8>,
    /// `None` for outward-only postcodes such as `SW1A`.
    pub inward: Option<InwardComponents>,
}

impl PostcodeComponents {
    pub fn is_outward_only(&self) -> bool {
        self.inward.is_none()
    }

    /// The outward part on its own, e.g. `EC1V` for `EC1V 7JJ`.
    pub fn outward(&self) -> PostcodeComponents {
        PostcodeComponents {
            inward: None,
            ..*self
        }
    }
}

impl fmt::Display for PostcodeComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outward = [
            Some(self.area0),
            self.area1,
            Some(self.district0),
            self.district1,
        ];
        for c in outward.into_iter().flatten() {
            f.write_char(c as char)?;
        }

        if let Some(inward) = self.inward {
            f.write_char(' ')?;
            for c in [inward.sector, inward.unit0, inward.unit1] {
                f.write_char(c as char)?;
            }
        }
        Ok(())
    }
}

/// Parse a full (`outward_only == false`) or outward-only postcode.
///
/// Whitespace is ignored and letters are upper-cased. Validation is looser
/// than the Royal Mail grammar (any letter is accepted in the unit
/// positions), so this answers "does this look like a postcode", not "is it
/// issued".
pub fn parse_postcode(text: &str, outward_only: bool) -> Option<PostcodeComponents> {
    let min_len = if outward_only {
        MIN_OUTWARD_LEN
    } else {
        MIN_FULL_LEN
    };
    let max_len = min_len + 2;

    let mut cleaned = [0u8; MAX_POSTCODE_LEN];
    let mut len = 0usize;
    for byte in text.bytes() {
        if byte.is_ascii_whitespace() {
            continue;
        }
        if len == max_len {
            return None;
        }
        cleaned[len] = byte.to_ascii_uppercase();
        len += 1;
    }
    if len < min_len {
        return None;
    }

    let (outward, inward) = if outward_only {
        (&cleaned[..len], None)
    } else {
        let (outward, inward) = cleaned[..len].split_at(len - INWARD_LEN);
        (outward, Some(parse_inward(inward)?))
    };

    let mut chars = outward.iter().copied();
    let area0 = chars.next().filter(u8::is_ascii_uppercase)?;

    let mut next = chars.next()?;
    let area1 = if next.is_ascii_uppercase() {
        let area1 = next;
        // an area letter must still be followed by a district
        next = chars.next()?;
        Some(area1)
    } else {
        None
    };

    if !next.is_ascii_digit() {
        return None;
    }
    let district0 = next;

    let district1 = match chars.next() {
        Some(c) if c.is_ascii_digit() || c.is_ascii_uppercase() => Some(c),
        Some(_) => return None,
        None => None,
    };

    if chars.next().is_some() {
        return None;
    }

    Some(PostcodeComponents {
        area0,
        area1,
        district0,
        district1,
        inward,
    })
}

fn parse_inward(inward: &[u8]) -> Option<InwardComponents> {
    let &[sector, unit0, unit1] = inward else {
        return None;
    };
    if !sector.is_ascii_digit() || !unit0.is_ascii_uppercase() || !unit1.is_ascii_uppercase() {
        return None;
    }
    Some(InwardComponents {
        sector,
        unit0,
        unit1,
    })
}

/// Canonical display form, e.g. `EC1V 7JJ` or `EC1V` for outward-only input.
pub fn format_postcode(components: &PostcodeComponents) -> String {
    components.to_string()
}

#[cfg(test)]
mod tests {
    use super::{InwardComponents, PostcodeComponents, format_postcode, parse_postcode};

    fn formatted(text: &str) -> Option<String> {
        parse_postcode(text, false).map(|pc| format_postcode(&pc))
    }

    #[test]
    fn parses_every_valid_shape() {
        let cases = [
            ("e 10aa", "E1 0AA"),
            (" bn15pq\n", "BN1 5PQ"),
            ("B10\t9NN", "B10 9NN"),
            ("Sy 21 0Hd   ", "SY21 0HD"),
            ("\tw1a 5w w", "W1A 5WW"),
            ("  ec1v7jJ", "EC1V 7JJ"),
        ];

        for (input, expected) in cases {
            assert_eq!(formatted(input).as_deref(), Some(expected), "input {input:?}");
        }
    }

    #[test]
    fn splits_components() {
        let pc = parse_postcode("EC1V 7JJ", false).unwrap();

        assert_eq!(
            pc,
            PostcodeComponents {
                area0: b'E',
                area1: Some(b'C'),
                district0: b'1',
                district1: Some(b'V'),
                inward: Some(InwardComponents {
                    sector: b'7',
                    unit0: b'J',
                    unit1: b'J',
                }),
            }
        );
    }

    #[test]
    fn case_and_whitespace_insensitive() {
        let a = parse_postcode("e 10aa", false).unwrap();
        let b = parse_postcode("E1 0AA", false).unwrap();
        let c = parse_postcode("\te10aa\n", false).unwrap();

        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(format_postcode(&c), "E1 0AA");
    }

    #[test]
    fn rejects_close_but_invalid_formats() {
        let cases = [
            "eee10aa",
            "e1 0aaa",
            "e1010aa",
            " bn1115pq ",
            " bn15pqr ",
            "B100 9NN",
            "Sy 21 0Hdd   ",
            "   w1aa 5w w",
            "ec1v77jJ",
            " bn15p! ",
            " b.15pq ",
            "AAA10AA",
            "E10AAA",
        ];

        for input in cases {
            assert_eq!(parse_postcode(input, false), None, "input {input:?}");
        }
    }

    #[test]
    fn rejects_wildly_invalid_formats() {
        let cases = ["", "     \t    ", "           ", "xxz", "90210", "... ..."];

        for input in cases {
            assert_eq!(parse_postcode(input, false), None, "input {input:?}");
            assert_eq!(parse_postcode(input, true), None, "input {input:?}");
        }
    }

    #[test]
    fn length_bounds() {
        assert!(parse_postcode("E10AA", false).is_some());
        assert!(parse_postcode("E0AA", false).is_none());
        assert!(parse_postcode("EC1V7JJ", false).is_some());
        assert!(parse_postcode("EC1VX7JJ", false).is_none());

        assert!(parse_postcode("E1", true).is_some());
        assert!(parse_postcode("E", true).is_none());
        assert!(parse_postcode("EC1V", true).is_some());
        assert!(parse_postcode("EC1VX", true).is_none());
    }

    #[test]
    fn outward_only_parsing() {
        let pc = parse_postcode(" sw1a ", true).unwrap();

        assert!(pc.is_outward_only());
        assert_eq!(pc.area1, Some(b'W'));
        assert_eq!(pc.district1, Some(b'A'));
        assert_eq!(format_postcode(&pc), "SW1A");

        // area letters with no district
        assert!(parse_postcode("EC", true).is_none());
        // full postcodes are too long for outward-only parsing
        assert!(parse_postcode("E1 0AA", true).is_none());
        assert!(parse_postcode("1E", true).is_none());
    }

    #[test]
    fn outward_of_full_postcode() {
        let full = parse_postcode("SY21 0HD", false).unwrap();
        let outward = parse_postcode("SY21", true).unwrap();

        assert_eq!(full.outward(), outward);
    }

    #[test]
    fn format_then_parse_round_trips() {
        let inputs = [
            "A1 1AA", "A11 1AA", "A1A 1AA", "AA1 1AA", "AA11 1AA", "AA1A 1AA", "ZE3 9JZ",
        ];

        for input in inputs {
            let pc = parse_postcode(input, false).unwrap();
            assert_eq!(parse_postcode(&format_postcode(&pc), false), Some(pc));

            let outward = pc.outward();
            assert_eq!(parse_postcode(&format_postcode(&outward), true), Some(outward));
        }
    }

    #[test]
    fn ignores_non_ascii_input() {
        assert_eq!(parse_postcode("É1 0AA", false), None);
        assert_eq!(parse_postcode("E1 0ÅA", false), None);
    }
}
