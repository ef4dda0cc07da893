use crate::postcode::PostcodeComponents;

use super::{
    Coordinate, Database, DatabaseView, InwardCode, OutwardCode, PostcodeStatus, Records,
    util::partition_point_range,
};

/// Binary search for the outward group of `components`.
fn find_outward<R: Records + ?Sized>(
    records: &R,
    components: &PostcodeComponents,
) -> Option<(usize, OutwardCode)> {
    let key = records.alphabets().outward_key(components)?;
    let index = partition_point_range(records.outward_count(), |idx| {
        records.outward_key(idx).is_none_or(|code| code < key)
    });
    let code = records.outward_at(index)?;
    (code.key == key).then_some((index, code))
}

fn find_postcode<R: Records + ?Sized>(
    records: &R,
    components: &PostcodeComponents,
) -> Option<(OutwardCode, InwardCode)> {
    let (outward_index, outward) = find_outward(records, components)?;
    let key = records.alphabets().inward_key(&components.inward?)?;

    let range = records.inward_range(outward_index)?;
    let index = range.start
        + partition_point_range(range.len(), |idx| {
            records
                .inward_key(range.start + idx)
                .is_none_or(|code| code < key)
        });
    if index >= range.end {
        return None;
    }
    let inward = records.inward_at(index)?;
    (inward.key == key).then_some((outward, inward))
}

pub(crate) fn lookup_coordinate<R: Records + ?Sized>(
    records: &R,
    components: &PostcodeComponents,
) -> Coordinate {
    let Some((outward, inward)) = find_postcode(records, components) else {
        return Coordinate::NOT_FOUND;
    };
    let (Some(e), Some(n)) = (
        outward.origin_e.checked_add(inward.offset_e),
        outward.origin_n.checked_add(inward.offset_n),
    ) else {
        return Coordinate::NOT_FOUND;
    };

    let status = if inward.sector_mean {
        PostcodeStatus::SectorMeanOnly
    } else {
        PostcodeStatus::Ok
    };
    Coordinate { e, n, status }
}

pub(crate) fn lookup_outward<R: Records + ?Sized>(
    records: &R,
    components: &PostcodeComponents,
) -> Option<OutwardCode> {
    find_outward(records, components).map(|(_, code)| code)
}

impl Database {
    /// Grid position of a full postcode.
    pub fn lookup_coordinate(&self, components: &PostcodeComponents) -> Coordinate {
        lookup_coordinate(self, components)
    }

    /// Outward group (origin and bounding box) of a full or outward-only postcode.
    pub fn lookup_outward(&self, components: &PostcodeComponents) -> Option<OutwardCode> {
        lookup_outward(self, components)
    }
}

impl DatabaseView<'_> {
    pub fn lookup_coordinate(&self, components: &PostcodeComponents) -> Coordinate {
        lookup_coordinate(self, components)
    }

    pub fn lookup_outward(&self, components: &PostcodeComponents) -> Option<OutwardCode> {
        lookup_outward(self, components)
    }
}

#[cfg(test)]
mod tests {
    use crate::database::test_utils::{FIXTURE_POSTCODES, test_database, test_database_bytes};
    use crate::{Coordinate, DatabaseView, PostcodeStatus, parse_postcode};

    fn lookup(text: &str) -> Coordinate {
        let pc = parse_postcode(text, false).unwrap();
        test_database().lookup_coordinate(&pc)
    }

    #[test]
    fn finds_reference_postcodes() {
        assert_eq!(
            lookup("e 10aa"),
            Coordinate {
                e: 535267,
                n: 181084,
                status: PostcodeStatus::Ok,
            }
        );
        assert_eq!(
            lookup("  ec1v7jJ"),
            Coordinate {
                e: 531760,
                n: 182831,
                status: PostcodeStatus::Ok,
            }
        );
    }

    #[test]
    fn finds_firsts_and_lasts() {
        assert_eq!((lookup("AB101AB").e, lookup("AB101AB").n), (394235, 806529));
        assert_eq!((lookup("AB101AF").e, lookup("AB101AF").n), (394181, 806429));
        assert_eq!((lookup("ZE3 9JZ").e, lookup("ZE3 9JZ").n), (438662, 1112122));
        assert_eq!(lookup("ZE1 0AA").n, 1141280);
    }

    #[test]
    fn reports_sector_means() {
        assert_eq!(
            lookup("BN99 9AA"),
            Coordinate {
                e: 517706,
                n: 104201,
                status: PostcodeStatus::SectorMeanOnly,
            }
        );
        assert_eq!(lookup("M29 8SQ").status, PostcodeStatus::SectorMeanOnly);
        assert_eq!(lookup("RH121BW").status, PostcodeStatus::SectorMeanOnly);
    }

    #[test]
    fn well_formed_but_missing_postcodes() {
        // no such outward group
        assert_eq!(lookup("CR90 9SA"), Coordinate::NOT_FOUND);
        assert_eq!(lookup("FK8 3RG"), Coordinate::NOT_FOUND);
        // outward group exists, inward code does not
        assert_eq!(lookup("DD1 1DE"), Coordinate::NOT_FOUND);
        assert_eq!(lookup("E1 0AB"), Coordinate::NOT_FOUND);
        // unit letter outside the alphabet
        assert_eq!(lookup("E1 0AC"), Coordinate::NOT_FOUND);
    }

    #[test]
    fn outward_only_components_have_no_coordinate() {
        let pc = parse_postcode("E1", true).unwrap();

        assert_eq!(test_database().lookup_coordinate(&pc), Coordinate::NOT_FOUND);
    }

    #[test]
    fn every_fixture_postcode_is_found() {
        let db = test_database();
        let bytes = test_database_bytes();
        let view = DatabaseView::from_bytes(&bytes).unwrap();

        for &(postcode, e, n, sector_mean) in FIXTURE_POSTCODES {
            let pc = parse_postcode(postcode, false).unwrap();
            let status = if sector_mean {
                PostcodeStatus::SectorMeanOnly
            } else {
                PostcodeStatus::Ok
            };
            let expected = Coordinate { e, n, status };

            assert_eq!(db.lookup_coordinate(&pc), expected, "{postcode}");
            assert_eq!(view.lookup_coordinate(&pc), expected, "{postcode}");
        }
    }

    #[test]
    fn outward_lookup_reports_bounding_box() {
        let db = test_database();
        let pc = parse_postcode("EC1V", true).unwrap();

        let code = db.lookup_outward(&pc).unwrap();
        assert_eq!((code.origin_e, code.origin_n), (531760, 181150));
        assert_eq!((code.max_e(), code.max_n()), (535400, 182831));

        let full = parse_postcode("EC1V 7JJ", false).unwrap();
        assert_eq!(db.lookup_outward(&full), Some(code));

        let missing = parse_postcode("CR90", true).unwrap();
        assert_eq!(db.lookup_outward(&missing), None);
    }

    #[test]
    fn single_postcode_groups_have_empty_boxes() {
        let db = test_database();
        let pc = parse_postcode("W1A", true).unwrap();

        let code = db.lookup_outward(&pc).unwrap();
        assert_eq!((code.max_offset_e, code.max_offset_n), (0, 0));
        assert_eq!((code.origin_e, code.origin_n), (531073, 182317));
    }
}
