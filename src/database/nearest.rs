use super::{
    Coordinate, Database, DatabaseView, NearestPostcode, PostcodeStatus, Records,
    util::squared_distance,
};

struct Candidate {
    squared_distance: u128,
    outward_index: usize,
    inward_index: usize,
}

/// Nearest postcode to `(e, n)` among the outward groups whose bounding box
/// contains the point.
///
/// Boxes only prune the scan: a point inside several overlapping boxes is
/// compared against every postcode in all of them. A point outside every box
/// has no nearest postcode, even when one exists just beyond a box edge.
/// Ties go to the first postcode in key order.
pub(crate) fn nearest_postcode<R: Records + ?Sized>(
    records: &R,
    e: u32,
    n: u32,
) -> Option<NearestPostcode> {
    let mut best: Option<Candidate> = None;

    for outward_index in 0..records.outward_count() {
        let Some(outward) = records.outward_at(outward_index) else {
            continue;
        };
        let Some(query_offset) = outward.offset_within(e, n) else {
            continue;
        };
        let Some(range) = records.inward_range(outward_index) else {
            continue;
        };

        for inward_index in range {
            let Some(inward) = records.inward_at(inward_index) else {
                continue;
            };
            let distance = squared_distance(query_offset, (inward.offset_e, inward.offset_n));
            if best
                .as_ref()
                .is_none_or(|best| distance < best.squared_distance)
            {
                best = Some(Candidate {
                    squared_distance: distance,
                    outward_index,
                    inward_index,
                });
            }
        }
    }

    let best = best?;
    let outward = records.outward_at(best.outward_index)?;
    let inward = records.inward_at(best.inward_index)?;

    let alphabets = records.alphabets();
    let mut components = alphabets.decode_outward(outward.key)?;
    components.inward = Some(alphabets.decode_inward(inward.key)?);

    let status = if inward.sector_mean {
        PostcodeStatus::SectorMeanOnly
    } else {
        PostcodeStatus::Ok
    };
    let coordinate = Coordinate {
        e: outward.origin_e.checked_add(inward.offset_e)?,
        n: outward.origin_n.checked_add(inward.offset_n)?,
        status,
    };

    Some(NearestPostcode {
        components,
        coordinate,
        distance: (best.squared_distance as f64).sqrt(),
    })
}

impl Database {
    /// Closest postcode to a grid position, if the position falls inside
    /// any outward group's bounding box.
    pub fn nearest_postcode(&self, e: u32, n: u32) -> Option<NearestPostcode> {
        nearest_postcode(self, e, n)
    }
}

impl DatabaseView<'_> {
    pub fn nearest_postcode(&self, e: u32, n: u32) -> Option<NearestPostcode> {
        nearest_postcode(self, e, n)
    }
}
