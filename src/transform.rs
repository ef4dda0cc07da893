use std::error::Error;

use crate::{Alphabets, InwardCode, OutwardCode, parse_postcode};

/// A postcode and its grid position, as read from the source data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostcodeRecord {
    pub postcode: String,
    pub e: u32,
    pub n: u32,
    pub sector_mean: bool,
}

pub struct PostcodeIndex {
    pub outward_codes: Vec<OutwardCode>,
    pub inward_codes: Vec<InwardCode>,
}

/// Encode postcodes into sorted outward groups with contiguous inward ranges.
///
/// Each group's origin is the south-west corner of the box around its
/// postcodes. Duplicate postcodes keep the first record.
pub fn index_postcodes(
    records: Vec<PostcodeRecord>,
    alphabets: &Alphabets,
) -> Result<PostcodeIndex, Box<dyn Error>> {
    let mut entries = Vec::with_capacity(records.len());

    for record in records {
        let Some(components) = parse_postcode(&record.postcode, false) else {
            return Err(format!("invalid postcode {:?}", record.postcode).into());
        };
        let outward_key = alphabets.outward_key(&components);
        let inward_key = components
            .inward
            .and_then(|inward| alphabets.inward_key(&inward));
        let (Some(outward_key), Some(inward_key)) = (outward_key, inward_key) else {
            return Err(format!("postcode {components} cannot be encoded").into());
        };

        entries.push(EncodedEntry {
            outward_key,
            inward_key,
            e: record.e,
            n: record.n,
            sector_mean: record.sector_mean,
        });
    }

    entries.sort_by(|a, b| {
        a.outward_key
            .cmp(&b.outward_key)
            .then_with(|| a.inward_key.cmp(&b.inward_key))
    });
    entries.dedup_by_key(|entry| (entry.outward_key, entry.inward_key));

    if u32::try_from(entries.len()).is_err() {
        return Err("too many postcodes for u32 index".into());
    }

    let mut outward_codes = Vec::new();
    let mut inward_codes = Vec::with_capacity(entries.len());

    for group in entries.chunk_by(|a, b| a.outward_key == b.outward_key) {
        let origin_e = group.iter().map(|entry| entry.e).min().unwrap_or(0);
        let origin_n = group.iter().map(|entry| entry.n).min().unwrap_or(0);
        let max_e = group.iter().map(|entry| entry.e).max().unwrap_or(0);
        let max_n = group.iter().map(|entry| entry.n).max().unwrap_or(0);

        outward_codes.push(OutwardCode {
            key: group[0].outward_key,
            origin_e,
            origin_n,
            max_offset_e: max_e - origin_e,
            max_offset_n: max_n - origin_n,
            inward_start: inward_codes.len() as u32,
        });

        for entry in group {
            inward_codes.push(InwardCode {
                key: entry.inward_key,
                offset_e: entry.e - origin_e,
                offset_n: entry.n - origin_n,
                sector_mean: entry.sector_mean,
            });
        }
    }

    Ok(PostcodeIndex {
        outward_codes,
        inward_codes,
    })
}

struct EncodedEntry {
    outward_key: u32,
    inward_key: u32,
    e: u32,
    n: u32,
    sector_mean: bool,
}
