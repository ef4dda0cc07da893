pub(crate) const DATABASE_MAGIC: [u8; 4] = *b"GBPC";
pub(crate) const DATABASE_HEADER_SIZE: usize = 28;
pub(crate) const OUTWARD_RECORD_SIZE: usize = 24;
pub(crate) const INWARD_RECORD_SIZE: usize = 13;
pub(crate) const SECTOR_MEAN_FLAG: u8 = 1;

#[cfg(feature = "compressed_database")]
pub(crate) const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Index of the first element in `0..len` for which `pred` is false.
pub(crate) fn partition_point_range<F>(len: usize, mut pred: F) -> usize
where
    F: FnMut(usize) -> bool,
{
    let mut left = 0usize;
    let mut right = len;
    while left < right {
        let mid = left + (right - left) / 2;
        if pred(mid) {
            left = mid + 1;
        } else {
            right = mid;
        }
    }
    left
}

/// Squared Euclidean distance between two grid offsets, exact for any `u32` input.
pub(crate) fn squared_distance(a: (u32, u32), b: (u32, u32)) -> u128 {
    let de = a.0.abs_diff(b.0) as u128;
    let dn = a.1.abs_diff(b.1) as u128;
    de * de + dn * dn
}
