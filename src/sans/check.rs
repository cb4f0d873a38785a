//! Helper for computing FT 1.2 checksums.

/// Compute the checksum of the bytes in `from..to`.
///
/// The checksum is the sum of all bytes, modulo 256. Bytes of the range
/// beyond the end of the buffer are not counted.
pub fn checksum(r: &[u8], from: usize, to: usize) -> u8 {
    let to = to.min(r.len());
    r.get(from..to)
        .unwrap_or_default()
        .iter()
        .fold(0, |acc, b| acc.wrapping_add(*b))
}
