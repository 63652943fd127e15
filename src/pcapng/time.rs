use crate::record::Timestamp;

/// Default value of `if_tsresol` (microseconds)
pub const DEFAULT_TSRESOL: u8 = 6;

/// Compute the timestamp resolution, in units per second
///
/// If the most significant bit of `ts_resol` is 0, the remaining bits indicate the resolution as
/// a negative power of 10, otherwise as a negative power of 2.
///
/// Return the resolution, or `None` if the resolution is invalid (for ex. greater than `2^64`)
pub fn build_ts_resolution(ts_resol: u8) -> Option<u64> {
    let exponent = u32::from(ts_resol & 0x7f);
    if ts_resol & 0x80 == 0 {
        // 10^19 is the largest power of 10 to fit in a u64
        10u64.checked_pow(exponent)
    } else {
        1u64.checked_shl(exponent)
    }
}

/// Given the timestamp parameters, return the timestamp seconds and fractional part (in resolution
/// units)
///
/// `ts_offset` is the `if_tsoffset` value of the interface, in seconds. A null `resolution` is
/// treated as 1.
pub fn build_ts(ts_high: u32, ts_low: u32, ts_offset: i64, resolution: u64) -> Timestamp {
    let resolution = resolution.max(1);
    let ts: u64 = (u64::from(ts_high) << 32) | u64::from(ts_low);
    let secs = (ts / resolution).wrapping_add(ts_offset as u64);
    Timestamp {
        secs,
        fraction: ts % resolution,
        units_per_sec: resolution,
    }
}
