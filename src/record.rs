//! Format-independent packet records
//!
//! [`UnifiedRecord`] is the value handed to downstream consumers, whatever the format of the
//! capture it was read from.

use crate::linktype::Linktype;
use crate::pcap::{LegacyRecord, PcapHeader};

/// A packet timestamp: seconds since epoch, and fractional part in `units_per_sec` units
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Timestamp {
    pub secs: u64,
    pub fraction: u64,
    /// Resolution of the fractional part (for ex. `1_000_000` for microseconds)
    pub units_per_sec: u64,
}

impl Timestamp {
    /// Timestamp as a floating-point number of seconds
    ///
    /// Precision is lost for nanosecond or finer resolutions.
    pub fn as_f64(&self) -> f64 {
        if self.units_per_sec == 0 {
            return self.secs as f64;
        }
        self.secs as f64 + (self.fraction as f64) / (self.units_per_sec as f64)
    }

    /// Fractional part converted to nanoseconds
    pub fn subsec_nanos(&self) -> u32 {
        if self.units_per_sec == 0 {
            return 0;
        }
        let nanos = u128::from(self.fraction) * 1_000_000_000 / u128::from(self.units_per_sec);
        nanos.min(999_999_999) as u32
    }
}

/// A packet record, independent of the capture format
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnifiedRecord {
    pub timestamp: Timestamp,
    /// Number of bytes of packet data captured (`data.len()`)
    pub caplen: u32,
    /// Length of the packet as it appeared on the network
    pub origlen: u32,
    /// Index of the capture interface in the current section (0 for legacy files)
    pub interface_index: u32,
    /// Data link type of the interface
    pub linktype: Linktype,
    pub data: Vec<u8>,
}

impl UnifiedRecord {
    /// Build a record from a legacy record and the global header of its file
    ///
    /// The timezone offset of the header is not applied: timestamps are kept as stored.
    pub fn from_legacy(header: &PcapHeader, record: LegacyRecord) -> UnifiedRecord {
        UnifiedRecord {
            timestamp: Timestamp {
                secs: u64::from(record.ts_sec),
                fraction: u64::from(record.ts_fraction),
                units_per_sec: header.ts_units_per_sec(),
            },
            caplen: record.caplen,
            origlen: record.origlen,
            interface_index: 0,
            linktype: header.linktype,
            data: record.data.into_owned(),
        }
    }

    /// Returns true if the packet was truncated by the capture
    pub fn is_truncated(&self) -> bool {
        self.caplen < self.origlen
    }
}
