//! Capture format detection
//!
//! [`sniff`] looks at the first bytes of an input and returns the capture format, with the byte
//! order when it can be determined. The legacy format is recognized by one of three magic
//! numbers, in either byte order. The pcapng format starts with a Section Header Block, whose
//! block type `0x0A0D0D0A` reads the same in both byte orders; the byte order of the section is
//! given by the byte-order magic stored 8 bytes later.
//!
//! When the capture magic is not recognized, a [`SignatureSniffer`] can be consulted to name
//! what the input looks like instead (for ex. a compressed file), for diagnostics only.

use crate::endianness::ByteOrder;
use crate::pcapng::{BOM_MAGIC, SHB_MAGIC};

/// Legacy pcap magic, microsecond timestamps
pub const PCAP_MAGIC_MICRO: u32 = 0xa1b2_c3d4;
/// Legacy pcap magic, nanosecond timestamps
pub const PCAP_MAGIC_NANO: u32 = 0xa1b2_3c4d;
/// Legacy pcap magic, "modified" record format (Kuznetsov patches)
pub const PCAP_MAGIC_MODIFIED: u32 = 0xa1b2_cd34;

/// Variants of the legacy pcap format, as given by the magic number
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LegacyVariant {
    Microsecond,
    Nanosecond,
    Modified,
}

impl LegacyVariant {
    pub fn from_magic(magic: u32) -> Option<LegacyVariant> {
        match magic {
            PCAP_MAGIC_MICRO => Some(LegacyVariant::Microsecond),
            PCAP_MAGIC_NANO => Some(LegacyVariant::Nanosecond),
            PCAP_MAGIC_MODIFIED => Some(LegacyVariant::Modified),
            _ => None,
        }
    }

    pub const fn magic(self) -> u32 {
        match self {
            LegacyVariant::Microsecond => PCAP_MAGIC_MICRO,
            LegacyVariant::Nanosecond => PCAP_MAGIC_NANO,
            LegacyVariant::Modified => PCAP_MAGIC_MODIFIED,
        }
    }

    /// Unit of the record timestamp fractional part, in units per second
    pub const fn units_per_sec(self) -> u64 {
        match self {
            LegacyVariant::Nanosecond => 1_000_000_000,
            LegacyVariant::Microsecond | LegacyVariant::Modified => 1_000_000,
        }
    }

    /// Size of the per-record header, in bytes
    pub const fn record_header_len(self) -> usize {
        match self {
            LegacyVariant::Modified => 24,
            LegacyVariant::Microsecond | LegacyVariant::Nanosecond => 16,
        }
    }
}

/// Format of a capture input
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CaptureFormat {
    /// Legacy pcap, with the byte order and variant given by the magic number
    Legacy {
        byte_order: ByteOrder,
        variant: LegacyVariant,
    },
    /// pcapng. The byte order is `None` if not enough bytes were given (at least 12 are needed),
    /// or if the byte-order magic of the first section is invalid.
    BlockBased { byte_order: Option<ByteOrder> },
    Unknown,
}

impl CaptureFormat {
    pub fn byte_order(&self) -> Option<ByteOrder> {
        match *self {
            CaptureFormat::Legacy { byte_order, .. } => Some(byte_order),
            CaptureFormat::BlockBased { byte_order } => byte_order,
            CaptureFormat::Unknown => None,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, CaptureFormat::Legacy { .. })
    }

    pub fn is_block_based(&self) -> bool {
        matches!(self, CaptureFormat::BlockBased { .. })
    }
}

/// Detect the capture format from the first bytes of an input
///
/// At least 4 bytes are required to recognize a format, and 12 to know the byte order of a
/// pcapng section. This function never fails: it returns `CaptureFormat::Unknown` instead.
pub fn sniff(i: &[u8]) -> CaptureFormat {
    let magic = match i.get(..4) {
        Some(&[a, b, c, d]) => [a, b, c, d],
        _ => return CaptureFormat::Unknown,
    };
    if u32::from_le_bytes(magic) == SHB_MAGIC {
        let byte_order = match i.get(8..12) {
            Some(&[a, b, c, d]) => section_byte_order([a, b, c, d]),
            _ => None,
        };
        return CaptureFormat::BlockBased { byte_order };
    }
    if let Some(variant) = LegacyVariant::from_magic(u32::from_le_bytes(magic)) {
        CaptureFormat::Legacy {
            byte_order: ByteOrder::Little,
            variant,
        }
    } else if let Some(variant) = LegacyVariant::from_magic(u32::from_be_bytes(magic)) {
        CaptureFormat::Legacy {
            byte_order: ByteOrder::Big,
            variant,
        }
    } else {
        CaptureFormat::Unknown
    }
}

/// Byte order of a section, given the raw bytes of its byte-order magic
pub fn section_byte_order(bom: [u8; 4]) -> Option<ByteOrder> {
    if u32::from_le_bytes(bom) == BOM_MAGIC {
        Some(ByteOrder::Little)
    } else if u32::from_be_bytes(bom) == BOM_MAGIC {
        Some(ByteOrder::Big)
    } else {
        None
    }
}

/// A file signature: a byte pattern expected at one of several offsets
#[derive(Clone, Copy, Debug)]
pub struct FileSignature {
    pub name: &'static str,
    pub pattern: &'static [u8],
    pub offsets: &'static [usize],
}

impl FileSignature {
    pub fn matches(&self, i: &[u8]) -> bool {
        self.offsets.iter().any(|&offset| {
            i.get(offset..offset + self.pattern.len())
                .map_or(false, |b| b == self.pattern)
        })
    }
}

/// Signatures of capture files, and of the containers they are commonly found in
pub static CAPTURE_SIGNATURES: &[FileSignature] = &[
    FileSignature {
        name: "pcap",
        pattern: b"\xd4\xc3\xb2\xa1",
        offsets: &[0],
    },
    FileSignature {
        name: "pcap",
        pattern: b"\xa1\xb2\xc3\xd4",
        offsets: &[0],
    },
    FileSignature {
        name: "pcapng",
        pattern: b"\x0a\x0d\x0d\x0a",
        offsets: &[0],
    },
    FileSignature {
        name: "gzip",
        pattern: b"\x1f\x8b",
        offsets: &[0],
    },
    FileSignature {
        name: "bzip2",
        pattern: b"BZh",
        offsets: &[0],
    },
    FileSignature {
        name: "xz",
        pattern: b"\xfd7zXZ\x00",
        offsets: &[0],
    },
    FileSignature {
        name: "zstd",
        pattern: b"\x28\xb5\x2f\xfd",
        offsets: &[0],
    },
    FileSignature {
        name: "lz4",
        pattern: b"\x04\x22\x4d\x18",
        offsets: &[0],
    },
    FileSignature {
        name: "tar",
        pattern: b"ustar",
        offsets: &[257],
    },
];

/// Generic file-type detection, consulted when the capture magic is not recognized
pub trait SignatureSniffer {
    /// Return the name of the detected file type, if any
    fn sniff(&self, i: &[u8]) -> Option<&'static str>;
}

/// Ordered signature table: the first matching entry wins
#[derive(Clone, Copy, Debug)]
pub struct SignatureTable(pub &'static [FileSignature]);

impl Default for SignatureTable {
    fn default() -> Self {
        SignatureTable(CAPTURE_SIGNATURES)
    }
}

impl SignatureSniffer for SignatureTable {
    fn sniff(&self, i: &[u8]) -> Option<&'static str> {
        self.0.iter().find(|sig| sig.matches(i)).map(|sig| sig.name)
    }
}
