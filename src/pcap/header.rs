use nom::error::{ErrorKind, ParseError};
use nom::{Err, IResult, Needed};

use crate::endianness::{ByteOrder, PcapBE, PcapEndianness, PcapLE};
use crate::linktype::Linktype;
use crate::sniff::{sniff, CaptureFormat, LegacyVariant};

/// Size of the legacy global header, in bytes
pub const PCAP_HEADER_LEN: usize = 24;

/// PCAP global header
///
/// Fields are stored decoded: two headers holding the same values, written in different byte
/// orders, only differ by `byte_order`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PcapHeader {
    /// Magic number, as read in the file byte order. One of `0xa1b2c3d4` (microseconds),
    /// `0xa1b23c4d` (nanoseconds) or `0xa1b2cd34` (modified record format).
    pub magic_number: u32,
    /// Version major number (currently 2)
    pub version_major: u16,
    /// Version minor number (currently 4)
    pub version_minor: u16,
    /// The correction time in seconds between GMT (UTC) and the local timezone of the following
    /// packet header timestamps
    pub timezone_offset: i32,
    /// In theory, the accuracy of time stamps in the capture; in practice, all tools set it to 0
    pub timestamp_accuracy: u32,
    /// max len of captured packets, in octets
    pub snaplen: u32,
    /// Data link type
    pub linktype: Linktype,
    /// Byte order of the file, derived from the magic number
    pub byte_order: ByteOrder,
    /// Timestamp unit and record layout, derived from the magic number
    pub variant: LegacyVariant,
}

impl PcapHeader {
    pub const fn size(&self) -> usize {
        PCAP_HEADER_LEN
    }

    pub fn is_bigendian(&self) -> bool {
        self.byte_order.is_big_endian()
    }

    pub fn is_modified_format(&self) -> bool {
        self.variant == LegacyVariant::Modified
    }

    pub fn is_nanosecond_precision(&self) -> bool {
        self.variant == LegacyVariant::Nanosecond
    }

    /// Unit of the record timestamps fractional part, in units per second
    pub fn ts_units_per_sec(&self) -> u64 {
        self.variant.units_per_sec()
    }
}

fn parse_header_fields<'a, En: PcapEndianness, E: ParseError<&'a [u8]>>(
    i: &'a [u8],
    variant: LegacyVariant,
) -> IResult<&'a [u8], PcapHeader, E> {
    let (i, version_major) = En::parse_u16(i)?;
    let (i, version_minor) = En::parse_u16(i)?;
    let (i, timezone_offset) = En::parse_i32(i)?;
    let (i, timestamp_accuracy) = En::parse_u32(i)?;
    let (i, snaplen) = En::parse_u32(i)?;
    let (i, linktype) = En::parse_u32(i)?;
    let header = PcapHeader {
        magic_number: variant.magic(),
        version_major,
        version_minor,
        timezone_offset,
        timestamp_accuracy,
        snaplen,
        linktype: Linktype(linktype),
        byte_order: En::BYTE_ORDER,
        variant,
    };
    Ok((i, header))
}

/// Read the PCAP global header
///
/// The magic number is checked first, and gives the byte order used for all following fields.
pub fn parse_pcap_header(i: &[u8]) -> IResult<&[u8], PcapHeader> {
    if i.len() < 4 {
        return Err(Err::Incomplete(Needed::new(4 - i.len())));
    }
    match sniff(i) {
        CaptureFormat::Legacy {
            byte_order: ByteOrder::Little,
            variant,
        } => parse_header_fields::<PcapLE, _>(&i[4..], variant),
        CaptureFormat::Legacy {
            byte_order: ByteOrder::Big,
            variant,
        } => parse_header_fields::<PcapBE, _>(&i[4..], variant),
        _ => Err(Err::Error(nom::error::Error::from_error_kind(
            i,
            ErrorKind::Tag,
        ))),
    }
}
