use std::borrow::Cow;

use nom::bytes::streaming::take;
use nom::error::ParseError;
use nom::IResult;

use crate::endianness::{PcapBE, PcapEndianness, PcapLE};
use crate::pcap::PcapHeader;
use crate::sniff::LegacyVariant;

/// Extra record header fields of the "modified" pcap format
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ModifiedRecordHeader {
    /// Index of the capture interface, as known by the capturing host
    pub if_index: u32,
    /// Ethernet packet type
    pub protocol: u16,
    /// Broadcast, multicast, etc. indication
    pub pkt_type: u8,
}

/// A record (packet) from a legacy pcap file
///
/// `data` holds exactly `caplen` bytes. Records returned by the streaming reader own their data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LegacyRecord<'a> {
    /// The date and time when this packet was captured (seconds since epoch)
    pub ts_sec: u32,
    /// Fractional part of the timestamp, in micro or nanoseconds depending on the magic number
    pub ts_fraction: u32,
    /// Number of bytes of packet data actually captured and saved in the file
    pub caplen: u32,
    /// Length of the packet as it appeared on the network
    pub origlen: u32,
    /// Present for files using the modified record format
    pub modified: Option<ModifiedRecordHeader>,
    pub data: Cow<'a, [u8]>,
}

impl<'a> LegacyRecord<'a> {
    #[inline]
    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    /// Returns true if the packet was truncated by the capture (usually because of snaplen)
    pub fn is_truncated(&self) -> bool {
        self.caplen < self.origlen
    }

    pub fn into_owned(self) -> LegacyRecord<'static> {
        LegacyRecord {
            ts_sec: self.ts_sec,
            ts_fraction: self.ts_fraction,
            caplen: self.caplen,
            origlen: self.origlen,
            modified: self.modified,
            data: Cow::Owned(self.data.into_owned()),
        }
    }
}

fn parse_record<'a, En: PcapEndianness, E: ParseError<&'a [u8]>>(
    i: &'a [u8],
    modified: bool,
) -> IResult<&'a [u8], LegacyRecord<'a>, E> {
    let (i, ts_sec) = En::parse_u32(i)?;
    let (i, ts_fraction) = En::parse_u32(i)?;
    let (i, caplen) = En::parse_u32(i)?;
    let (i, origlen) = En::parse_u32(i)?;
    let (i, modified) = if modified {
        let (i, if_index) = En::parse_u32(i)?;
        let (i, protocol) = En::parse_u16(i)?;
        let (i, hdr) = take(2usize)(i)?;
        let ext = ModifiedRecordHeader {
            if_index,
            protocol,
            pkt_type: hdr[0],
        };
        (i, Some(ext))
    } else {
        (i, None)
    };
    let (i, data) = take(caplen as usize)(i)?;
    let record = LegacyRecord {
        ts_sec,
        ts_fraction,
        caplen,
        origlen,
        modified,
        data: Cow::Borrowed(data),
    };
    Ok((i, record))
}

/// Read a PCAP record header and data
///
/// Each PCAP record starts with a small header, and is followed by packet data.
/// The packet data format depends on the LinkType.
pub fn parse_pcap_record_le(i: &[u8]) -> IResult<&[u8], LegacyRecord> {
    parse_record::<PcapLE, _>(i, false)
}

/// Read a PCAP record header and data (big-endian)
pub fn parse_pcap_record_be(i: &[u8]) -> IResult<&[u8], LegacyRecord> {
    parse_record::<PcapBE, _>(i, false)
}

/// Read a PCAP record header and data ("modified" pcap format)
pub fn parse_pcap_record_modified_le(i: &[u8]) -> IResult<&[u8], LegacyRecord> {
    parse_record::<PcapLE, _>(i, true)
}

/// Read a PCAP record header and data ("modified" pcap format, big-endian)
pub fn parse_pcap_record_modified_be(i: &[u8]) -> IResult<&[u8], LegacyRecord> {
    parse_record::<PcapBE, _>(i, true)
}

pub(crate) type LegacyParseFn = fn(&[u8]) -> IResult<&[u8], LegacyRecord>;

/// Select the record parser matching a global header
pub(crate) fn record_parser(header: &PcapHeader) -> LegacyParseFn {
    match (header.variant, header.is_bigendian()) {
        (LegacyVariant::Modified, false) => parse_pcap_record_modified_le,
        (LegacyVariant::Modified, true) => parse_pcap_record_modified_be,
        (_, false) => parse_pcap_record_le,
        (_, true) => parse_pcap_record_be,
    }
}

/// Read a PCAP record, using the byte order and layout given by the global header
pub fn parse_pcap_record<'a>(
    i: &'a [u8],
    header: &PcapHeader,
) -> IResult<&'a [u8], LegacyRecord<'a>> {
    record_parser(header)(i)
}
