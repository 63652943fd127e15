use std::borrow::Cow;

use rusticata_macros::align32;

use crate::endianness::PcapEndianness;
use crate::error::{OptionOverrun, PcapError};
use crate::record::Timestamp;
use crate::traits::PcapNGPacketBlock;

use super::*;

/// An Enhanced Packet Block (EPB) is the standard container for storing
/// the packets coming from the network.
///
/// The `data` field holds exactly `caplen` bytes (the padding is not included).
/// It implements the `PcapNGPacketBlock` trait, which provides helper functions.
///
/// ## Examples
///
/// ```rust
/// use capture_parser::pcapng::{parse_block, Block};
/// use capture_parser::traits::PcapNGPacketBlock;
/// use capture_parser::ByteOrder;
///
/// # let pcap_data: &[u8] = &[
/// #     6, 0, 0, 0, 36, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
/// #     2, 0, 0, 0, 60, 0, 0, 0, 0xab, 0xcd, 0, 0, 36, 0, 0, 0,
/// # ];
/// let (_, block) = parse_block(pcap_data, ByteOrder::Little).unwrap();
/// if let Block::EnhancedPacket(epb) = block {
///     let packet_data = epb.packet_data();
///     if epb.truncated() {
///         // packet was truncated
///     } else {
///         // we have a full packet
///     }
/// }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnhancedPacketBlock<'a> {
    pub block_len1: u32,
    pub if_id: u32,
    pub ts_high: u32,
    pub ts_low: u32,
    /// Captured packet length
    pub caplen: u32,
    /// Original packet length
    pub origlen: u32,
    /// Packet data (without padding)
    pub data: Cow<'a, [u8]>,
    pub options: Vec<PcapNGOption<'a>>,
    pub options_overrun: Option<OptionOverrun>,
    pub block_len2: u32,
}

impl<'a> EnhancedPacketBlock<'a> {
    /// Decode the packet timestamp
    ///
    /// To decode the timestamp, the raw values if_tsresol and if_tsoffset are required.
    /// These values are stored as options in the [`InterfaceDescriptionBlock`]
    /// matching the interface ID.
    #[inline]
    pub fn decode_ts(&self, ts_offset: i64, resolution: u64) -> Timestamp {
        build_ts(self.ts_high, self.ts_low, ts_offset, resolution)
    }

    /// Decode the packet timestamp as `f64`
    #[inline]
    pub fn decode_ts_f64(&self, ts_offset: i64, resolution: u64) -> f64 {
        self.decode_ts(ts_offset, resolution).as_f64()
    }

    pub fn into_owned(self) -> EnhancedPacketBlock<'static> {
        EnhancedPacketBlock {
            block_len1: self.block_len1,
            if_id: self.if_id,
            ts_high: self.ts_high,
            ts_low: self.ts_low,
            caplen: self.caplen,
            origlen: self.origlen,
            data: Cow::Owned(self.data.into_owned()),
            options: options_into_owned(self.options),
            options_overrun: self.options_overrun,
            block_len2: self.block_len2,
        }
    }
}

impl<'a> PcapNGPacketBlock for EnhancedPacketBlock<'a> {
    fn truncated(&self) -> bool {
        self.origlen != self.caplen
    }
    fn orig_len(&self) -> u32 {
        self.origlen
    }
    fn packet_data(&self) -> &[u8] {
        &self.data
    }
}

impl<'a, En: PcapEndianness> PcapNGBlockParser<'a, En> for EnhancedPacketBlock<'a> {
    const HDR_SZ: usize = 32;
    const MAGIC: u32 = EPB_MAGIC;

    fn inner_parse(raw: RawBlock<'a>) -> Result<EnhancedPacketBlock<'a>, PcapError> {
        // caller function already tested header type(magic) and length
        let malformed = |reason: &'static str| PcapError::MalformedBlock {
            offset: 0,
            block_type: EPB_MAGIC,
            reason,
        };
        let i = raw.body;
        let (i, if_id) = En::parse_u32::<()>(i).map_err(|_| malformed("missing interface id"))?;
        let (i, ts_high) = En::parse_u32::<()>(i).map_err(|_| malformed("missing timestamp"))?;
        let (i, ts_low) = En::parse_u32::<()>(i).map_err(|_| malformed("missing timestamp"))?;
        let (i, caplen) = En::parse_u32::<()>(i).map_err(|_| malformed("missing caplen"))?;
        let (packet_data, origlen) =
            En::parse_u32::<()>(i).map_err(|_| malformed("missing origlen"))?;
        if caplen as usize > packet_data.len() {
            return Err(malformed("captured length larger than block"));
        }
        let data = &packet_data[..caplen as usize];
        // caplen fits in the block, align32 cannot overflow
        let padded_length = align32!(caplen as usize);
        let (options, options_overrun) = block_options(&raw, En::BYTE_ORDER, 20 + padded_length);
        let block = EnhancedPacketBlock {
            block_len1: raw.block_len1,
            if_id,
            ts_high,
            ts_low,
            caplen,
            origlen,
            data: Cow::Borrowed(data),
            options,
            options_overrun,
            block_len2: raw.block_len2,
        };
        Ok(block)
    }
}
