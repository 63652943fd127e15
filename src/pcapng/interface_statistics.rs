use crate::endianness::{ByteOrder, PcapEndianness};
use crate::error::{OptionOverrun, PcapError};
use crate::record::Timestamp;

use super::*;

/// The Interface Statistics Block (ISB) contains the capture statistics for a given interface
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InterfaceStatisticsBlock<'a> {
    pub block_len1: u32,
    pub if_id: u32,
    pub ts_high: u32,
    pub ts_low: u32,
    pub options: Vec<PcapNGOption<'a>>,
    pub options_overrun: Option<OptionOverrun>,
    pub block_len2: u32,
}

impl<'a> InterfaceStatisticsBlock<'a> {
    /// Decode the timestamp at which the statistics were taken
    #[inline]
    pub fn decode_ts(&self, ts_offset: i64, resolution: u64) -> Timestamp {
        build_ts(self.ts_high, self.ts_low, ts_offset, resolution)
    }

    /// Number of packets received from the physical interface (`isb_ifrecv`), if present
    pub fn isb_ifrecv(&self, byte_order: ByteOrder) -> Option<u64> {
        options_get(&self.options, OptionCode::IsbIfRecv).and_then(|opt| opt.as_u64(byte_order))
    }

    /// Number of packets dropped by the interface (`isb_ifdrop`), if present
    pub fn isb_ifdrop(&self, byte_order: ByteOrder) -> Option<u64> {
        options_get(&self.options, OptionCode::IsbIfDrop).and_then(|opt| opt.as_u64(byte_order))
    }

    pub fn into_owned(self) -> InterfaceStatisticsBlock<'static> {
        InterfaceStatisticsBlock {
            block_len1: self.block_len1,
            if_id: self.if_id,
            ts_high: self.ts_high,
            ts_low: self.ts_low,
            options: options_into_owned(self.options),
            options_overrun: self.options_overrun,
            block_len2: self.block_len2,
        }
    }
}

impl<'a, En: PcapEndianness> PcapNGBlockParser<'a, En> for InterfaceStatisticsBlock<'a> {
    const HDR_SZ: usize = 24;
    const MAGIC: u32 = ISB_MAGIC;

    fn inner_parse(raw: RawBlock<'a>) -> Result<InterfaceStatisticsBlock<'a>, PcapError> {
        // caller function already tested header type(magic) and length
        let malformed = |_| PcapError::MalformedBlock {
            offset: 0,
            block_type: ISB_MAGIC,
            reason: "missing statistics header",
        };
        let i = raw.body;
        let (i, if_id) = En::parse_u32::<()>(i).map_err(malformed)?;
        let (i, ts_high) = En::parse_u32::<()>(i).map_err(malformed)?;
        let (_, ts_low) = En::parse_u32::<()>(i).map_err(malformed)?;
        let (options, options_overrun) = block_options(&raw, En::BYTE_ORDER, 12);
        let block = InterfaceStatisticsBlock {
            block_len1: raw.block_len1,
            if_id,
            ts_high,
            ts_low,
            options,
            options_overrun,
            block_len2: raw.block_len2,
        };
        Ok(block)
    }
}
