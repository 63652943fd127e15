use std::borrow::Cow;

use crate::endianness::PcapEndianness;
use crate::error::PcapError;
use crate::traits::PcapNGPacketBlock;

use super::*;

/// The Simple Packet Block (SPB) is a lightweight container for storing
/// the packets coming from the network.
///
/// The block does not store the captured length: `data` holds the packet data without padding,
/// bounded by the original length. It implements the `PcapNGPacketBlock` trait, which provides
/// helper functions.
///
/// The packet belongs to the first interface of the section, and its length may also have been
/// limited by the snaplen of this interface.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SimplePacketBlock<'a> {
    pub block_len1: u32,
    /// Original packet length
    pub origlen: u32,
    pub data: Cow<'a, [u8]>,
    pub block_len2: u32,
}

impl<'a> SimplePacketBlock<'a> {
    pub fn into_owned(self) -> SimplePacketBlock<'static> {
        SimplePacketBlock {
            block_len1: self.block_len1,
            origlen: self.origlen,
            data: Cow::Owned(self.data.into_owned()),
            block_len2: self.block_len2,
        }
    }
}

impl<'a> PcapNGPacketBlock for SimplePacketBlock<'a> {
    fn truncated(&self) -> bool {
        (self.origlen as usize) > self.data.len()
    }
    fn orig_len(&self) -> u32 {
        self.origlen
    }
    fn packet_data(&self) -> &[u8] {
        &self.data
    }
}

impl<'a, En: PcapEndianness> PcapNGBlockParser<'a, En> for SimplePacketBlock<'a> {
    const HDR_SZ: usize = 16;
    const MAGIC: u32 = SPB_MAGIC;

    fn inner_parse(raw: RawBlock<'a>) -> Result<SimplePacketBlock<'a>, PcapError> {
        // caller function already tested header type(magic) and length
        let (data, origlen) =
            En::parse_u32::<()>(raw.body).map_err(|_| PcapError::MalformedBlock {
                offset: 0,
                block_type: SPB_MAGIC,
                reason: "missing origlen",
            })?;
        let len = data.len().min(origlen as usize);
        let block = SimplePacketBlock {
            block_len1: raw.block_len1,
            origlen,
            data: Cow::Borrowed(&data[..len]),
            block_len2: raw.block_len2,
        };
        Ok(block)
    }
}
