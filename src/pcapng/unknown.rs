use std::borrow::Cow;

use crate::endianness::PcapEndianness;
use crate::error::PcapError;

use super::*;

/// Unknown block (magic not recognized, or not decoded by this crate)
///
/// The body is kept as is, so the block can be inspected or copied.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownBlock<'a> {
    /// Block type, in the byte order of the section
    pub block_type: u32,
    pub block_len1: u32,
    pub body: Cow<'a, [u8]>,
    pub block_len2: u32,
}

impl<'a> UnknownBlock<'a> {
    /// Raw block body
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.body
    }

    pub fn into_owned(self) -> UnknownBlock<'static> {
        UnknownBlock {
            block_type: self.block_type,
            block_len1: self.block_len1,
            body: Cow::Owned(self.body.into_owned()),
            block_len2: self.block_len2,
        }
    }
}

impl<'a, En: PcapEndianness> PcapNGBlockParser<'a, En> for UnknownBlock<'a> {
    const HDR_SZ: usize = 12;
    const MAGIC: u32 = 0;

    fn inner_parse(raw: RawBlock<'a>) -> Result<UnknownBlock<'a>, PcapError> {
        let block = UnknownBlock {
            block_type: raw.block_type,
            block_len1: raw.block_len1,
            body: Cow::Borrowed(raw.body),
            block_len2: raw.block_len2,
        };
        Ok(block)
    }
}
