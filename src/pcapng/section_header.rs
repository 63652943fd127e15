use nom::number::streaming::le_u32;

use crate::endianness::{ByteOrder, PcapEndianness};
use crate::error::{OptionOverrun, PcapError};
use crate::sniff::section_byte_order;

use super::*;

/// The Section Header Block (SHB) identifies the
/// beginning of a section of the capture capture file.
///
/// The
/// Section Header Block does not contain data but it rather identifies a
/// list of blocks (interfaces, packets) that are logically correlated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SectionHeaderBlock<'a> {
    pub block_len1: u32,
    /// Byte-order magic, as read in little-endian
    pub bom: u32,
    pub major_version: u16,
    pub minor_version: u16,
    /// Length of the section (excluding this block), or -1 if unspecified
    pub section_len: i64,
    pub options: Vec<PcapNGOption<'a>>,
    pub options_overrun: Option<OptionOverrun>,
    pub block_len2: u32,
}

impl<'a> SectionHeaderBlock<'a> {
    /// Byte order of the section started by this block
    pub fn byte_order(&self) -> ByteOrder {
        if self.bom == BOM_MAGIC {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }

    pub fn big_endian(&self) -> bool {
        self.bom != BOM_MAGIC
    }

    /// Return the `shb_userappl` option value, if present and valid
    pub fn shb_userappl(&self) -> Option<&str> {
        options_get(&self.options, OptionCode::ShbUserAppl).and_then(|opt| opt.as_str())
    }

    pub fn into_owned(self) -> SectionHeaderBlock<'static> {
        SectionHeaderBlock {
            block_len1: self.block_len1,
            bom: self.bom,
            major_version: self.major_version,
            minor_version: self.minor_version,
            section_len: self.section_len,
            options: options_into_owned(self.options),
            options_overrun: self.options_overrun,
            block_len2: self.block_len2,
        }
    }
}

impl<'a, En: PcapEndianness> PcapNGBlockParser<'a, En> for SectionHeaderBlock<'a> {
    const HDR_SZ: usize = 28;
    const MAGIC: u32 = SHB_MAGIC;

    fn inner_parse(raw: RawBlock<'a>) -> Result<SectionHeaderBlock<'a>, PcapError> {
        // caller function already tested header type(magic) and length
        let malformed = |reason: &'static str| PcapError::MalformedBlock {
            offset: 0,
            block_type: SHB_MAGIC,
            reason,
        };
        let i = raw.body;
        let (i, bom) = le_u32::<_, ()>(i).map_err(|_| malformed("missing byte-order magic"))?;
        let bom_bytes = bom.to_le_bytes();
        if section_byte_order(bom_bytes) != Some(En::BYTE_ORDER) {
            return Err(malformed("invalid byte-order magic"));
        }
        let (i, major_version) =
            En::parse_u16::<()>(i).map_err(|_| malformed("missing version"))?;
        let (i, minor_version) =
            En::parse_u16::<()>(i).map_err(|_| malformed("missing version"))?;
        let (_, section_len) =
            En::parse_i64::<()>(i).map_err(|_| malformed("missing section length"))?;
        let (options, options_overrun) = block_options(&raw, En::BYTE_ORDER, 16);
        let block = SectionHeaderBlock {
            block_len1: raw.block_len1,
            bom,
            major_version,
            minor_version,
            section_len,
            options,
            options_overrun,
            block_len2: raw.block_len2,
        };
        Ok(block)
    }
}

/// Parse a Section Header Block (little or big endian)
///
/// The byte order is given by the byte-order magic of the block.
pub fn parse_sectionheaderblock(i: &[u8]) -> Result<(&[u8], SectionHeaderBlock), PcapError> {
    match parse_block(i, ByteOrder::Little)? {
        (rem, Block::SectionHeader(shb)) => Ok((rem, shb)),
        (_, block) => Err(PcapError::MalformedBlock {
            offset: 0,
            block_type: block.block_type(),
            reason: "expected section header block",
        }),
    }
}
