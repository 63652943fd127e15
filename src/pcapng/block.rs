use crate::endianness::{ByteOrder, PcapBE, PcapEndianness, PcapLE};
use crate::error::{OptionOverrun, PcapError};
use crate::sniff::section_byte_order;
use crate::utils::array_ref4;

use super::*;

/// The framing of a block: type, lengths and raw body
///
/// Lengths are checked to be consistent with the available data, but the content of the body is
/// not interpreted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RawBlock<'a> {
    pub block_type: u32,
    /// Total block length, from the block header
    pub block_len1: u32,
    /// Block content, between the leading and the trailing lengths
    pub body: &'a [u8],
    /// Total block length, from the block footer
    pub block_len2: u32,
}

/// Byte order of the block starting at `i`
///
/// A Section Header Block carries its own byte order in the byte-order magic. Any other block uses
/// the order of the current section.
pub(crate) fn block_byte_order(i: &[u8], section_order: ByteOrder) -> ByteOrder {
    match (array_ref4(i, 0).map(u32::from_le_bytes), array_ref4(i, 8)) {
        (Some(SHB_MAGIC), Some(bom)) => section_byte_order(bom).unwrap_or(section_order),
        _ => section_order,
    }
}

// framing field at `offset`, or `TruncatedRecord` if `i` ends before it
fn framing_u32(i: &[u8], offset: usize, order: ByteOrder) -> Result<u32, PcapError> {
    array_ref4(i, offset)
        .map(|b| order.read_u32(b))
        .ok_or(PcapError::TruncatedRecord {
            offset: 0,
            expected: offset as u64 + 4,
            available: i.len() as u64,
        })
}

/// Read the framing of the block starting at `i`
///
/// `byte_order` is the byte order of the current section. Returns the remaining input (after the
/// trailing length) and the block.
///
/// Errors:
/// - `TruncatedRecord` if `i` is shorter than the block
/// - `InvalidBlockLength` if the total length is lower than 12, or not a multiple of 4
/// - `BlockLengthMismatch` if the leading and trailing lengths differ
///
/// Offsets in errors are relative to the start of `i`.
pub fn parse_raw_block(i: &[u8], byte_order: ByteOrder) -> Result<(&[u8], RawBlock), PcapError> {
    if i.len() < BLOCK_FRAMING_LEN {
        return Err(PcapError::TruncatedRecord {
            offset: 0,
            expected: BLOCK_FRAMING_LEN as u64,
            available: i.len() as u64,
        });
    }
    let order = block_byte_order(i, byte_order);
    let block_type = framing_u32(i, 0, order)?;
    let block_len1 = framing_u32(i, 4, order)?;
    if block_len1 < BLOCK_FRAMING_LEN as u32 || block_len1 % 4 != 0 {
        return Err(PcapError::InvalidBlockLength {
            offset: 0,
            length: block_len1,
        });
    }
    let len = block_len1 as usize;
    if i.len() < len {
        return Err(PcapError::TruncatedRecord {
            offset: 0,
            expected: len as u64,
            available: i.len() as u64,
        });
    }
    let block_len2 = framing_u32(i, len - 4, order)?;
    if block_len2 != block_len1 {
        return Err(PcapError::BlockLengthMismatch {
            offset: 0,
            block_type,
            leading: block_len1,
            trailing: block_len2,
        });
    }
    let raw = RawBlock {
        block_type,
        block_len1,
        body: &i[8..len - 4],
        block_len2,
    };
    Ok((&i[len..], raw))
}

/// A block from a PcapNG file
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Block<'a> {
    SectionHeader(SectionHeaderBlock<'a>),
    InterfaceDescription(InterfaceDescriptionBlock<'a>),
    EnhancedPacket(EnhancedPacketBlock<'a>),
    SimplePacket(SimplePacketBlock<'a>),
    InterfaceStatistics(InterfaceStatisticsBlock<'a>),
    Unknown(UnknownBlock<'a>),
}

impl<'a> Block<'a> {
    /// Returns true if blocks contains a network packet
    pub fn is_data_block(&self) -> bool {
        matches!(self, &Block::EnhancedPacket(_) | &Block::SimplePacket(_))
    }

    /// Return the block type
    pub fn block_type(&self) -> u32 {
        match self {
            Block::SectionHeader(_) => SHB_MAGIC,
            Block::InterfaceDescription(_) => IDB_MAGIC,
            Block::EnhancedPacket(_) => EPB_MAGIC,
            Block::SimplePacket(_) => SPB_MAGIC,
            Block::InterfaceStatistics(_) => ISB_MAGIC,
            Block::Unknown(ub) => ub.block_type,
        }
    }

    /// Total length of the block, including framing
    pub fn block_len(&self) -> u32 {
        match self {
            Block::SectionHeader(b) => b.block_len1,
            Block::InterfaceDescription(b) => b.block_len1,
            Block::EnhancedPacket(b) => b.block_len1,
            Block::SimplePacket(b) => b.block_len1,
            Block::InterfaceStatistics(b) => b.block_len1,
            Block::Unknown(b) => b.block_len1,
        }
    }

    /// Options of the block (empty for blocks without options)
    pub fn options(&self) -> &[PcapNGOption<'a>] {
        match self {
            Block::SectionHeader(b) => &b.options,
            Block::InterfaceDescription(b) => &b.options,
            Block::EnhancedPacket(b) => &b.options,
            Block::InterfaceStatistics(b) => &b.options,
            Block::SimplePacket(_) | Block::Unknown(_) => &[],
        }
    }

    /// Option whose declared length ran past the end of the block, if any
    pub fn options_overrun(&self) -> Option<&OptionOverrun> {
        match self {
            Block::SectionHeader(b) => b.options_overrun.as_ref(),
            Block::InterfaceDescription(b) => b.options_overrun.as_ref(),
            Block::EnhancedPacket(b) => b.options_overrun.as_ref(),
            Block::InterfaceStatistics(b) => b.options_overrun.as_ref(),
            Block::SimplePacket(_) | Block::Unknown(_) => None,
        }
    }

    /// Returns a block owning its data
    pub fn into_owned(self) -> Block<'static> {
        match self {
            Block::SectionHeader(b) => Block::SectionHeader(b.into_owned()),
            Block::InterfaceDescription(b) => Block::InterfaceDescription(b.into_owned()),
            Block::EnhancedPacket(b) => Block::EnhancedPacket(b.into_owned()),
            Block::SimplePacket(b) => Block::SimplePacket(b.into_owned()),
            Block::InterfaceStatistics(b) => Block::InterfaceStatistics(b.into_owned()),
            Block::Unknown(b) => Block::Unknown(b.into_owned()),
        }
    }
}

/// Parse any block
///
/// `byte_order` is the byte order of the current section. A Section Header Block is always
/// decoded using its own byte-order magic, which then defines the order for the following blocks
/// (see [`SectionHeaderBlock::byte_order`]).
///
/// Known block types are decoded, other types are returned as [`Block::Unknown`]. Returns the
/// remaining input and the block, borrowing from `i`. Offsets in errors are relative to the start
/// of `i`.
pub fn parse_block(i: &[u8], byte_order: ByteOrder) -> Result<(&[u8], Block), PcapError> {
    let (rem, raw) = parse_raw_block(i, byte_order)?;
    let block = match block_byte_order(i, byte_order) {
        ByteOrder::Little => parse_block_content::<PcapLE>(raw)?,
        ByteOrder::Big => parse_block_content::<PcapBE>(raw)?,
    };
    Ok((rem, block))
}

fn parse_block_content<En: PcapEndianness>(raw: RawBlock) -> Result<Block, PcapError> {
    let block = match raw.block_type {
        SHB_MAGIC => Block::SectionHeader(ng_block_parser::<SectionHeaderBlock, En>(raw)?),
        IDB_MAGIC => {
            Block::InterfaceDescription(ng_block_parser::<InterfaceDescriptionBlock, En>(raw)?)
        }
        EPB_MAGIC => Block::EnhancedPacket(ng_block_parser::<EnhancedPacketBlock, En>(raw)?),
        SPB_MAGIC => Block::SimplePacket(ng_block_parser::<SimplePacketBlock, En>(raw)?),
        ISB_MAGIC => {
            Block::InterfaceStatistics(ng_block_parser::<InterfaceStatisticsBlock, En>(raw)?)
        }
        _ => Block::Unknown(ng_block_parser::<UnknownBlock, En>(raw)?),
    };
    Ok(block)
}

pub(crate) trait PcapNGBlockParser<'a, En: PcapEndianness>: Sized {
    /// Minimum block size (including framing), in bytes
    const HDR_SZ: usize;
    /// Magic number for this block type (0 for any type)
    const MAGIC: u32;

    // caller function must have tested header type(magic) and length
    fn inner_parse(raw: RawBlock<'a>) -> Result<Self, PcapError>;
}

/// Decode the content of a block, given the parameters (block object and endianness)
pub(crate) fn ng_block_parser<'a, P, En>(raw: RawBlock<'a>) -> Result<P, PcapError>
where
    P: PcapNGBlockParser<'a, En>,
    En: PcapEndianness,
{
    if P::MAGIC != 0 && raw.block_type != P::MAGIC {
        return Err(PcapError::MalformedBlock {
            offset: 0,
            block_type: raw.block_type,
            reason: "unexpected block type",
        });
    }
    if (raw.block_len1 as usize) < P::HDR_SZ {
        return Err(PcapError::MalformedBlock {
            offset: 0,
            block_type: raw.block_type,
            reason: "block body shorter than fixed header",
        });
    }
    P::inner_parse(raw)
}

/// Collect the options starting at `body_offset` in the block body
///
/// Offsets of option errors are relative to the start of the block (the body starts at offset 8).
pub(crate) fn block_options<'a>(
    raw: &RawBlock<'a>,
    byte_order: ByteOrder,
    body_offset: usize,
) -> (Vec<PcapNGOption<'a>>, Option<OptionOverrun>) {
    let data = raw.body.get(body_offset..).unwrap_or(&[]);
    collect_options(data, byte_order, 8 + body_offset as u64)
}
