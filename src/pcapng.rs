//! Block-based capture format (pcapng)
//!
//! Format reference: <https://www.ietf.org/archive/id/draft-ietf-opsawg-pcapng-01.html>.
//!
//! The preferred way to read a file is the [`PcapNGReader`] streaming reader. Blocks already in
//! memory can be decoded with [`parse_block`] (or [`parse_raw_block`] for the framing only).
//!
//! ## Layout
//!
//! Every block has the same framing: block type (4 bytes), total length (4 bytes), body, and the
//! total length repeated. The total length includes the framing, and is a multiple of 4.
//!
//! Blocks are grouped in sections. A section starts with a Section Header Block, and the blocks
//! following it (interface descriptions, packets, statistics) refer to the interfaces declared
//! in this section only: a new SHB resets the interface list.
//!
//! The byte order is also a property of the section. The SHB stores a byte-order magic, and all
//! blocks up to the next SHB use the same order, so one file may mix little and big-endian
//! sections.

mod block;
mod enhanced_packet;
mod interface_description;
mod interface_statistics;
mod option;
mod reader;
mod section_header;
mod simple_packet;
mod time;
mod unknown;

pub use block::*;
pub use enhanced_packet::*;
pub use interface_description::*;
pub use interface_statistics::*;
pub use option::*;
pub use reader::*;
pub use section_header::*;
pub use simple_packet::*;
pub use time::*;
pub use unknown::*;

/// Block type of a Section Header Block (same value in both byte orders)
pub const SHB_MAGIC: u32 = 0x0A0D_0D0A;
/// Block type: interface description
pub const IDB_MAGIC: u32 = 0x0000_0001;
/// Block type: simple packet
pub const SPB_MAGIC: u32 = 0x0000_0003;
/// Block type: name resolution (not decoded)
pub const NRB_MAGIC: u32 = 0x0000_0004;
/// Block type: interface statistics
pub const ISB_MAGIC: u32 = 0x0000_0005;
/// Block type: enhanced packet
pub const EPB_MAGIC: u32 = 0x0000_0006;

/// Byte-order magic of the Section Header Block, as written by the capturing host
pub const BOM_MAGIC: u32 = 0x1A2B_3C4D;

/// Size of the block framing (type, leading and trailing length)
pub const BLOCK_FRAMING_LEN: usize = 12;
