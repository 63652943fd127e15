//! # Capture file readers
//!
//! Streaming and slice-level parsers for packet capture files: the legacy pcap format (fixed
//! global header, fixed record headers) and the block-based pcapng format.
//!
//! Both byte orders are supported, as well as the legacy variants (microsecond or nanosecond
//! timestamps, "modified" records) and pcapng files mixing several sections. Only safe code is
//! used. Slice-level functions borrow from their input; streaming readers return values owning
//! their data, so the read buffer can be reused.
//!
//! # Reading blocks
//!
//! A [`PcapNGReader`] returns each block of a pcapng input. Errors local to one block are
//! returned and the reader moves on to the next block; other errors end the iteration.
//!
//! ```rust
//! use capture_parser::*;
//!
//! # let input: Vec<u8> = vec![
//! #     0x0a, 0x0d, 0x0d, 0x0a, 28, 0, 0, 0, 0x4d, 0x3c, 0x2b, 0x1a, 1, 0, 0, 0,
//! #     0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 28, 0, 0, 0,
//! # ];
//! let reader = PcapNGReader::open(&input[..]).expect("PcapNGReader");
//! let mut sections = 0;
//! for block in reader {
//!     match block {
//!         Ok(Block::SectionHeader(shb)) => {
//!             sections += 1;
//!             println!("section {:?} endian", shb.byte_order());
//!         }
//!         Ok(_) => (),
//!         Err(e) if e.is_fatal() => panic!("error while reading: {}", e),
//!         Err(e) => eprintln!("skipping invalid block: {}", e),
//!     }
//! }
//! assert_eq!(sections, 1);
//! ```
//!
//! [`LegacyPcapReader`] does the same for legacy files, returning one [`LegacyRecord`] per
//! packet after the global header.
//!
//! # Reading packets from any capture
//!
//! A [`CaptureReader`] detects the format (see [`sniff()`]) and returns a [`UnifiedRecord`] for
//! every packet, with the interface, link type and decoded timestamp. Interface bookkeeping of
//! pcapng sections is done by the reader.
//!
//! # Logging
//!
//! The crate logs through the [`log`] facade: reader creation and section changes at `debug`
//! level, every record or block at `trace` level, and skipped data at `warn` level. No logger is
//! installed by the crate.

mod endianness;
mod error;
mod linktype;
mod utils;
pub use endianness::ByteOrder;
pub use error::*;
pub use linktype::*;

pub mod pcap;
pub mod pcapng;
pub use pcap::*;
pub use pcapng::*;

pub mod reader;
pub mod sniff;
pub use reader::{ReaderConfig, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_RECORD_SIZE};
pub use sniff::*;

pub mod traits;

mod capture;
mod record;
pub use capture::*;
pub use record::*;
