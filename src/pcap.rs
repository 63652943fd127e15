//! PCAP (legacy) file format
//!
//! See <https://wiki.wireshark.org/Development/LibpcapFileFormat> for details.
//!
//! A legacy file is a 24-byte global header, followed by records. Each record is a fixed-size
//! header (16 bytes, or 24 bytes for the "modified" variant) followed by `caplen` bytes of packet
//! data. The magic number of the global header gives the byte order of every following field,
//! and the unit of the record timestamps (micro or nanoseconds).
//!
//! The preferred way to read a file is the [`LegacyPcapReader`] streaming reader. For data
//! already in memory, parse the header using [`parse_pcap_header`], then loop over
//! [`parse_pcap_record`].

mod header;
mod reader;
mod record;

pub use header::*;
pub use reader::*;
pub use record::*;
