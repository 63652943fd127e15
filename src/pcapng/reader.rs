use std::io::Read;

use log::{debug, trace, warn};

use crate::endianness::ByteOrder;
use crate::error::PcapError;
use crate::reader::{ReaderConfig, StreamBuffer};
use crate::sniff::{section_byte_order, sniff, CaptureFormat};
use crate::utils::array_ref4;

use super::*;

/// Parsing iterator over pcap-ng data (streaming version)
///
/// ## Pcap-NG Reader
///
/// This reader is a streaming parser based on a circular buffer, which means memory
/// usage is constant, and that it can be used to parse huge files or infinite streams.
/// It creates an abstraction over any input providing the `Read` trait, and takes care
/// of managing the circular buffer to provide an iterator interface.
///
/// The first call to `next` should return the a Section Header Block (SHB), marking the start of a
/// new section.
/// For each section, calls to `next` will return blocks, some of them containing data (SPB, EPB),
/// and others containing information (IDB, ISB, etc.).
///
/// Some information must be stored (for ex. the data link type from the IDB) to be able to parse
/// following block contents. Usually, a list of interfaces must be stored, with the data link type
/// and capture length, for each section. These values are used when parsing Enhanced Packet Blocks
/// (which gives an interface ID - the index, starting from 0) and Simple Packet Blocks (which
/// assume an interface index of 0). See [`CaptureReader`](crate::CaptureReader) for a reader
/// doing this work.
///
/// Errors affecting a single block (see [`PcapError::is_fatal`]) are returned, and the reader
/// continues with the next block, located using the leading block length. Other errors end the
/// iteration.
///
/// ## Example
///
/// ```rust
/// use capture_parser::*;
///
/// # let input: Vec<u8> = vec![
/// #     0x0a, 0x0d, 0x0d, 0x0a, 28, 0, 0, 0, 0x4d, 0x3c, 0x2b, 0x1a, 1, 0, 0, 0,
/// #     0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 28, 0, 0, 0,
/// # ];
/// let mut reader = PcapNGReader::open(&input[..]).expect("PcapNGReader");
/// let mut num_blocks = 0;
/// let mut if_linktypes = Vec::new();
/// for block in &mut reader {
///     match block {
///         Ok(Block::SectionHeader(_)) => {
///             // starting a new section, clear known interfaces
///             if_linktypes = Vec::new();
///         }
///         Ok(Block::InterfaceDescription(idb)) => {
///             if_linktypes.push(idb.linktype);
///         }
///         Ok(Block::EnhancedPacket(epb)) => {
///             let linktype = if_linktypes.get(epb.if_id as usize);
///             // use linktype to parse epb.data
///         }
///         Ok(_) => {
///             // can be statistics (ISB), name resolution (NRB), etc.
///         }
///         Err(e) => eprintln!("error while reading: {}", e),
///     }
///     num_blocks += 1;
/// }
/// println!("num_blocks: {}", num_blocks);
/// ```
pub struct PcapNGReader<R>
where
    R: Read,
{
    stream: StreamBuffer<R>,
    byte_order: ByteOrder,
    max_record_size: usize,
    block_offset: u64,
    section_index: u64,
    finished: bool,
}

impl<R> PcapNGReader<R>
where
    R: Read,
{
    /// Creates a new `PcapNGReader<R>` with the default configuration
    pub fn open(reader: R) -> Result<PcapNGReader<R>, PcapError> {
        Self::with_config(ReaderConfig::default(), reader)
    }

    /// Creates a new `PcapNGReader<R>` with the provided buffer capacity.
    pub fn new(capacity: usize, reader: R) -> Result<PcapNGReader<R>, PcapError> {
        Self::with_config(ReaderConfig::default().with_buffer_size(capacity), reader)
    }

    /// Creates a new `PcapNGReader<R>` using the provided configuration
    pub fn with_config(config: ReaderConfig, reader: R) -> Result<PcapNGReader<R>, PcapError> {
        let stream = StreamBuffer::new(reader, &config);
        Self::from_stream(stream, &config)
    }

    pub(crate) fn from_stream(
        mut stream: StreamBuffer<R>,
        config: &ReaderConfig,
    ) -> Result<PcapNGReader<R>, PcapError> {
        let offset = stream.offset();
        stream
            .fill(BLOCK_FRAMING_LEN)
            .map_err(|source| PcapError::Io { offset, source })?;
        let byte_order = match sniff(stream.data()) {
            CaptureFormat::BlockBased {
                byte_order: Some(byte_order),
            } => byte_order,
            CaptureFormat::BlockBased { byte_order: None } => {
                return Err(PcapError::Header {
                    offset,
                    reason: "cannot read section byte-order magic".to_string(),
                })
            }
            _ => {
                return Err(PcapError::Header {
                    offset,
                    reason: "not a pcapng section header block".to_string(),
                })
            }
        };
        debug!("pcapng reader: first section is {:?} endian", byte_order);
        Ok(PcapNGReader {
            stream,
            byte_order,
            max_record_size: config.max_record_size,
            block_offset: offset,
            section_index: 0,
            finished: false,
        })
    }

    /// Byte order of the current section
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Offset of the next block in the input
    pub fn offset(&self) -> u64 {
        self.stream.offset()
    }

    /// Offset of the last block read (or of the first block, before reading)
    pub fn block_offset(&self) -> u64 {
        self.block_offset
    }

    /// Number of sections started so far
    ///
    /// A section starts at every Section Header Block with a valid byte-order magic, even if the
    /// rest of the block is invalid. Interfaces declared before the last change no longer apply.
    pub fn section_index(&self) -> u64 {
        self.section_index
    }

    fn read_block(&mut self) -> Result<Option<Block<'static>>, PcapError> {
        let offset = self.stream.offset();
        let available = self
            .stream
            .fill(BLOCK_FRAMING_LEN)
            .map_err(|source| PcapError::Io { offset, source })?;
        if available == 0 {
            return Ok(None);
        }
        if available < BLOCK_FRAMING_LEN {
            return Err(PcapError::TruncatedRecord {
                offset,
                expected: BLOCK_FRAMING_LEN as u64,
                available: available as u64,
            });
        }
        let data = self.stream.data();
        if array_ref4(data, 0).map(u32::from_le_bytes) == Some(SHB_MAGIC) {
            let order = array_ref4(data, 8)
                .and_then(section_byte_order)
                .ok_or_else(|| PcapError::Header {
                    offset: offset + 8,
                    reason: "invalid section byte-order magic".to_string(),
                })?;
            if order != self.byte_order {
                debug!(
                    "section at offset {} switches to {:?} endian",
                    offset, order
                );
            }
            self.byte_order = order;
            self.section_index += 1;
        }
        let block_len = array_ref4(data, 4)
            .map(|b| self.byte_order.read_u32(b))
            .ok_or(PcapError::TruncatedRecord {
                offset,
                expected: BLOCK_FRAMING_LEN as u64,
                available: available as u64,
            })?;
        if block_len < BLOCK_FRAMING_LEN as u32 || block_len % 4 != 0 {
            return Err(PcapError::InvalidBlockLength {
                offset,
                length: block_len,
            });
        }
        if block_len as usize > self.max_record_size {
            // a bogus length at the end of the input is a truncation
            let available = self
                .stream
                .fill(self.max_record_size)
                .map_err(|source| PcapError::Io { offset, source })?;
            if available < self.max_record_size {
                return Err(PcapError::TruncatedRecord {
                    offset,
                    expected: u64::from(block_len),
                    available: available as u64,
                });
            }
            return Err(PcapError::RecordTooLarge {
                offset,
                length: u64::from(block_len),
                limit: self.max_record_size,
            });
        }
        let len = block_len as usize;
        let available = self
            .stream
            .fill(len)
            .map_err(|source| PcapError::Io { offset, source })?;
        if available < len {
            return Err(PcapError::TruncatedRecord {
                offset,
                expected: len as u64,
                available: available as u64,
            });
        }
        let res = parse_block(&self.stream.data()[..len], self.byte_order)
            .map(|(_, block)| block.into_owned())
            .map_err(|e| e.with_base_offset(offset));
        // the leading length is trusted to find the next block, even if this one is invalid
        self.stream.consume(len);
        self.block_offset = offset;
        let block = res?;
        trace!(
            "block type {:#010x} at offset {}, length {}",
            block.block_type(),
            offset,
            block_len
        );
        if let Some(overrun) = block.options_overrun() {
            warn!("block at offset {}: {}", offset, overrun);
        }
        Ok(Some(block))
    }
}

impl<R> Iterator for PcapNGReader<R>
where
    R: Read,
{
    type Item = Result<Block<'static>, PcapError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_block() {
            Ok(Some(block)) => Some(Ok(block)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                if e.is_fatal() {
                    self.finished = true;
                } else {
                    warn!("skipping block: {}", e);
                }
                Some(Err(e))
            }
        }
    }
}

impl<R> std::iter::FusedIterator for PcapNGReader<R> where R: Read {}
