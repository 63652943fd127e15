//! Format-detecting reader, producing [`UnifiedRecord`]s from legacy or pcapng input

use std::io::Read;

use log::{debug, warn};

use crate::error::PcapError;
use crate::linktype::Linktype;
use crate::pcap::LegacyPcapReader;
use crate::pcapng::{
    Block, EnhancedPacketBlock, InterfaceDescriptionBlock, PcapNGReader, SimplePacketBlock,
    BLOCK_FRAMING_LEN,
};
use crate::reader::{ReaderConfig, StreamBuffer};
use crate::record::{Timestamp, UnifiedRecord};
use crate::sniff::{sniff, CaptureFormat, SignatureSniffer, SignatureTable};
use crate::traits::PcapNGPacketBlock;

// enough for all entries of the default signature table
const SIGNATURE_PEEK_LEN: usize = 512;

/// Timestamp resolution used when an interface declares an unusable `if_tsresol`
const FALLBACK_RESOLUTION: u64 = 1_000_000;

/// Capture interface, as declared by an Interface Description Block
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InterfaceInfo {
    pub linktype: Linktype,
    pub snaplen: u32,
    /// Timestamp resolution, in units per second
    pub ts_resolution: u64,
    /// Offset added to timestamps, in seconds
    pub ts_offset: i64,
}

impl InterfaceInfo {
    pub fn from_idb(idb: &InterfaceDescriptionBlock) -> InterfaceInfo {
        let ts_resolution = idb.ts_resolution().unwrap_or_else(|| {
            warn!(
                "invalid if_tsresol {:#04x}, using microseconds",
                idb.if_tsresol
            );
            FALLBACK_RESOLUTION
        });
        InterfaceInfo {
            linktype: idb.linktype,
            snaplen: idb.snaplen,
            ts_resolution,
            ts_offset: idb.ts_offset(),
        }
    }
}

fn record_from_epb(epb: EnhancedPacketBlock, interface: &InterfaceInfo) -> UnifiedRecord {
    let timestamp = epb.decode_ts(interface.ts_offset, interface.ts_resolution);
    UnifiedRecord {
        timestamp,
        caplen: epb.caplen,
        origlen: epb.origlen,
        interface_index: epb.if_id,
        linktype: interface.linktype,
        data: epb.data.into_owned(),
    }
}

fn record_from_spb(spb: SimplePacketBlock, interface: &InterfaceInfo) -> UnifiedRecord {
    let mut data = spb.data.into_owned();
    if interface.snaplen != 0 && data.len() > interface.snaplen as usize {
        data.truncate(interface.snaplen as usize);
    }
    UnifiedRecord {
        // simple packets carry no timestamp
        timestamp: Timestamp {
            secs: 0,
            fraction: 0,
            units_per_sec: interface.ts_resolution,
        },
        caplen: data.len() as u32,
        origlen: spb.origlen,
        interface_index: 0,
        linktype: interface.linktype,
        data,
    }
}

enum Inner<R: Read> {
    Legacy(LegacyPcapReader<R>),
    NG {
        reader: PcapNGReader<R>,
        interfaces: Vec<InterfaceInfo>,
        section_index: u64,
    },
}

/// Streaming reader for captures in either format
///
/// The format is detected from the first bytes of the input. Records are returned as
/// [`UnifiedRecord`], so the caller does not have to track interfaces and timestamp resolutions.
///
/// ## Example
///
/// ```rust
/// use capture_parser::*;
///
/// # let input: Vec<u8> = vec![
/// #     0xd4, 0xc3, 0xb2, 0xa1, 2, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0,
/// #     0xff, 0xff, 0, 0, 1, 0, 0, 0,
/// # ];
/// let reader = CaptureReader::open(&input[..]).expect("CaptureReader");
/// for record in reader {
///     match record {
///         Ok(record) => println!("{} bytes on {}", record.caplen, record.linktype),
///         Err(e) if e.is_fatal() => break,
///         Err(e) => eprintln!("skipping: {}", e),
///     }
/// }
/// ```
pub struct CaptureReader<R>
where
    R: Read,
{
    format: CaptureFormat,
    inner: Inner<R>,
}

impl<R> CaptureReader<R>
where
    R: Read,
{
    /// Creates a new `CaptureReader<R>` with the default configuration
    pub fn open(reader: R) -> Result<CaptureReader<R>, PcapError> {
        Self::with_config(ReaderConfig::default(), reader)
    }

    /// Creates a new `CaptureReader<R>` using the provided configuration
    pub fn with_config(config: ReaderConfig, reader: R) -> Result<CaptureReader<R>, PcapError> {
        let mut stream = StreamBuffer::new(reader, &config);
        stream
            .fill(BLOCK_FRAMING_LEN)
            .map_err(|source| PcapError::Io { offset: 0, source })?;
        let format = sniff(stream.data());
        debug!("detected capture format {:?}", format);
        let inner = match format {
            CaptureFormat::Legacy { .. } => {
                Inner::Legacy(LegacyPcapReader::from_stream(stream, &config)?)
            }
            CaptureFormat::BlockBased { .. } => Inner::NG {
                reader: PcapNGReader::from_stream(stream, &config)?,
                interfaces: Vec::new(),
                section_index: 0,
            },
            CaptureFormat::Unknown => {
                stream
                    .fill(SIGNATURE_PEEK_LEN)
                    .map_err(|source| PcapError::Io { offset: 0, source })?;
                let reason = match SignatureTable::default().sniff(stream.data()) {
                    Some(name) => format!("unsupported file type: {}", name),
                    None => "unrecognized magic number".to_string(),
                };
                return Err(PcapError::Header { offset: 0, reason });
            }
        };
        Ok(CaptureReader { format, inner })
    }

    /// Format of the input, as detected when opening
    pub fn format(&self) -> CaptureFormat {
        self.format
    }

    /// Offset of the next record or block in the input
    pub fn offset(&self) -> u64 {
        match &self.inner {
            Inner::Legacy(reader) => reader.offset(),
            Inner::NG { reader, .. } => reader.offset(),
        }
    }

    /// Interfaces declared in the current section (always empty for legacy files)
    pub fn interfaces(&self) -> &[InterfaceInfo] {
        match &self.inner {
            Inner::Legacy(_) => &[],
            Inner::NG { interfaces, .. } => interfaces,
        }
    }
}

impl<R> Iterator for CaptureReader<R>
where
    R: Read,
{
    type Item = Result<UnifiedRecord, PcapError>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Legacy(reader) => {
                let record = reader.next()?;
                let header = reader.header();
                Some(record.map(|record| UnifiedRecord::from_legacy(header, record)))
            }
            Inner::NG {
                reader,
                interfaces,
                section_index,
            } => loop {
                let item = reader.next()?;
                // a section header that failed to parse still starts a section
                if reader.section_index() != *section_index {
                    *section_index = reader.section_index();
                    interfaces.clear();
                }
                let block = match item {
                    Ok(block) => block,
                    Err(e) => return Some(Err(e)),
                };
                match block {
                    Block::InterfaceDescription(idb) => {
                        interfaces.push(InterfaceInfo::from_idb(&idb))
                    }
                    Block::EnhancedPacket(epb) => {
                        let if_id = epb.if_id;
                        return Some(match interfaces.get(if_id as usize) {
                            Some(interface) => Ok(record_from_epb(epb, interface)),
                            None => Err(PcapError::UnknownInterface {
                                offset: reader.block_offset(),
                                if_id,
                            }),
                        });
                    }
                    Block::SimplePacket(spb) => {
                        return Some(match interfaces.first() {
                            Some(interface) => Ok(record_from_spb(spb, interface)),
                            None => Err(PcapError::UnknownInterface {
                                offset: reader.block_offset(),
                                if_id: 0,
                            }),
                        });
                    }
                    Block::SectionHeader(_)
                    | Block::InterfaceStatistics(_)
                    | Block::Unknown(_) => (),
                }
            },
        }
    }
}

impl<R> std::iter::FusedIterator for CaptureReader<R> where R: Read {}
