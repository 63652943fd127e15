use std::io::Read;

use log::{debug, trace};

use crate::error::PcapError;
use crate::pcap::{parse_pcap_header, record_parser, LegacyParseFn, LegacyRecord, PcapHeader};
use crate::pcap::PCAP_HEADER_LEN;
use crate::reader::{ReaderConfig, StreamBuffer};
use crate::sniff::sniff;
use crate::utils::array_ref4;

/// Parsing iterator over legacy pcap data (streaming version)
///
/// ## Pcap Reader
///
/// This reader is a streaming parser based on a circular buffer, which means memory
/// usage is constant, and that it can be used to parse huge files or infinite streams.
/// It creates an abstraction over any input providing the `Read` trait, and takes care
/// of managing the circular buffer to provide an iterator interface.
///
/// The global header is read when the reader is created, and is available using
/// [`header`](LegacyPcapReader::header). Some information of this header (for ex. the data link
/// type) is needed to interpret the records.
///
/// Each call to `next` returns a record owning its data. The sequence is finite and single-pass:
/// it ends when the input is exhausted, or after the first error (a truncated record, which is
/// reported once).
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
/// let mut reader = LegacyPcapReader::open(&input[..]).expect("LegacyPcapReader");
/// let linktype = reader.header().linktype;
/// let mut num_records = 0;
/// for record in &mut reader {
///     match record {
///         Ok(record) => {
///             // use linktype to parse record.data()
///             num_records += 1;
///         }
///         Err(e) => eprintln!("error while reading: {}", e),
///     }
/// }
/// println!("num_records: {}", num_records);
/// ```
pub struct LegacyPcapReader<R>
where
    R: Read,
{
    header: PcapHeader,
    stream: StreamBuffer<R>,
    parse: LegacyParseFn,
    max_record_size: usize,
    finished: bool,
}

impl<R> LegacyPcapReader<R>
where
    R: Read,
{
    /// Creates a new `LegacyPcapReader<R>` with the default configuration
    pub fn open(reader: R) -> Result<LegacyPcapReader<R>, PcapError> {
        Self::with_config(ReaderConfig::default(), reader)
    }

    /// Creates a new `LegacyPcapReader<R>` with the provided buffer capacity.
    pub fn new(capacity: usize, reader: R) -> Result<LegacyPcapReader<R>, PcapError> {
        Self::with_config(ReaderConfig::default().with_buffer_size(capacity), reader)
    }

    /// Creates a new `LegacyPcapReader<R>` using the provided configuration
    pub fn with_config(config: ReaderConfig, reader: R) -> Result<LegacyPcapReader<R>, PcapError> {
        let stream = StreamBuffer::new(reader, &config);
        Self::from_stream(stream, &config)
    }

    pub(crate) fn from_stream(
        mut stream: StreamBuffer<R>,
        config: &ReaderConfig,
    ) -> Result<LegacyPcapReader<R>, PcapError> {
        let available = stream
            .fill(PCAP_HEADER_LEN)
            .map_err(|source| PcapError::Io { offset: 0, source })?;
        if available < PCAP_HEADER_LEN {
            return Err(PcapError::Header {
                offset: 0,
                reason: format!("file too short for pcap header ({} bytes)", available),
            });
        }
        let header = match parse_pcap_header(stream.data()) {
            Ok((_, header)) => header,
            Err(_) => {
                return Err(PcapError::Header {
                    offset: 0,
                    reason: format!("unrecognized magic number ({:?})", sniff(stream.data())),
                })
            }
        };
        debug!(
            "pcap header: version {}.{}, {:?} endian, {:?}, snaplen {}, linktype {}",
            header.version_major,
            header.version_minor,
            header.byte_order,
            header.variant,
            header.snaplen,
            header.linktype
        );
        stream.consume(PCAP_HEADER_LEN);
        let parse = record_parser(&header);
        Ok(LegacyPcapReader {
            header,
            stream,
            parse,
            max_record_size: config.max_record_size,
            finished: false,
        })
    }

    /// The global header of the file
    pub fn header(&self) -> &PcapHeader {
        &self.header
    }

    /// Offset of the next record in the input
    pub fn offset(&self) -> u64 {
        self.stream.offset()
    }

    fn read_record(&mut self) -> Result<Option<LegacyRecord<'static>>, PcapError> {
        let offset = self.stream.offset();
        let hdr_len = self.header.variant.record_header_len();
        let available = self
            .stream
            .fill(hdr_len)
            .map_err(|source| PcapError::Io { offset, source })?;
        if available == 0 {
            return Ok(None);
        }
        if available < hdr_len {
            return Err(PcapError::TruncatedRecord {
                offset,
                expected: hdr_len as u64,
                available: available as u64,
            });
        }
        let caplen = array_ref4(self.stream.data(), 8)
            .map(|b| self.header.byte_order.read_u32(b))
            .ok_or(PcapError::TruncatedRecord {
                offset,
                expected: hdr_len as u64,
                available: available as u64,
            })?;
        let record_len = hdr_len as u64 + u64::from(caplen);
        if record_len > self.max_record_size as u64 {
            // a bogus caplen at the end of the input is a truncation
            let available = self
                .stream
                .fill(self.max_record_size)
                .map_err(|source| PcapError::Io { offset, source })?;
            if available < self.max_record_size {
                return Err(PcapError::TruncatedRecord {
                    offset,
                    expected: record_len,
                    available: available as u64,
                });
            }
            return Err(PcapError::RecordTooLarge {
                offset,
                length: record_len,
                limit: self.max_record_size,
            });
        }
        let record_len = record_len as usize;
        let available = self
            .stream
            .fill(record_len)
            .map_err(|source| PcapError::Io { offset, source })?;
        if available < record_len {
            return Err(PcapError::TruncatedRecord {
                offset,
                expected: record_len as u64,
                available: available as u64,
            });
        }
        let record = match (self.parse)(self.stream.data()) {
            Ok((_, record)) => record.into_owned(),
            Err(_) => {
                return Err(PcapError::TruncatedRecord {
                    offset,
                    expected: record_len as u64,
                    available: available as u64,
                })
            }
        };
        trace!(
            "record at offset {}: caplen {}, origlen {}",
            offset,
            record.caplen,
            record.origlen
        );
        self.stream.consume(record_len);
        Ok(Some(record))
    }
}

impl<R> Iterator for LegacyPcapReader<R>
where
    R: Read,
{
    type Item = Result<LegacyRecord<'static>, PcapError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                // every legacy error is terminal
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl<R> std::iter::FusedIterator for LegacyPcapReader<R> where R: Read {}
