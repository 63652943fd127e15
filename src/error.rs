use std::io;

use thiserror::Error;

/// An option whose declared length runs past the end of its block body
///
/// The options decoded before the overrun are kept, and the block itself remains valid.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("option {code} at offset {offset} declares {length} bytes, only {available} available")]
pub struct OptionOverrun {
    /// Offset of the option header
    pub offset: u64,
    pub code: u16,
    pub length: u16,
    pub available: usize,
}

/// Errors raised while reading a capture
///
/// Every variant carries the byte offset at which the problem was detected. Streaming readers
/// report absolute offsets in the input; slice-level block functions report offsets relative to
/// the start of the block.
#[derive(Debug, Error)]
pub enum PcapError {
    /// The input cannot be interpreted at all (too short, wrong magic, bad byte-order magic)
    #[error("invalid capture header at offset {offset}: {reason}")]
    Header { offset: u64, reason: String },

    /// The input ends in the middle of a record or block
    #[error("truncated record at offset {offset}: expected {expected} bytes, {available} available")]
    TruncatedRecord {
        offset: u64,
        expected: u64,
        available: u64,
    },

    /// Leading and trailing block lengths differ
    #[error(
        "block length mismatch at offset {offset} (type {block_type:#010x}): \
         leading {leading}, trailing {trailing}"
    )]
    BlockLengthMismatch {
        offset: u64,
        block_type: u32,
        leading: u32,
        trailing: u32,
    },

    /// Block total length is below the minimum or not a multiple of 4
    #[error("invalid block total length {length} at offset {offset}")]
    InvalidBlockLength { offset: u64, length: u32 },

    /// A record or block is larger than the configured limit
    #[error("record at offset {offset} is {length} bytes, over the {limit} bytes limit")]
    RecordTooLarge {
        offset: u64,
        length: u64,
        limit: usize,
    },

    /// The content of a block does not match its declared type
    #[error("malformed block (type {block_type:#010x}) at offset {offset}: {reason}")]
    MalformedBlock {
        offset: u64,
        block_type: u32,
        reason: &'static str,
    },

    /// A packet block references an interface not declared in the current section
    #[error("packet at offset {offset} refers to undeclared interface {if_id}")]
    UnknownInterface { offset: u64, if_id: u32 },

    #[error("read error at offset {offset}: {source}")]
    Io {
        offset: u64,
        #[source]
        source: io::Error,
    },
}

impl PcapError {
    /// Byte offset at which the error was detected
    pub fn offset(&self) -> u64 {
        match self {
            PcapError::Header { offset, .. }
            | PcapError::TruncatedRecord { offset, .. }
            | PcapError::BlockLengthMismatch { offset, .. }
            | PcapError::InvalidBlockLength { offset, .. }
            | PcapError::RecordTooLarge { offset, .. }
            | PcapError::MalformedBlock { offset, .. }
            | PcapError::UnknownInterface { offset, .. }
            | PcapError::Io { offset, .. } => *offset,
        }
    }

    /// Returns true if no more data can be read after this error
    ///
    /// Block-local errors (length mismatch, malformed content, unknown interface) only affect one
    /// block, and iteration continues after them. Option overruns are not errors of the stream:
    /// they are kept on the block, see [`Block::options_overrun`](crate::Block::options_overrun).
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            PcapError::BlockLengthMismatch { .. }
                | PcapError::MalformedBlock { .. }
                | PcapError::UnknownInterface { .. }
        )
    }

    /// Shift the offset by `base`, to turn a block-relative offset into a stream offset
    pub(crate) fn with_base_offset(mut self, base: u64) -> Self {
        match &mut self {
            PcapError::Header { offset, .. }
            | PcapError::TruncatedRecord { offset, .. }
            | PcapError::BlockLengthMismatch { offset, .. }
            | PcapError::InvalidBlockLength { offset, .. }
            | PcapError::RecordTooLarge { offset, .. }
            | PcapError::MalformedBlock { offset, .. }
            | PcapError::UnknownInterface { offset, .. }
            | PcapError::Io { offset, .. } => *offset += base,
        }
        self
    }
}
