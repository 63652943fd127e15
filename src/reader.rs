//! Reader configuration, and the circular buffer shared by the streaming readers
//!
//! Both readers keep unconsumed input in a [`circular::Buffer`], so memory usage is bounded and
//! huge files or infinite streams can be read. The buffer is refilled from the underlying
//! `Read` source when a record does not fit in the available data, and grows (up to
//! [`ReaderConfig::max_record_size`]) when a single record is larger than the buffer.

use std::io::{self, Read};

use circular::Buffer;

/// Default capacity of the reader buffer
pub const DEFAULT_BUFFER_SIZE: usize = 65536;
/// Default maximum size of a single record or block
pub const DEFAULT_MAX_RECORD_SIZE: usize = 16 * 1024 * 1024;

/// Configuration of the streaming readers
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReaderConfig {
    /// Initial capacity of the read buffer. A larger value (at least 65k) avoids frequent reads
    /// and buffer shifts.
    pub buffer_size: usize,
    /// Largest record (legacy) or block (pcapng) accepted, in bytes. The buffer is grown up to
    /// this size if needed.
    pub max_record_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
        }
    }
}

impl ReaderConfig {
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_max_record_size(mut self, max_record_size: usize) -> Self {
        self.max_record_size = max_record_size;
        self
    }
}

/// Circular buffer over a `Read` source, tracking the absolute offset of consumed data
pub(crate) struct StreamBuffer<R: Read> {
    reader: R,
    buffer: Buffer,
    consumed: u64,
    reader_exhausted: bool,
}

impl<R: Read> StreamBuffer<R> {
    pub(crate) fn new(reader: R, config: &ReaderConfig) -> Self {
        // a zero-sized buffer could never be refilled
        let capacity = config.buffer_size.max(64);
        StreamBuffer {
            reader,
            buffer: Buffer::with_capacity(capacity),
            consumed: 0,
            reader_exhausted: false,
        }
    }

    /// Absolute offset of the first unconsumed byte
    #[inline]
    pub(crate) fn offset(&self) -> u64 {
        self.consumed
    }

    /// Unconsumed data currently in the buffer
    #[inline]
    pub(crate) fn data(&self) -> &[u8] {
        self.buffer.data()
    }

    /// Read until at least `n` bytes are available, or the source is exhausted
    ///
    /// Returns the number of available bytes, which is lower than `n` only at end of input.
    pub(crate) fn fill(&mut self, n: usize) -> io::Result<usize> {
        if n > self.buffer.capacity() {
            self.buffer.grow(n);
        }
        while self.buffer.available_data() < n && !self.reader_exhausted {
            self.refill()?;
        }
        Ok(self.buffer.available_data())
    }

    fn refill(&mut self) -> io::Result<()> {
        self.buffer.shift();
        let space = self.buffer.space();
        // check if available space is empty, so we can distinguish
        // a read() returning 0 because of EOF or because we requested 0
        if space.is_empty() {
            return Ok(());
        }
        let sz = match self.reader.read(space) {
            Ok(sz) => sz,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(()),
            Err(e) => return Err(e),
        };
        self.reader_exhausted = sz == 0;
        self.buffer.fill(sz);
        Ok(())
    }

    /// Consume `n` bytes. The caller must not keep references to the buffer data.
    pub(crate) fn consume(&mut self, n: usize) {
        let n = n.min(self.buffer.available_data());
        self.consumed += n as u64;
        self.buffer.consume(n);
    }
}
