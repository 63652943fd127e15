use std::sync::atomic::{AtomicBool, Ordering};

/// Common methods for PcapNG blocks containing a network packet
pub trait PcapNGPacketBlock {
    /// Returns true if the packet was truncated by the capture (usually because of snaplen)
    fn truncated(&self) -> bool;
    /// Length of the packet as it appeared on the network
    fn orig_len(&self) -> u32;
    /// Network packet data, without padding
    fn packet_data(&self) -> &[u8];
}

/// Iterator adapter checking a cancellation flag between items
///
/// See [`CancelExt::until_cancelled`].
#[derive(Debug)]
pub struct Cancellable<'f, I> {
    iter: I,
    flag: &'f AtomicBool,
}

impl<'f, I: Iterator> Iterator for Cancellable<'f, I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.flag.load(Ordering::Relaxed) {
            return None;
        }
        self.iter.next()
    }
}

/// Cooperative cancellation for readers
///
/// Readers process one record at a time and never block between records, so checking a flag
/// before each record is enough to stop a long-running read from another thread.
///
/// ```rust
/// use capture_parser::traits::CancelExt;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// let stop = AtomicBool::new(false);
/// let mut it = (0..).until_cancelled(&stop);
/// assert_eq!(it.next(), Some(0));
/// stop.store(true, Ordering::Relaxed);
/// assert_eq!(it.next(), None);
/// ```
pub trait CancelExt: Iterator + Sized {
    /// Stop the iteration as soon as `flag` is set
    fn until_cancelled(self, flag: &AtomicBool) -> Cancellable<'_, Self> {
        Cancellable { iter: self, flag }
    }
}

impl<I: Iterator> CancelExt for I {}
