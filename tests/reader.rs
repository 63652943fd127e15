mod common;

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};

use capture_parser::traits::CancelExt;
use capture_parser::*;
use common::*;

const LE: ByteOrder = ByteOrder::Little;
const BE: ByteOrder = ByteOrder::Big;

/// Reader returning at most `chunk` bytes per call
struct Trickle<'a> {
    data: &'a [u8],
    chunk: usize,
}

impl<'a> Read for Trickle<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fn legacy_capture() -> Vec<u8> {
    let mut input = pcap_header(LE, PCAP_MAGIC_MICRO, 65535, 1);
    input.extend(pcap_record(LE, 100, 5, &[0x11; 14], 14));
    input.extend(pcap_record(LE, 101, 6, &[], 0));
    input
}

fn ng_capture() -> Vec<u8> {
    let mut input = shb(LE, &[]);
    let mut options = ng_option(LE, 9, &[3]);
    options.extend(end_of_options());
    input.extend(idb(LE, 1, 65535, &options));
    input.extend(idb(LE, 101, 4, &[]));
    input.extend(epb(LE, 1, 12_345, &[0x45, 0, 0, 20, 0xff], 20, &[]));
    input.extend(isb(LE, 0, 0, &[]));
    input.extend(epb(LE, 0, 1_500, &[0xaa; 6], 6, &[]));
    input
}

#[test]
fn test_legacy_unified_records() {
    let input = legacy_capture();
    let mut reader = CaptureReader::open(&input[..]).expect("CaptureReader");
    assert!(reader.format().is_legacy());
    assert!(reader.interfaces().is_empty());

    let first = reader.next().expect("first record").expect("valid record");
    assert_eq!(first.caplen, 14);
    assert_eq!(first.data, vec![0x11; 14]);
    assert_eq!(first.linktype, Linktype::ETHERNET);
    assert_eq!(first.timestamp.secs, 100);
    assert_eq!(first.timestamp.fraction, 5);
    assert_eq!(first.timestamp.units_per_sec, 1_000_000);

    let second = reader.next().expect("second record").expect("valid record");
    assert_eq!(second.caplen, 0);
    assert!(second.data.is_empty());

    assert!(reader.next().is_none());
    assert_eq!(reader.offset(), input.len() as u64);
}

#[test]
fn test_pcapng_unified_records() {
    let input = ng_capture();
    let reader = CaptureReader::open(&input[..]).expect("CaptureReader");
    assert_eq!(
        reader.format(),
        CaptureFormat::BlockBased {
            byte_order: Some(LE)
        }
    );
    let records: Vec<_> = reader.collect::<Result<_, _>>().expect("records");
    assert_eq!(records.len(), 2);

    // second interface: raw IP, default microsecond resolution
    let first = &records[0];
    assert_eq!(first.interface_index, 1);
    assert_eq!(first.linktype, Linktype::RAW);
    assert_eq!(first.caplen, 5);
    assert_eq!(first.origlen, 20);
    assert!(first.is_truncated());
    assert_eq!(first.timestamp.secs, 0);
    assert_eq!(first.timestamp.fraction, 12_345);
    assert_eq!(first.timestamp.units_per_sec, 1_000_000);

    // first interface: milliseconds
    let second = &records[1];
    assert_eq!(second.interface_index, 0);
    assert_eq!(second.linktype, Linktype::ETHERNET);
    assert_eq!(second.timestamp.secs, 1);
    assert_eq!(second.timestamp.fraction, 500);
    assert_eq!(second.timestamp.units_per_sec, 1_000);
    assert_eq!(second.timestamp.subsec_nanos(), 500_000_000);
    assert_eq!(second.data, vec![0xaa; 6]);
}

#[test]
fn test_interfaces_reset_by_section() {
    let mut input = ng_capture();
    input.extend(shb(BE, &[]));
    input.extend(idb(BE, 1, 0, &[]));
    input.extend(spb(BE, 3, &[7, 8, 9]));

    let mut reader = CaptureReader::open(&input[..]).expect("CaptureReader");
    let records: Vec<_> = (&mut reader).collect::<Result<_, _>>().expect("records");
    assert_eq!(records.len(), 3);
    assert_eq!(reader.interfaces().len(), 1);

    let last = &records[2];
    assert_eq!(last.interface_index, 0);
    assert_eq!(last.linktype, Linktype::ETHERNET);
    assert_eq!(last.data, vec![7, 8, 9]);
    assert_eq!(last.timestamp.secs, 0);
    assert_eq!(last.timestamp.fraction, 0);
}

#[test]
fn test_interfaces_reset_by_damaged_section() {
    let mut input = shb(LE, &[]);
    input.extend(idb(LE, 101, 65535, &[]));
    let second_section = input.len() as u64;
    let mut bad = shb(BE, &[]);
    let end = bad.len();
    bad[end - 4..].copy_from_slice(&32u32.to_be_bytes());
    input.extend(bad);
    input.extend(idb(BE, 1, 65535, &[]));
    let packet_offset = input.len() as u64;
    input.extend(epb(BE, 1, 0, &[1, 2], 2, &[]));
    input.extend(epb(BE, 0, 0, &[3, 4], 2, &[]));

    let mut reader = CaptureReader::open(&input[..]).expect("CaptureReader");
    match reader.next() {
        Some(Err(PcapError::BlockLengthMismatch { offset, .. })) => {
            assert_eq!(offset, second_section)
        }
        other => panic!("unexpected {:?}", other),
    }
    // only interface 0 exists in the new section
    match reader.next() {
        Some(Err(PcapError::UnknownInterface { offset, if_id })) => {
            assert_eq!(offset, packet_offset);
            assert_eq!(if_id, 1);
        }
        other => panic!("unexpected {:?}", other),
    }
    let record = reader.next().expect("record").expect("valid record");
    assert_eq!(record.interface_index, 0);
    assert_eq!(record.linktype, Linktype::ETHERNET);
    assert_eq!(record.data, vec![3, 4]);
    assert_eq!(reader.interfaces().len(), 1);
    assert!(reader.next().is_none());
}

#[test]
fn test_unknown_interface() {
    let mut input = shb(LE, &[]);
    input.extend(idb(LE, 1, 65535, &[]));
    let bad_offset = input.len() as u64;
    input.extend(epb(LE, 3, 0, &[1, 2], 2, &[]));
    input.extend(epb(LE, 0, 0, &[3, 4], 2, &[]));

    let mut reader = CaptureReader::open(&input[..]).expect("CaptureReader");
    match reader.next() {
        Some(Err(e @ PcapError::UnknownInterface { .. })) => {
            assert_eq!(e.offset(), bad_offset);
            assert!(!e.is_fatal());
        }
        other => panic!("unexpected {:?}", other),
    }
    let record = reader.next().expect("record").expect("valid record");
    assert_eq!(record.data, vec![3, 4]);
    assert!(reader.next().is_none());
}

#[test]
fn test_spb_without_interface() {
    let mut input = shb(LE, &[]);
    input.extend(spb(LE, 2, &[1, 2]));
    let mut reader = CaptureReader::open(&input[..]).expect("CaptureReader");
    assert!(matches!(
        reader.next(),
        Some(Err(PcapError::UnknownInterface { offset: 28, if_id: 0 }))
    ));
    assert!(reader.next().is_none());
}

#[test]
fn test_short_reads() {
    for input in [legacy_capture(), ng_capture()].iter() {
        let expected: Vec<_> = CaptureReader::open(&input[..])
            .expect("reader")
            .collect::<Result<_, _>>()
            .expect("records");
        let trickle = Trickle {
            data: input,
            chunk: 3,
        };
        let config = ReaderConfig::default().with_buffer_size(16);
        let records: Vec<_> = CaptureReader::with_config(config, trickle)
            .expect("reader")
            .collect::<Result<_, _>>()
            .expect("records");
        assert_eq!(records, expected);
    }
}

#[test]
fn test_unsupported_input() {
    let input = b"this is not a capture file";
    match CaptureReader::open(&input[..]) {
        Err(e @ PcapError::Header { .. }) => assert!(e.is_fatal()),
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("text input accepted"),
    }
    assert!(CaptureReader::open(&b""[..]).is_err());
}

#[test]
fn test_sniff() {
    let legacy = legacy_capture();
    assert_eq!(
        sniff(&legacy),
        CaptureFormat::Legacy {
            byte_order: LE,
            variant: LegacyVariant::Microsecond
        }
    );
    let be = pcap_header(BE, PCAP_MAGIC_NANO, 65535, 1);
    assert_eq!(sniff(&be).byte_order(), Some(BE));
    let ng = shb(BE, &[]);
    assert_eq!(sniff(&ng), CaptureFormat::BlockBased { byte_order: Some(BE) });
    assert_eq!(sniff(&ng[..8]), CaptureFormat::BlockBased { byte_order: None });
    assert_eq!(sniff(&ng[..3]), CaptureFormat::Unknown);
}

#[test]
fn test_until_cancelled() {
    let mut input = pcap_header(LE, PCAP_MAGIC_MICRO, 65535, 1);
    for i in 0..10 {
        input.extend(pcap_record(LE, i, 0, &[i as u8], 1));
    }
    let stop = AtomicBool::new(false);
    let reader = CaptureReader::open(&input[..]).expect("CaptureReader");
    let mut count = 0;
    for record in reader.until_cancelled(&stop) {
        let record = record.expect("valid record");
        count += 1;
        if record.timestamp.secs == 3 {
            stop.store(true, Ordering::Relaxed);
        }
    }
    assert_eq!(count, 4);
}
