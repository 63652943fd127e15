mod common;

use capture_parser::traits::PcapNGPacketBlock;
use capture_parser::*;
use common::*;

const LE: ByteOrder = ByteOrder::Little;
const BE: ByteOrder = ByteOrder::Big;

fn read_all(input: &[u8]) -> Vec<Result<Block<'static>, PcapError>> {
    PcapNGReader::new(256, input).expect("PcapNGReader").collect()
}

#[test]
fn test_epb_option_value() {
    let mut input = shb(LE, &[]);
    let mut options = ng_option(LE, 2, b"hello");
    options.extend(end_of_options());
    input.extend(epb(LE, 0, 0, &[0xde, 0xad, 0xbe, 0xef], 4, &options));

    let mut reader = PcapNGReader::open(&input[..]).expect("PcapNGReader");
    let block = reader.next().expect("SHB").expect("valid SHB");
    assert!(matches!(block, Block::SectionHeader(_)));
    let block = reader.next().expect("EPB").expect("valid EPB");
    let epb = match block {
        Block::EnhancedPacket(epb) => epb,
        b => panic!("unexpected block {:?}", b),
    };
    assert_eq!(epb.options.len(), 1);
    assert_eq!(epb.options[0].code, OptionCode(2));
    assert_eq!(epb.options[0].len, 5);
    assert_eq!(epb.options[0].value(), b"hello");
    assert!(epb.options_overrun.is_none());
    assert_eq!(epb.packet_data(), &[0xde, 0xad, 0xbe, 0xef]);
    assert!(!epb.truncated());
    assert!(reader.next().is_none());
}

#[test]
fn test_option_padding() {
    let mut data = ng_option(LE, 1, b"abc");
    data.extend(ng_option(LE, 1, b"abcd"));
    data.extend(ng_option(LE, 1, b"x"));
    data.extend(end_of_options());

    let mut iter = parse_options(&data, LE);
    let option = iter.next().expect("option").expect("valid option");
    assert_eq!(option.value(), b"abc");
    assert_eq!(iter.offset(), 8);
    let option = iter.next().expect("option").expect("valid option");
    assert_eq!(option.value(), b"abcd");
    assert_eq!(iter.offset(), 16);
    let option = iter.next().expect("option").expect("valid option");
    assert_eq!(option.value(), b"x");
    assert_eq!(option.as_str(), Some("x"));
    assert!(iter.next().is_none());
}

#[test]
fn test_option_padding_all_lengths() {
    for len in (0..=64).chain(65532..=65535) {
        let value = vec![0x5a; len];
        let mut data = ng_option(BE, 1, &value);
        data.extend(ng_option(BE, 2, b"next"));
        data.extend(end_of_options());

        let mut iter = parse_options(&data, BE);
        let option = iter.next().expect("option").expect("valid option");
        assert_eq!(option.len as usize, len);
        assert_eq!(option.value().len(), len);
        let padded = (len + 3) & !3;
        assert_eq!(iter.offset(), 4 + padded as u64, "option length {}", len);
        let option = iter.next().expect("next option").expect("valid option");
        assert_eq!(option.code, OptionCode(2));
        assert_eq!(option.value(), b"next");
        assert!(iter.next().is_none());
    }
}

#[test]
fn test_block_lengths() {
    let mut options = ng_option(LE, 1, b"comment");
    options.extend(end_of_options());
    let mut blocks = vec![
        shb(LE, &[]),
        shb(LE, &options),
        idb(LE, 1, 65535, &[]),
        idb(LE, 1, 65535, &options),
        isb(LE, 0, 42, &options),
    ];
    for n in 0..8u8 {
        let data: Vec<u8> = (0..n).collect();
        blocks.push(epb(LE, 0, 1, &data, u32::from(n), &[]));
        blocks.push(epb(LE, 0, 1, &data, u32::from(n), &options));
        blocks.push(spb(LE, u32::from(n), &data));
    }
    for block in &blocks {
        let (rem, raw) = parse_raw_block(block, LE).expect("raw block");
        assert!(rem.is_empty());
        assert_eq!(raw.body.len() + 12, block.len());
        assert_eq!(raw.block_len1 as usize, block.len());
        assert_eq!(raw.block_len2, raw.block_len1);
        let (_, parsed) = parse_block(block, LE).expect("block");
        assert_eq!(parsed.block_len(), raw.block_len1);
        assert!(parsed.options_overrun().is_none());
    }
}

#[test]
fn test_section_byte_order_change() {
    let mut input = shb(LE, &[]);
    input.extend(idb(LE, 1, 65535, &[]));
    input.extend(epb(LE, 0, 1, &[1, 2, 3], 3, &[]));
    let second_section = input.len() as u64;
    input.extend(shb(BE, &[]));
    input.extend(idb(BE, 101, 1500, &[]));
    input.extend(epb(BE, 0, 2, &[4, 5, 6, 7, 8], 5, &[]));

    let mut reader = PcapNGReader::open(&input[..]).expect("PcapNGReader");
    let mut orders = Vec::new();
    let mut payloads = Vec::new();
    while let Some(block) = reader.next() {
        match block.expect("valid block") {
            Block::SectionHeader(shb) => orders.push(shb.byte_order()),
            Block::InterfaceDescription(idb) => {
                if orders.len() == 2 {
                    assert_eq!(idb.linktype, Linktype::RAW);
                    assert_eq!(idb.snaplen, 1500);
                }
            }
            Block::EnhancedPacket(epb) => payloads.push(epb.data.into_owned()),
            b => panic!("unexpected block {:?}", b),
        }
        if orders.len() == 2 {
            assert_eq!(reader.byte_order(), BE);
            assert!(reader.block_offset() >= second_section);
        }
    }
    assert_eq!(orders, vec![LE, BE]);
    assert_eq!(payloads, vec![vec![1, 2, 3], vec![4, 5, 6, 7, 8]]);
}

#[test]
fn test_length_mismatch_recovery() {
    let mut input = shb(LE, &[]);
    let mut bad = spb(LE, 4, &[1, 2, 3, 4]);
    let end = bad.len();
    bad[end - 4..].copy_from_slice(&24u32.to_le_bytes());
    input.extend(bad);
    input.extend(spb(LE, 2, &[9, 9]));

    let blocks = read_all(&input);
    assert_eq!(blocks.len(), 3);
    match &blocks[1] {
        Err(PcapError::BlockLengthMismatch {
            offset,
            block_type,
            leading,
            trailing,
        }) => {
            assert_eq!(*offset, 28);
            assert_eq!(*block_type, SPB_MAGIC);
            assert_eq!(*leading, 20);
            assert_eq!(*trailing, 24);
        }
        other => panic!("unexpected {:?}", other),
    }
    match &blocks[2] {
        Ok(Block::SimplePacket(spb)) => assert_eq!(spb.packet_data(), &[9, 9]),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_unknown_block_passthrough() {
    let mut input = shb(BE, &[]);
    input.extend(ng_block(BE, 0x8000_0bad, &[1, 2, 3, 4, 5, 6, 7, 8]));
    input.extend(ng_block(BE, 4, &[0, 0, 0, 0]));

    let blocks = read_all(&input);
    assert_eq!(blocks.len(), 3);
    match &blocks[1] {
        Ok(Block::Unknown(ub)) => {
            assert_eq!(ub.block_type, 0x8000_0bad);
            assert_eq!(ub.block_len1, 20);
            assert_eq!(ub.data(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        }
        other => panic!("unexpected {:?}", other),
    }
    // name resolution blocks are not decoded
    match &blocks[2] {
        Ok(block) => assert_eq!(block.block_type(), NRB_MAGIC),
        Err(e) => panic!("unexpected error {}", e),
    }
}

#[test]
fn test_option_overrun_keeps_block() {
    let mut options = ng_option(LE, 1, b"abc");
    // option 1, declared length 200, 4 bytes left in the block
    options.extend_from_slice(&[0x01, 0x00, 0xc8, 0x00, 0xde, 0xad, 0xbe, 0xef]);
    let block = epb(LE, 0, 0, &[1, 2, 3, 4], 4, &options);

    let (rem, block) = parse_block(&block, LE).expect("block");
    assert!(rem.is_empty());
    assert_eq!(block.options().len(), 1);
    assert_eq!(block.options()[0].as_str(), Some("abc"));
    let overrun = block.options_overrun().expect("overrun");
    assert_eq!(
        *overrun,
        OptionOverrun {
            offset: 40,
            code: 1,
            length: 200,
            available: 4,
        }
    );
    match block {
        Block::EnhancedPacket(epb) => assert_eq!(epb.packet_data(), &[1, 2, 3, 4]),
        b => panic!("unexpected block {:?}", b),
    }
}

#[test]
fn test_interface_options() {
    let mut options = ng_option(LE, 2, b"eth0");
    options.extend(ng_option(LE, 9, &[9]));
    options.extend(ng_option(LE, 14, &100i64.to_le_bytes()));
    options.extend(end_of_options());
    let input = idb(LE, 1, 262144, &options);

    let (_, block) = parse_block(&input, LE).expect("IDB");
    let idb = match block {
        Block::InterfaceDescription(idb) => idb,
        b => panic!("unexpected block {:?}", b),
    };
    assert_eq!(idb.if_name(), Some("eth0"));
    assert_eq!(idb.if_tsresol, 9);
    assert_eq!(idb.ts_resolution(), Some(1_000_000_000));
    assert_eq!(idb.ts_offset(), 100);
    let decoded: Vec<_> = idb
        .options
        .iter()
        .map(|o| OptionValue::decode(o, IDB_MAGIC, LE))
        .collect();
    assert_eq!(decoded[0], OptionValue::IfName("eth0"));
    assert_eq!(decoded[1], OptionValue::IfTsresol(9));
    assert_eq!(decoded[2], OptionValue::IfTsoffset(100));
}

#[test]
fn test_interface_statistics() {
    let mut options = ng_option(BE, 4, &1000u64.to_be_bytes());
    options.extend(ng_option(BE, 5, &3u64.to_be_bytes()));
    options.extend(end_of_options());
    let input = isb(BE, 0, 5_000_001, &options);

    let (_, block) = parse_block(&input, BE).expect("ISB");
    let isb = match block {
        Block::InterfaceStatistics(isb) => isb,
        b => panic!("unexpected block {:?}", b),
    };
    assert_eq!(isb.isb_ifrecv(BE), Some(1000));
    assert_eq!(isb.isb_ifdrop(BE), Some(3));
    let ts = isb.decode_ts(0, 1_000_000);
    assert_eq!(ts.secs, 5);
    assert_eq!(ts.fraction, 1);
}

#[test]
fn test_truncated_stream() {
    let mut input = shb(LE, &[]);
    input.extend(spb(LE, 4, &[1, 2, 3, 4]));
    input.truncate(input.len() - 6);

    let blocks = read_all(&input);
    assert_eq!(blocks.len(), 2);
    match &blocks[1] {
        Err(e @ PcapError::TruncatedRecord { .. }) => {
            assert_eq!(e.offset(), 28);
            assert!(e.is_fatal());
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_bogus_length_at_end() {
    let mut input = shb(LE, &[]);
    let mut block = spb(LE, 3, &[1, 2, 3]);
    block[4..8].copy_from_slice(&0x4000_0000u32.to_le_bytes());
    input.extend(block);

    let config = ReaderConfig::default().with_max_record_size(1024);
    let mut reader = PcapNGReader::with_config(config, &input[..]).expect("reader");
    assert!(reader.next().expect("SHB").is_ok());
    assert!(matches!(
        reader.next(),
        Some(Err(PcapError::TruncatedRecord {
            offset: 28,
            expected: 0x4000_0000,
            available: 20
        }))
    ));
    assert!(reader.next().is_none());
}

#[test]
fn test_block_size_limit() {
    let mut input = shb(LE, &[]);
    input.extend(spb(LE, 100, &[0; 100]));
    let config = ReaderConfig::default().with_max_record_size(64);
    let mut reader = PcapNGReader::with_config(config, &input[..]).expect("reader");
    assert!(reader.next().expect("SHB").is_ok());
    assert!(matches!(
        reader.next(),
        Some(Err(PcapError::RecordTooLarge {
            offset: 28,
            length: 116,
            limit: 64
        }))
    ));
    assert!(reader.next().is_none());
}
