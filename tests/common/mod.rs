//! Builders for synthetic capture files
#![allow(dead_code)]

use capture_parser::ByteOrder;

fn u16_bytes(order: ByteOrder, v: u16) -> [u8; 2] {
    match order {
        ByteOrder::Little => v.to_le_bytes(),
        ByteOrder::Big => v.to_be_bytes(),
    }
}

fn u32_bytes(order: ByteOrder, v: u32) -> [u8; 4] {
    match order {
        ByteOrder::Little => v.to_le_bytes(),
        ByteOrder::Big => v.to_be_bytes(),
    }
}

fn pad4(v: &mut Vec<u8>) {
    while v.len() % 4 != 0 {
        v.push(0);
    }
}

/// Legacy global header, version 2.4
pub fn pcap_header(order: ByteOrder, magic: u32, snaplen: u32, linktype: u32) -> Vec<u8> {
    let mut v = Vec::with_capacity(24);
    v.extend_from_slice(&u32_bytes(order, magic));
    v.extend_from_slice(&u16_bytes(order, 2));
    v.extend_from_slice(&u16_bytes(order, 4));
    v.extend_from_slice(&[0; 8]);
    v.extend_from_slice(&u32_bytes(order, snaplen));
    v.extend_from_slice(&u32_bytes(order, linktype));
    v
}

/// Legacy record, caplen is the length of `data`
pub fn pcap_record(order: ByteOrder, ts_sec: u32, ts_frac: u32, data: &[u8], origlen: u32) -> Vec<u8> {
    let mut v = Vec::with_capacity(16 + data.len());
    v.extend_from_slice(&u32_bytes(order, ts_sec));
    v.extend_from_slice(&u32_bytes(order, ts_frac));
    v.extend_from_slice(&u32_bytes(order, data.len() as u32));
    v.extend_from_slice(&u32_bytes(order, origlen));
    v.extend_from_slice(data);
    v
}

/// Legacy record in the "modified" layout
pub fn pcap_record_modified(
    order: ByteOrder,
    ts_sec: u32,
    data: &[u8],
    if_index: u32,
    protocol: u16,
    pkt_type: u8,
) -> Vec<u8> {
    let mut v = Vec::with_capacity(24 + data.len());
    v.extend_from_slice(&u32_bytes(order, ts_sec));
    v.extend_from_slice(&u32_bytes(order, 0));
    v.extend_from_slice(&u32_bytes(order, data.len() as u32));
    v.extend_from_slice(&u32_bytes(order, data.len() as u32));
    v.extend_from_slice(&u32_bytes(order, if_index));
    v.extend_from_slice(&u16_bytes(order, protocol));
    v.push(pkt_type);
    v.push(0);
    v.extend_from_slice(data);
    v
}

/// Option with its padding
pub fn ng_option(order: ByteOrder, code: u16, value: &[u8]) -> Vec<u8> {
    let mut v = Vec::with_capacity(8 + value.len());
    v.extend_from_slice(&u16_bytes(order, code));
    v.extend_from_slice(&u16_bytes(order, value.len() as u16));
    v.extend_from_slice(value);
    pad4(&mut v);
    v
}

pub fn end_of_options() -> Vec<u8> {
    vec![0; 4]
}

/// Frame `body` (padded to 4 bytes) with the block type and both lengths
pub fn ng_block(order: ByteOrder, block_type: u32, body: &[u8]) -> Vec<u8> {
    let mut padded = body.to_vec();
    pad4(&mut padded);
    let len = (padded.len() + 12) as u32;
    let mut v = Vec::with_capacity(len as usize);
    v.extend_from_slice(&u32_bytes(order, block_type));
    v.extend_from_slice(&u32_bytes(order, len));
    v.extend_from_slice(&padded);
    v.extend_from_slice(&u32_bytes(order, len));
    v
}

pub fn shb(order: ByteOrder, options: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&u32_bytes(order, 0x1a2b_3c4d));
    body.extend_from_slice(&u16_bytes(order, 1));
    body.extend_from_slice(&u16_bytes(order, 0));
    body.extend_from_slice(&[0xff; 8]);
    body.extend_from_slice(options);
    ng_block(order, 0x0a0d_0d0a, &body)
}

pub fn idb(order: ByteOrder, linktype: u16, snaplen: u32, options: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&u16_bytes(order, linktype));
    body.extend_from_slice(&u16_bytes(order, 0));
    body.extend_from_slice(&u32_bytes(order, snaplen));
    body.extend_from_slice(options);
    ng_block(order, 1, &body)
}

pub fn epb(order: ByteOrder, if_id: u32, ts: u64, data: &[u8], origlen: u32, options: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&u32_bytes(order, if_id));
    body.extend_from_slice(&u32_bytes(order, (ts >> 32) as u32));
    body.extend_from_slice(&u32_bytes(order, ts as u32));
    body.extend_from_slice(&u32_bytes(order, data.len() as u32));
    body.extend_from_slice(&u32_bytes(order, origlen));
    body.extend_from_slice(data);
    pad4(&mut body);
    body.extend_from_slice(options);
    ng_block(order, 6, &body)
}

pub fn spb(order: ByteOrder, origlen: u32, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&u32_bytes(order, origlen));
    body.extend_from_slice(data);
    ng_block(order, 3, &body)
}

pub fn isb(order: ByteOrder, if_id: u32, ts: u64, options: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&u32_bytes(order, if_id));
    body.extend_from_slice(&u32_bytes(order, (ts >> 32) as u32));
    body.extend_from_slice(&u32_bytes(order, ts as u32));
    body.extend_from_slice(options);
    ng_block(order, 5, &body)
}
