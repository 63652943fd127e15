use nom::error::ParseError;
use nom::number::streaming::{
    be_i32, be_i64, be_u16, be_u32, be_u64, le_i32, le_i64, le_u16, le_u32, le_u64,
};
use nom::IResult;

/// Byte order of the multi-byte fields of a capture file
///
/// For legacy files, this is fixed by the magic number for the whole file. For pcapng files,
/// this is a property of the current section, and can change at every Section Header Block.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    #[inline]
    pub const fn is_big_endian(self) -> bool {
        matches!(self, ByteOrder::Big)
    }

    #[inline]
    pub fn read_u16(self, b: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Little => u16::from_le_bytes(b),
            ByteOrder::Big => u16::from_be_bytes(b),
        }
    }

    #[inline]
    pub fn read_u32(self, b: [u8; 4]) -> u32 {
        match self {
            ByteOrder::Little => u32::from_le_bytes(b),
            ByteOrder::Big => u32::from_be_bytes(b),
        }
    }

    #[inline]
    pub fn read_i64(self, b: [u8; 8]) -> i64 {
        match self {
            ByteOrder::Little => i64::from_le_bytes(b),
            ByteOrder::Big => i64::from_be_bytes(b),
        }
    }

    #[inline]
    pub fn read_u64(self, b: [u8; 8]) -> u64 {
        match self {
            ByteOrder::Little => u64::from_le_bytes(b),
            ByteOrder::Big => u64::from_be_bytes(b),
        }
    }
}

pub(crate) struct PcapBE;
pub(crate) struct PcapLE;

/// Compile-time selection of the byte order used by the field parsers
pub(crate) trait PcapEndianness {
    const BYTE_ORDER: ByteOrder;

    fn parse_u16<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u16, E>;
    fn parse_u32<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u32, E>;
    fn parse_i32<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], i32, E>;
    fn parse_u64<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u64, E>;
    fn parse_i64<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], i64, E>;
}

impl PcapEndianness for PcapBE {
    const BYTE_ORDER: ByteOrder = ByteOrder::Big;

    #[inline]
    fn parse_u16<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u16, E> {
        be_u16(i)
    }

    #[inline]
    fn parse_u32<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u32, E> {
        be_u32(i)
    }

    #[inline]
    fn parse_i32<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], i32, E> {
        be_i32(i)
    }

    #[inline]
    fn parse_u64<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u64, E> {
        be_u64(i)
    }

    #[inline]
    fn parse_i64<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], i64, E> {
        be_i64(i)
    }
}

impl PcapEndianness for PcapLE {
    const BYTE_ORDER: ByteOrder = ByteOrder::Little;

    #[inline]
    fn parse_u16<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u16, E> {
        le_u16(i)
    }

    #[inline]
    fn parse_u32<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u32, E> {
        le_u32(i)
    }

    #[inline]
    fn parse_i32<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], i32, E> {
        le_i32(i)
    }

    #[inline]
    fn parse_u64<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u64, E> {
        le_u64(i)
    }

    #[inline]
    fn parse_i64<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], i64, E> {
        le_i64(i)
    }
}
