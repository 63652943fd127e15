use std::borrow::Cow;
use std::convert::TryFrom;
use std::iter::FusedIterator;
use std::net::Ipv4Addr;

use nom::bytes::streaming::take;
use nom::error::ParseError;
use nom::IResult;
use rusticata_macros::{align32, newtype_enum};

use crate::endianness::{ByteOrder, PcapBE, PcapEndianness, PcapLE};
use crate::error::OptionOverrun;

use super::{EPB_MAGIC, IDB_MAGIC, ISB_MAGIC, SHB_MAGIC};

/// Option code
///
/// Codes 0, 1 and the custom codes have the same meaning in all blocks. Other codes depend on the
/// type of the block containing the option: for ex. code 2 is `shb_hardware` in a Section Header
/// Block, and `if_name` in an Interface Description Block.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct OptionCode(pub u16);

newtype_enum! {
impl debug OptionCode {
    EndOfOpt = 0,
    Comment = 1,
    Custom2988 = 2988,
    Custom2989 = 2989,
    Custom19372 = 19372,
    Custom19373 = 19373,
}
}

#[allow(non_upper_case_globals)]
impl OptionCode {
    pub const ShbHardware: OptionCode = OptionCode(2);
    pub const ShbOs: OptionCode = OptionCode(3);
    pub const ShbUserAppl: OptionCode = OptionCode(4);

    pub const IfName: OptionCode = OptionCode(2);
    pub const IfDescription: OptionCode = OptionCode(3);
    pub const IfIpv4Addr: OptionCode = OptionCode(4);
    pub const IfIpv6Addr: OptionCode = OptionCode(5);
    pub const IfMacAddr: OptionCode = OptionCode(6);
    pub const IfEuiAddr: OptionCode = OptionCode(7);
    pub const IfSpeed: OptionCode = OptionCode(8);
    pub const IfTsresol: OptionCode = OptionCode(9);
    pub const IfTzone: OptionCode = OptionCode(10);
    pub const IfFilter: OptionCode = OptionCode(11);
    pub const IfOs: OptionCode = OptionCode(12);
    pub const IfFcslen: OptionCode = OptionCode(13);
    pub const IfTsoffset: OptionCode = OptionCode(14);
    pub const IfHardware: OptionCode = OptionCode(15);

    pub const EpbFlags: OptionCode = OptionCode(2);
    pub const EpbHash: OptionCode = OptionCode(3);
    pub const EpbDropCount: OptionCode = OptionCode(4);
    pub const EpbPacketId: OptionCode = OptionCode(5);
    pub const EpbQueue: OptionCode = OptionCode(6);

    pub const IsbStartTime: OptionCode = OptionCode(2);
    pub const IsbEndTime: OptionCode = OptionCode(3);
    pub const IsbIfRecv: OptionCode = OptionCode(4);
    pub const IsbIfDrop: OptionCode = OptionCode(5);
    pub const IsbFilterAccept: OptionCode = OptionCode(6);
    pub const IsbOsDrop: OptionCode = OptionCode(7);
    pub const IsbUsrDeliv: OptionCode = OptionCode(8);
}

/// A block option (type-length-value)
///
/// `value` holds exactly `len` bytes: the padding to the next 4-bytes boundary is not included.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PcapNGOption<'a> {
    pub code: OptionCode,
    pub len: u16,
    pub value: Cow<'a, [u8]>,
}

impl<'a> PcapNGOption<'a> {
    /// Return a reference to the option value, as raw bytes
    #[inline]
    pub fn value(&self) -> &[u8] {
        self.value.as_ref()
    }

    /// Return the option value interpreted as UTF-8 string, or None
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.value()).ok()
    }

    /// Return the option value interpreted as u8, or None
    ///
    /// Option data length must be exactly 1 byte
    pub fn as_u8(&self) -> Option<u8> {
        match self.value() {
            &[b] => Some(b),
            _ => None,
        }
    }

    /// Return the option value interpreted as u32, or None
    ///
    /// Option data length must be exactly 4 bytes
    pub fn as_u32(&self, byte_order: ByteOrder) -> Option<u32> {
        <[u8; 4]>::try_from(self.value())
            .ok()
            .map(|b| byte_order.read_u32(b))
    }

    /// Return the option value interpreted as i64, or None
    ///
    /// Option data length must be exactly 8 bytes
    pub fn as_i64(&self, byte_order: ByteOrder) -> Option<i64> {
        <[u8; 8]>::try_from(self.value())
            .ok()
            .map(|b| byte_order.read_i64(b))
    }

    /// Return the option value interpreted as u64, or None
    ///
    /// Option data length must be exactly 8 bytes
    pub fn as_u64(&self, byte_order: ByteOrder) -> Option<u64> {
        <[u8; 8]>::try_from(self.value())
            .ok()
            .map(|b| byte_order.read_u64(b))
    }

    pub fn into_owned(self) -> PcapNGOption<'static> {
        PcapNGOption {
            code: self.code,
            len: self.len,
            value: Cow::Owned(self.value.into_owned()),
        }
    }
}

/// Decoded value of an option
///
/// Recognized codes are decoded according to the type of the block containing the option.
/// Unknown codes, and values that do not have the expected size or encoding, are returned as
/// `Raw`.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue<'a> {
    Comment(&'a str),
    /// Custom option: Private Enterprise Number, and data. `copyable` is false for the codes
    /// that should not be copied to a new file.
    Custom {
        pen: u32,
        data: &'a [u8],
        copyable: bool,
    },

    ShbHardware(&'a str),
    ShbOs(&'a str),
    ShbUserAppl(&'a str),

    IfName(&'a str),
    IfDescription(&'a str),
    /// Address and netmask
    IfIpv4Addr(Ipv4Addr, Ipv4Addr),
    IfMacAddr([u8; 6]),
    IfSpeed(u64),
    IfTsresol(u8),
    IfFilter(&'a [u8]),
    IfOs(&'a str),
    IfFcslen(u8),
    IfTsoffset(i64),
    IfHardware(&'a str),

    EpbFlags(u32),
    EpbHash(&'a [u8]),
    EpbDropCount(u64),
    EpbPacketId(u64),
    EpbQueue(u32),

    /// Raw timestamp (high and low 32-bits parts)
    IsbStartTime(u32, u32),
    IsbEndTime(u32, u32),
    IsbIfRecv(u64),
    IsbIfDrop(u64),
    IsbFilterAccept(u64),
    IsbOsDrop(u64),
    IsbUsrDeliv(u64),

    Raw { code: OptionCode, value: &'a [u8] },
}

impl<'a> OptionValue<'a> {
    /// Decode `option`, found in a block of type `block_type` encoded using `byte_order`
    pub fn decode(option: &'a PcapNGOption, block_type: u32, byte_order: ByteOrder) -> Self {
        Self::try_decode(option, block_type, byte_order).unwrap_or(OptionValue::Raw {
            code: option.code,
            value: option.value(),
        })
    }

    fn try_decode(
        option: &'a PcapNGOption,
        block_type: u32,
        byte_order: ByteOrder,
    ) -> Option<Self> {
        let value = option.value();
        let str_value = || std::str::from_utf8(value).ok();
        let ts_value = || {
            let high = byte_order.read_u32(<[u8; 4]>::try_from(value.get(..4)?).ok()?);
            let low = byte_order.read_u32(<[u8; 4]>::try_from(value.get(4..)?).ok()?);
            Some((high, low))
        };
        let decoded = match (option.code, block_type) {
            (OptionCode::Comment, _) => OptionValue::Comment(str_value()?),
            (OptionCode::Custom2988, _)
            | (OptionCode::Custom2989, _)
            | (OptionCode::Custom19372, _)
            | (OptionCode::Custom19373, _) => {
                let pen = byte_order.read_u32(<[u8; 4]>::try_from(value.get(..4)?).ok()?);
                OptionValue::Custom {
                    pen,
                    data: &value[4..],
                    copyable: matches!(option.code.0, 2988 | 19372),
                }
            }

            (OptionCode::ShbHardware, SHB_MAGIC) => OptionValue::ShbHardware(str_value()?),
            (OptionCode::ShbOs, SHB_MAGIC) => OptionValue::ShbOs(str_value()?),
            (OptionCode::ShbUserAppl, SHB_MAGIC) => OptionValue::ShbUserAppl(str_value()?),

            (OptionCode::IfName, IDB_MAGIC) => OptionValue::IfName(str_value()?),
            (OptionCode::IfDescription, IDB_MAGIC) => OptionValue::IfDescription(str_value()?),
            (OptionCode::IfIpv4Addr, IDB_MAGIC) => match value {
                &[a, b, c, d, m1, m2, m3, m4] => OptionValue::IfIpv4Addr(
                    Ipv4Addr::new(a, b, c, d),
                    Ipv4Addr::new(m1, m2, m3, m4),
                ),
                _ => return None,
            },
            (OptionCode::IfMacAddr, IDB_MAGIC) => {
                OptionValue::IfMacAddr(<[u8; 6]>::try_from(value).ok()?)
            }
            (OptionCode::IfSpeed, IDB_MAGIC) => OptionValue::IfSpeed(option.as_u64(byte_order)?),
            (OptionCode::IfTsresol, IDB_MAGIC) => OptionValue::IfTsresol(option.as_u8()?),
            (OptionCode::IfFilter, IDB_MAGIC) => OptionValue::IfFilter(value),
            (OptionCode::IfOs, IDB_MAGIC) => OptionValue::IfOs(str_value()?),
            (OptionCode::IfFcslen, IDB_MAGIC) => OptionValue::IfFcslen(option.as_u8()?),
            (OptionCode::IfTsoffset, IDB_MAGIC) => {
                OptionValue::IfTsoffset(option.as_i64(byte_order)?)
            }
            (OptionCode::IfHardware, IDB_MAGIC) => OptionValue::IfHardware(str_value()?),

            (OptionCode::EpbFlags, EPB_MAGIC) => OptionValue::EpbFlags(option.as_u32(byte_order)?),
            (OptionCode::EpbHash, EPB_MAGIC) => OptionValue::EpbHash(value),
            (OptionCode::EpbDropCount, EPB_MAGIC) => {
                OptionValue::EpbDropCount(option.as_u64(byte_order)?)
            }
            (OptionCode::EpbPacketId, EPB_MAGIC) => {
                OptionValue::EpbPacketId(option.as_u64(byte_order)?)
            }
            (OptionCode::EpbQueue, EPB_MAGIC) => OptionValue::EpbQueue(option.as_u32(byte_order)?),

            (OptionCode::IsbStartTime, ISB_MAGIC) => {
                let (high, low) = ts_value()?;
                OptionValue::IsbStartTime(high, low)
            }
            (OptionCode::IsbEndTime, ISB_MAGIC) => {
                let (high, low) = ts_value()?;
                OptionValue::IsbEndTime(high, low)
            }
            (OptionCode::IsbIfRecv, ISB_MAGIC) => OptionValue::IsbIfRecv(option.as_u64(byte_order)?),
            (OptionCode::IsbIfDrop, ISB_MAGIC) => OptionValue::IsbIfDrop(option.as_u64(byte_order)?),
            (OptionCode::IsbFilterAccept, ISB_MAGIC) => {
                OptionValue::IsbFilterAccept(option.as_u64(byte_order)?)
            }
            (OptionCode::IsbOsDrop, ISB_MAGIC) => OptionValue::IsbOsDrop(option.as_u64(byte_order)?),
            (OptionCode::IsbUsrDeliv, ISB_MAGIC) => {
                OptionValue::IsbUsrDeliv(option.as_u64(byte_order)?)
            }

            _ => return None,
        };
        Some(decoded)
    }
}

/// Parse a pcap-ng Option (little-endian)
#[inline]
pub fn parse_option_le<'i, E: ParseError<&'i [u8]>>(
    i: &'i [u8],
) -> IResult<&'i [u8], PcapNGOption, E> {
    parse_option::<PcapLE, E>(i)
}

/// Parse a pcap-ng Option (big-endian)
#[inline]
pub fn parse_option_be<'i, E: ParseError<&'i [u8]>>(
    i: &'i [u8],
) -> IResult<&'i [u8], PcapNGOption, E> {
    parse_option::<PcapBE, E>(i)
}

pub(crate) fn parse_option<'i, En: PcapEndianness, E: ParseError<&'i [u8]>>(
    i: &'i [u8],
) -> IResult<&'i [u8], PcapNGOption, E> {
    let (i, code) = En::parse_u16(i)?;
    let (i, len) = En::parse_u16(i)?;
    let (i, value) = take(len as usize)(i)?;
    // the padding of the last option may be missing
    let padding = (align32!(len as u32) - len as u32) as usize;
    let (i, _) = take(padding.min(i.len()))(i)?;
    let option = PcapNGOption {
        code: OptionCode(code),
        len,
        value: Cow::Borrowed(value),
    };
    Ok((i, option))
}

/// Iterator over the options of a block
///
/// The iterator stops after the end-of-options marker (which is not returned), at the end of the
/// data, or after returning an error for an option running past the end of the data.
///
/// The iterator is lazy, and can be restarted by cloning it before use.
#[derive(Clone, Debug)]
pub struct OptionIter<'a> {
    data: &'a [u8],
    byte_order: ByteOrder,
    offset: u64,
    done: bool,
}

impl<'a> OptionIter<'a> {
    /// Offset of the next option, relative to the start of the options (or to the base offset)
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn overrun(&self) -> OptionOverrun {
        let data = self.data;
        let code = match data {
            &[a, b, ..] => self.byte_order.read_u16([a, b]),
            _ => 0,
        };
        let length = match data {
            &[_, _, a, b, ..] => self.byte_order.read_u16([a, b]),
            _ => 0,
        };
        OptionOverrun {
            offset: self.offset,
            code,
            length,
            available: data.len().saturating_sub(4),
        }
    }
}

impl<'a> Iterator for OptionIter<'a> {
    type Item = Result<PcapNGOption<'a>, OptionOverrun>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.data.is_empty() {
            return None;
        }
        let res = match self.byte_order {
            ByteOrder::Little => parse_option::<PcapLE, ()>(self.data),
            ByteOrder::Big => parse_option::<PcapBE, ()>(self.data),
        };
        match res {
            Ok((rem, option)) => {
                if option.code == OptionCode::EndOfOpt {
                    self.done = true;
                    return None;
                }
                self.offset += (self.data.len() - rem.len()) as u64;
                self.data = rem;
                Some(Ok(option))
            }
            Err(_) => {
                self.done = true;
                Some(Err(self.overrun()))
            }
        }
    }
}

impl<'a> FusedIterator for OptionIter<'a> {}

/// Iterate over the options stored in `data` (the end of a block body)
pub fn parse_options(data: &[u8], byte_order: ByteOrder) -> OptionIter {
    parse_options_at(data, byte_order, 0)
}

/// Same as [`parse_options`], with offsets reported relative to `base_offset`
pub(crate) fn parse_options_at(data: &[u8], byte_order: ByteOrder, base_offset: u64) -> OptionIter {
    OptionIter {
        data,
        byte_order,
        offset: base_offset,
        done: false,
    }
}

/// Read all options, keeping the ones decoded before an overrun
pub(crate) fn collect_options(
    data: &[u8],
    byte_order: ByteOrder,
    base_offset: u64,
) -> (Vec<PcapNGOption>, Option<OptionOverrun>) {
    let mut options = Vec::new();
    for item in parse_options_at(data, byte_order, base_offset) {
        match item {
            Ok(option) => options.push(option),
            Err(overrun) => return (options, Some(overrun)),
        }
    }
    (options, None)
}

pub(crate) fn options_into_owned(options: Vec<PcapNGOption>) -> Vec<PcapNGOption<'static>> {
    options.into_iter().map(PcapNGOption::into_owned).collect()
}

/// Return the first option with the given code
pub(crate) fn options_get<'a, 'o>(
    options: &'o [PcapNGOption<'a>],
    code: OptionCode,
) -> Option<&'o PcapNGOption<'a>> {
    options.iter().find(|opt| opt.code == code)
}
