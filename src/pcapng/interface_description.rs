use log::warn;

use crate::endianness::PcapEndianness;
use crate::error::{OptionOverrun, PcapError};
use crate::linktype::Linktype;

use super::*;

/// An Interface Description Block (IDB) is the container for information
/// describing an interface on which packet data is captured.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InterfaceDescriptionBlock<'a> {
    pub block_len1: u32,
    pub linktype: Linktype,
    pub reserved: u16,
    pub snaplen: u32,
    pub options: Vec<PcapNGOption<'a>>,
    pub options_overrun: Option<OptionOverrun>,
    pub block_len2: u32,
    /// Raw `if_tsresol` option value (6 if absent)
    pub if_tsresol: u8,
    /// `if_tsoffset` option value, in seconds (0 if absent)
    pub if_tsoffset: i64,
}

impl<'a> InterfaceDescriptionBlock<'a> {
    /// Decode the interface time resolution, in units per second
    ///
    /// Return the resolution, or `None` if the resolution is invalid (for ex. greater than `2^64`)
    #[inline]
    pub fn ts_resolution(&self) -> Option<u64> {
        build_ts_resolution(self.if_tsresol)
    }

    /// Return the interface timestamp offset
    #[inline]
    pub fn ts_offset(&self) -> i64 {
        self.if_tsoffset
    }

    /// Return the `if_name` option value, if present and valid
    ///
    /// If the option is present multiple times, the first value is returned.
    pub fn if_name(&self) -> Option<&str> {
        options_get(&self.options, OptionCode::IfName).and_then(|opt| opt.as_str())
    }

    /// Return the `if_description` option value, if present and valid
    pub fn if_description(&self) -> Option<&str> {
        options_get(&self.options, OptionCode::IfDescription).and_then(|opt| opt.as_str())
    }

    pub fn into_owned(self) -> InterfaceDescriptionBlock<'static> {
        InterfaceDescriptionBlock {
            block_len1: self.block_len1,
            linktype: self.linktype,
            reserved: self.reserved,
            snaplen: self.snaplen,
            options: options_into_owned(self.options),
            options_overrun: self.options_overrun,
            block_len2: self.block_len2,
            if_tsresol: self.if_tsresol,
            if_tsoffset: self.if_tsoffset,
        }
    }
}

fn if_extract_tsoffset_and_tsresol<En: PcapEndianness>(options: &[PcapNGOption]) -> (u8, i64) {
    let mut if_tsresol = DEFAULT_TSRESOL;
    let mut if_tsoffset = 0;
    for opt in options {
        match opt.code {
            OptionCode::IfTsresol => match opt.as_u8() {
                Some(v) => if_tsresol = v,
                None => warn!("ignoring if_tsresol option with invalid length {}", opt.len),
            },
            OptionCode::IfTsoffset => match opt.as_i64(En::BYTE_ORDER) {
                Some(v) => if_tsoffset = v,
                None => warn!("ignoring if_tsoffset option with invalid length {}", opt.len),
            },
            _ => (),
        }
    }
    (if_tsresol, if_tsoffset)
}

impl<'a, En: PcapEndianness> PcapNGBlockParser<'a, En> for InterfaceDescriptionBlock<'a> {
    const HDR_SZ: usize = 20;
    const MAGIC: u32 = IDB_MAGIC;

    fn inner_parse(raw: RawBlock<'a>) -> Result<InterfaceDescriptionBlock<'a>, PcapError> {
        // caller function already tested header type(magic) and length
        let i = raw.body;
        let malformed = |_| PcapError::MalformedBlock {
            offset: 0,
            block_type: IDB_MAGIC,
            reason: "missing interface fields",
        };
        let (i, linktype) = En::parse_u16::<()>(i).map_err(malformed)?;
        let (i, reserved) = En::parse_u16::<()>(i).map_err(malformed)?;
        let (_, snaplen) = En::parse_u32::<()>(i).map_err(malformed)?;
        let (options, options_overrun) = block_options(&raw, En::BYTE_ORDER, 8);
        let (if_tsresol, if_tsoffset) = if_extract_tsoffset_and_tsresol::<En>(&options);
        let block = InterfaceDescriptionBlock {
            block_len1: raw.block_len1,
            linktype: Linktype(u32::from(linktype)),
            reserved,
            snaplen,
            options,
            options_overrun,
            block_len2: raw.block_len2,
            if_tsresol,
            if_tsoffset,
        };
        Ok(block)
    }
}
