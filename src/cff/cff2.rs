//! CFF2 font handling.
//!
//! Refer to [OpenType CFF2 spec](https://learn.microsoft.com/en-us/typography/opentype/spec/cff2)
//! for more information.
//!
//! CFF2 tables are recognised but not parsed. Reading one validates the header and then fails
//! with [CFFError::UnsupportedVersion].

use log::warn;

use crate::binary::read::{ReadBinary, ReadCtxt, ReadScope};
use crate::error::ParseError;

use super::{CFFError, FontSet};

/// CFF2 Header
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub major: u8,
    pub minor: u8,
    pub header_size: u8,
    pub top_dict_length: u16,
}

impl Header {
    const SIZE: u8 = 1 + 1 + 1 + 2;
}

impl ReadBinary for Header {
    type HostType<'b> = Self;

    fn read(ctxt: &mut ReadCtxt<'_>) -> Result<Self, ParseError> {
        let major = ctxt.read_u8()?;
        ctxt.check(major == 2)?;
        let minor = ctxt.read_u8()?;
        let header_size = ctxt.read_u8()?;
        let top_dict_length = ctxt.read_u16be()?;

        if header_size < Header::SIZE {
            return Err(ParseError::BadValue);
        }

        // Skip any unknown data
        let _unknown = ctxt.read_slice(usize::from(header_size - Header::SIZE))?;

        Ok(Header {
            major,
            minor,
            header_size,
            top_dict_length,
        })
    }
}

pub(super) fn read_cff2<'a>(scope: ReadScope<'a>) -> Result<FontSet<'a>, CFFError> {
    let header = scope.read::<Header>()?;
    warn!(
        "CFF2 table version {}.{} is not supported",
        header.major, header.minor
    );
    Err(CFFError::UnsupportedVersion(header.major))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cff2_is_unsupported() {
        let data = [2, 0, 5, 0, 0];
        let header = ReadScope::new(&data).read::<Header>().unwrap();
        assert_eq!(header.top_dict_length, 0);
        assert!(matches!(
            FontSet::read(ReadScope::new(&data)),
            Err(CFFError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn truncated_cff2_header() {
        let data = [2, 0, 5];
        assert!(matches!(
            FontSet::read(ReadScope::new(&data)),
            Err(CFFError::ParseError(ParseError::BadEof))
        ));
    }

    #[test]
    fn short_cff2_header_size() {
        let data = [2, 0, 4, 0, 0];
        assert!(matches!(
            FontSet::read(ReadScope::new(&data)),
            Err(CFFError::ParseError(ParseError::BadValue))
        ));
    }
}
