// Automaton stream header: magic and version byte.

use std::io::Write;

use crate::FsaError;

/// Magic tag opening every serialized automaton: `\fsa`.
pub const MAGIC: [u8; 4] = *b"\\fsa";

/// Size of the common header (magic + version byte).
pub const HEADER_SIZE: usize = 5;

/// Version byte of the plain (fixed-width goto) format.
pub const PLAIN_VERSION: u8 = 5;

/// Version byte of the compact (v-int, label table) format.
pub const COMPACT_VERSION: u8 = 0xC6;

/// Concrete layout selected by the header's version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsaVersion {
    Plain,
    Compact,
}

impl FsaVersion {
    pub fn from_byte(version: u8) -> Result<Self, FsaError> {
        match version {
            PLAIN_VERSION => Ok(FsaVersion::Plain),
            COMPACT_VERSION => Ok(FsaVersion::Compact),
            other => Err(FsaError::UnsupportedVersion(other)),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            FsaVersion::Plain => PLAIN_VERSION,
            FsaVersion::Compact => COMPACT_VERSION,
        }
    }
}

/// Parses and validates the common header.
///
/// Returns the format version; format-specific metadata starts at
/// [`HEADER_SIZE`].
pub fn parse_header(data: &[u8]) -> Result<FsaVersion, FsaError> {
    if data.len() < HEADER_SIZE {
        return Err(FsaError::TooShort {
            expected: HEADER_SIZE,
            actual: data.len(),
        });
    }
    if data[..4] != MAGIC {
        return Err(FsaError::InvalidMagic);
    }
    FsaVersion::from_byte(data[4])
}

/// Writes the common header for `version`.
pub fn write_header<W: Write>(out: &mut W, version: FsaVersion) -> Result<(), FsaError> {
    out.write_all(&MAGIC)?;
    out.write_all(&[version.as_byte()])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_header(version: u8) -> Vec<u8> {
        let mut buf = MAGIC.to_vec();
        buf.push(version);
        buf
    }

    #[test]
    fn parse_plain_header() {
        let data = make_header(PLAIN_VERSION);
        assert_eq!(parse_header(&data).unwrap(), FsaVersion::Plain);
    }

    #[test]
    fn parse_compact_header() {
        let data = make_header(COMPACT_VERSION);
        assert_eq!(parse_header(&data).unwrap(), FsaVersion::Compact);
    }

    #[test]
    fn reject_too_short() {
        let err = parse_header(b"\\fs").unwrap_err();
        assert!(matches!(
            err,
            FsaError::TooShort {
                expected: 5,
                actual: 3
            }
        ));
    }

    #[test]
    fn reject_invalid_magic() {
        let mut data = make_header(PLAIN_VERSION);
        data[1] = b'F';
        assert!(matches!(parse_header(&data), Err(FsaError::InvalidMagic)));
    }

    #[test]
    fn reject_unknown_version() {
        let data = make_header(0x42);
        assert!(matches!(
            parse_header(&data),
            Err(FsaError::UnsupportedVersion(0x42))
        ));
    }

    #[test]
    fn write_then_parse() {
        let mut buf = Vec::new();
        write_header(&mut buf, FsaVersion::Compact).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE);
        assert_eq!(parse_header(&buf).unwrap(), FsaVersion::Compact);
    }

    #[test]
    fn header_with_trailing_data() {
        let mut data = make_header(PLAIN_VERSION);
        data.extend_from_slice(&[0u8; 32]);
        assert_eq!(parse_header(&data).unwrap(), FsaVersion::Plain);
    }
}
