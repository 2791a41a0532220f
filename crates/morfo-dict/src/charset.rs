// Text to byte conversion for dictionary charsets.

use std::fmt;
use std::str::FromStr;

use crate::DictionaryError;

/// Charset the dictionary's byte sequences are encoded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    #[default]
    Utf8,
    /// Latin-1: one byte per character, U+0000..=U+00FF.
    Iso8859_1,
    UsAscii,
}

impl Charset {
    /// Canonical name, as written to `.info` files.
    pub const fn name(self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Iso8859_1 => "ISO-8859-1",
            Charset::UsAscii => "US-ASCII",
        }
    }

    /// Append the encoding of `text` to `out`.
    ///
    /// Returns false, leaving `out` in an unspecified state, if a character
    /// has no representation in this charset.
    pub fn encode(self, text: &str, out: &mut Vec<u8>) -> bool {
        match self {
            Charset::Utf8 => {
                out.extend_from_slice(text.as_bytes());
                true
            }
            Charset::Iso8859_1 => text.chars().all(|c| match u8::try_from(c) {
                Ok(byte) => {
                    out.push(byte);
                    true
                }
                Err(_) => false,
            }),
            Charset::UsAscii => {
                if !text.is_ascii() {
                    return false;
                }
                out.extend_from_slice(text.as_bytes());
                true
            }
        }
    }

    /// Encode `text`, failing on unrepresentable characters.
    pub fn encode_to_vec(self, text: &str) -> Result<Vec<u8>, DictionaryError> {
        let mut out = Vec::with_capacity(text.len());
        if self.encode(text, &mut out) {
            Ok(out)
        } else {
            Err(DictionaryError::Unencodable {
                text: text.to_string(),
                charset: self.name(),
            })
        }
    }

    /// Append the decoding of `bytes` to `out`. Invalid input becomes U+FFFD.
    pub fn decode(self, bytes: &[u8], out: &mut String) {
        match self {
            Charset::Utf8 => out.push_str(&String::from_utf8_lossy(bytes)),
            Charset::Iso8859_1 => out.extend(bytes.iter().map(|&b| char::from(b))),
            Charset::UsAscii => out.extend(bytes.iter().map(|&b| {
                if b.is_ascii() {
                    char::from(b)
                } else {
                    char::REPLACEMENT_CHARACTER
                }
            })),
        }
    }

    /// The single byte `c` encodes to, if any.
    pub fn single_byte(self, c: char) -> Option<u8> {
        let mut buf = Vec::with_capacity(4);
        if self.encode(c.encode_utf8(&mut [0; 4]), &mut buf) && buf.len() == 1 {
            Some(buf[0])
        } else {
            None
        }
    }
}

impl FromStr for Charset {
    type Err = DictionaryError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_uppercase().replace('_', "-").as_str() {
            "UTF-8" | "UTF8" => Ok(Charset::Utf8),
            "ISO-8859-1" | "ISO8859-1" | "LATIN1" | "LATIN-1" => Ok(Charset::Iso8859_1),
            "US-ASCII" | "ASCII" => Ok(Charset::UsAscii),
            _ => Err(DictionaryError::UnsupportedCharset(name.to_string())),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
