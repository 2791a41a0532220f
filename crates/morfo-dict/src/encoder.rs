// Stem compression relative to the inflected form.
//
// Each encoded stem starts with one or more code bytes telling how much of
// the inflected form to drop, followed by the bytes to append. Code bytes
// are stored offset by 'A' (wrapping) so that small values stay printable.

use std::fmt;
use std::str::FromStr;

use crate::{DictionaryError, LookupError};

/// Code value meaning "drop the whole inflected form".
pub const REMOVE_EVERYTHING: usize = 255;

const CODE_BASE: u8 = b'A';

/// Strategy used to store a stem relative to its inflected form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SequenceEncoder {
    /// The stem is stored verbatim.
    None,
    /// Drop a suffix of the inflected form, then append.
    #[default]
    TrimSuffix,
    /// Drop a prefix and a suffix of the inflected form, then append.
    TrimPrefixAndSuffix,
    /// Drop an infix (at position 0 or 1) and a suffix, then append.
    TrimInfixAndSuffix,
}

#[inline]
fn code(value: usize) -> u8 {
    (value as u8).wrapping_add(CODE_BASE)
}

#[inline]
fn value(code: u8) -> usize {
    usize::from(code.wrapping_sub(CODE_BASE))
}

fn shared_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn corrupted() -> LookupError {
    LookupError::Corrupted("stem code does not fit the inflected form")
}

impl SequenceEncoder {
    pub const ALL: [SequenceEncoder; 4] = [
        SequenceEncoder::None,
        SequenceEncoder::TrimSuffix,
        SequenceEncoder::TrimPrefixAndSuffix,
        SequenceEncoder::TrimInfixAndSuffix,
    ];

    /// Name used in `.info` metadata.
    pub const fn name(self) -> &'static str {
        match self {
            SequenceEncoder::None => "NONE",
            SequenceEncoder::TrimSuffix => "SUFFIX",
            SequenceEncoder::TrimPrefixAndSuffix => "PREFIX",
            SequenceEncoder::TrimInfixAndSuffix => "INFIX",
        }
    }

    /// Number of leading code bytes in an encoded stem.
    pub const fn prefix_bytes(self) -> usize {
        match self {
            SequenceEncoder::None => 0,
            SequenceEncoder::TrimSuffix => 1,
            SequenceEncoder::TrimPrefixAndSuffix => 2,
            SequenceEncoder::TrimInfixAndSuffix => 3,
        }
    }

    /// Append the encoding of `target` relative to `source` to `out`.
    pub fn encode(self, source: &[u8], target: &[u8], out: &mut Vec<u8>) {
        match self {
            SequenceEncoder::None => out.extend_from_slice(target),
            SequenceEncoder::TrimSuffix => {
                let mut shared = shared_prefix_len(source, target);
                let mut truncate = source.len() - shared;
                if truncate >= REMOVE_EVERYTHING {
                    truncate = REMOVE_EVERYTHING;
                    shared = 0;
                }
                out.push(code(truncate));
                out.extend_from_slice(&target[shared..]);
            }
            SequenceEncoder::TrimPrefixAndSuffix => {
                let mut best_len = 0;
                let mut best_index = 0;
                for i in 0..source.len() {
                    let shared = shared_prefix_len(&source[i..], target);
                    if shared > best_len
                        && i < REMOVE_EVERYTHING
                        && source.len() - (i + shared) < REMOVE_EVERYTHING
                    {
                        best_len = shared;
                        best_index = i;
                    }
                }
                let (prefix, suffix) = if best_len == 0 {
                    (REMOVE_EVERYTHING, REMOVE_EVERYTHING)
                } else {
                    (best_index, source.len() - (best_index + best_len))
                };
                out.push(code(prefix));
                out.push(code(suffix));
                out.extend_from_slice(&target[best_len..]);
            }
            SequenceEncoder::TrimInfixAndSuffix => {
                let mut best_len = shared_prefix_len(source, target);
                let mut infix_index = 0;
                let mut infix_len = 0;
                let mut scratch = Vec::with_capacity(source.len());
                for i in [0, 1] {
                    for j in 1..=source.len() {
                        if i + j > source.len() {
                            continue;
                        }
                        scratch.clear();
                        scratch.extend_from_slice(&source[..i]);
                        scratch.extend_from_slice(&source[i + j..]);
                        let shared = shared_prefix_len(&scratch, target);
                        if shared > 0
                            && shared > best_len
                            && i < REMOVE_EVERYTHING
                            && j < REMOVE_EVERYTHING
                        {
                            best_len = shared;
                            infix_index = i;
                            infix_len = j;
                        }
                    }
                }

                let mut truncate = source.len() - (infix_len + best_len);
                // An infix reaching the end is really a suffix.
                if truncate == 0 && infix_index + infix_len == source.len() {
                    truncate = infix_len;
                    infix_index = 0;
                    infix_len = 0;
                }
                if infix_index >= REMOVE_EVERYTHING
                    || infix_len >= REMOVE_EVERYTHING
                    || truncate >= REMOVE_EVERYTHING
                {
                    infix_index = 0;
                    best_len = 0;
                    infix_len = REMOVE_EVERYTHING;
                    truncate = REMOVE_EVERYTHING;
                }
                out.push(code(infix_index));
                out.push(code(infix_len));
                out.push(code(truncate));
                out.extend_from_slice(&target[best_len..]);
            }
        }
    }

    /// Append the stem reconstructed from `source` and `encoded` to `out`.
    pub fn decode(
        self,
        source: &[u8],
        encoded: &[u8],
        out: &mut Vec<u8>,
    ) -> Result<(), LookupError> {
        let prefix_bytes = self.prefix_bytes();
        if encoded.len() < prefix_bytes {
            return Err(corrupted());
        }
        let tail = &encoded[prefix_bytes..];
        match self {
            SequenceEncoder::None => out.extend_from_slice(encoded),
            SequenceEncoder::TrimSuffix => {
                let mut truncate = value(encoded[0]);
                if truncate == REMOVE_EVERYTHING {
                    truncate = source.len();
                }
                let keep = source.len().checked_sub(truncate).ok_or_else(corrupted)?;
                out.extend_from_slice(&source[..keep]);
                out.extend_from_slice(tail);
            }
            SequenceEncoder::TrimPrefixAndSuffix => {
                let mut prefix = value(encoded[0]);
                let mut suffix = value(encoded[1]);
                if prefix == REMOVE_EVERYTHING || suffix == REMOVE_EVERYTHING {
                    prefix = source.len();
                    suffix = 0;
                }
                let keep = source
                    .len()
                    .checked_sub(prefix + suffix)
                    .ok_or_else(corrupted)?;
                out.extend_from_slice(&source[prefix..prefix + keep]);
                out.extend_from_slice(tail);
            }
            SequenceEncoder::TrimInfixAndSuffix => {
                let mut infix_index = value(encoded[0]);
                let mut infix_len = value(encoded[1]);
                let mut truncate = value(encoded[2]);
                if infix_len == REMOVE_EVERYTHING || truncate == REMOVE_EVERYTHING {
                    infix_index = 0;
                    infix_len = source.len();
                    truncate = 0;
                }
                let keep = source
                    .len()
                    .checked_sub(infix_index + infix_len + truncate)
                    .ok_or_else(corrupted)?;
                let resume = infix_index + infix_len;
                out.extend_from_slice(&source[..infix_index]);
                out.extend_from_slice(&source[resume..resume + keep]);
                out.extend_from_slice(tail);
            }
        }
        Ok(())
    }
}

impl FromStr for SequenceEncoder {
    type Err = DictionaryError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let name = name.trim();
        SequenceEncoder::ALL
            .into_iter()
            .find(|encoder| encoder.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| DictionaryError::InvalidValue {
                key: "fsa.dict.encoder".to_string(),
                value: name.to_string(),
            })
    }
}

impl fmt::Display for SequenceEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
