//! Variable-length integer codec.
//!
//! Values are written base-128, least significant group first. Each byte
//! carries seven data bits; a set high bit means another byte follows.

use crate::FsaError;

/// Maximum number of bytes a `u32` occupies once encoded.
pub const MAX_VINT_LEN: usize = 5;

/// Appends the encoding of `value` to `out`, returning the number of bytes written.
pub fn encode(mut value: u32, out: &mut Vec<u8>) -> usize {
    let start = out.len();
    while value > 0x7F {
        out.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
    out.len() - start
}

/// Number of bytes `value` occupies once encoded.
pub fn encoded_len(value: u32) -> usize {
    let mut len = 1;
    let mut value = value >> 7;
    while value != 0 {
        len += 1;
        value >>= 7;
    }
    len
}

/// Decodes a value starting at `*pos`, advancing `*pos` past it.
pub fn decode(data: &[u8], pos: &mut usize) -> Result<u32, FsaError> {
    let mut value: u32 = 0;
    let mut shift: u32 = 0;
    loop {
        let Some(&byte) = data.get(*pos) else {
            return Err(FsaError::Truncated { offset: *pos });
        };
        *pos += 1;

        let payload = u32::from(byte & 0x7F);
        if shift == 28 && payload > 0x0F {
            return Err(FsaError::AddressOverflow);
        }
        value |= payload << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
        if shift > 28 {
            return Err(FsaError::AddressOverflow);
        }
    }
}

/// Decodes the value at `offset` of an already validated arc block.
#[inline]
pub(crate) fn read(data: &[u8], mut offset: usize) -> u32 {
    let mut byte = data[offset];
    let mut value = u32::from(byte & 0x7F);
    let mut shift = 7;
    while byte & 0x80 != 0 {
        offset += 1;
        byte = data[offset];
        value |= u32::from(byte & 0x7F) << shift;
        shift += 7;
    }
    value
}

/// Offset of the byte following the value at `offset`.
#[inline]
pub(crate) fn skip(data: &[u8], mut offset: usize) -> usize {
    while data[offset] & 0x80 != 0 {
        offset += 1;
    }
    offset + 1
}
