// Plain automaton format: fixed-width goto fields.
//
// Arc layout: one label byte, then either a single flags byte (when the
// target immediately follows the arc's state) or a `goto_length`-byte
// little-endian field whose low three bits are flags and whose remaining
// bits are the target address. With NUMBERS, every state starts with a
// `node_data_length`-byte little-endian right-language count.

use crate::format::{self, FsaVersion, HEADER_SIZE};
use crate::{Automaton, FsaError, FsaFlag, FsaFlags};

/// A sequence ending with this arc is accepted.
pub const BIT_FINAL_ARC: u8 = 1 << 0;

/// The arc is the last one of its state.
pub const BIT_LAST_ARC: u8 = 1 << 1;

/// The target state immediately follows the arc's state; no address is stored.
pub const BIT_TARGET_NEXT: u8 = 1 << 2;

/// Number of flag bits packed below the address.
pub(crate) const FLAG_BITS: u32 = 3;

/// Offset of the flags/goto field within an arc.
const ADDRESS_OFFSET: usize = 1;

/// Default filler byte of dictionaries in this format.
pub const DEFAULT_FILLER: u8 = b'_';

/// Default annotation (separator) byte of dictionaries in this format.
pub const DEFAULT_ANNOTATION: u8 = b'+';

/// Size of the format-specific header following the common header.
pub const PLAIN_HEADER_SIZE: usize = 3;

/// Automaton in the plain format.
pub struct PlainFsa {
    arcs: Vec<u8>,
    node_data_length: usize,
    goto_length: usize,
    filler: u8,
    annotation: u8,
    flags: FsaFlags,
    root: usize,
}

impl std::fmt::Debug for PlainFsa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlainFsa")
            .field("bytes", &self.arcs.len())
            .field("node_data_length", &self.node_data_length)
            .field("goto_length", &self.goto_length)
            .field("flags", &self.flags)
            .field("root", &self.root)
            .finish()
    }
}

impl PlainFsa {
    /// Load a plain-format automaton from a complete serialized stream.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FsaError> {
        match format::parse_header(data)? {
            FsaVersion::Plain => Self::from_body(&data[HEADER_SIZE..]),
            other => Err(FsaError::UnsupportedVersion(other.as_byte())),
        }
    }

    /// Load from the bytes following the common header.
    pub(crate) fn from_body(body: &[u8]) -> Result<Self, FsaError> {
        if body.len() < PLAIN_HEADER_SIZE {
            return Err(FsaError::TooShort {
                expected: HEADER_SIZE + PLAIN_HEADER_SIZE,
                actual: HEADER_SIZE + body.len(),
            });
        }
        let filler = body[0];
        let annotation = body[1];
        let node_data_length = usize::from(body[2] >> 4);
        let goto_length = usize::from(body[2] & 0x0F);
        if goto_length == 0 {
            return Err(FsaError::InvalidHeader("goto field width is zero"));
        }

        let mut flags = FsaFlags::standard();
        if node_data_length > 0 {
            flags.insert(FsaFlag::Numbers);
        }

        let mut fsa = Self {
            arcs: body[PLAIN_HEADER_SIZE..].to_vec(),
            node_data_length,
            goto_length,
            filler,
            annotation,
            flags,
            root: 0,
        };
        fsa.root = fsa.resolve_root()?;
        Ok(fsa)
    }

    /// Follow the epsilon state, which sits right after the dummy terminal
    /// state at offset 0.
    fn resolve_root(&self) -> Result<usize, FsaError> {
        let dummy_arc = self.node_data_length;
        self.check_arc(dummy_arc)?;
        let epsilon_arc = self.skip_arc(dummy_arc) + self.node_data_length;
        self.check_arc(epsilon_arc)?;
        // Root 0 is the empty automaton.
        let root = self.destination(epsilon_arc);
        if root != 0 {
            self.check_arc(root + self.node_data_length)?;
        }
        Ok(root)
    }

    fn check_arc(&self, arc: usize) -> Result<(), FsaError> {
        let end = match self.arcs.get(arc + ADDRESS_OFFSET) {
            Some(&flags) if flags & BIT_TARGET_NEXT != 0 => arc + 2,
            Some(_) => arc + 1 + self.goto_length,
            None => arc + 2,
        };
        if end > self.arcs.len() {
            return Err(FsaError::Truncated { offset: arc });
        }
        Ok(())
    }

    /// The arc block (states only, no header).
    pub fn as_bytes(&self) -> &[u8] {
        &self.arcs
    }

    pub fn filler(&self) -> u8 {
        self.filler
    }

    pub fn annotation(&self) -> u8 {
        self.annotation
    }

    /// Width of the per-state right-language count field.
    pub fn node_data_length(&self) -> usize {
        self.node_data_length
    }

    /// Width of an explicit goto field, flag bits included.
    pub fn goto_length(&self) -> usize {
        self.goto_length
    }

    #[inline]
    fn arc_flags(&self, arc: usize) -> u8 {
        self.arcs[arc + ADDRESS_OFFSET]
    }

    #[inline]
    fn is_next_set(&self, arc: usize) -> bool {
        self.arc_flags(arc) & BIT_TARGET_NEXT != 0
    }

    #[inline]
    fn is_arc_last(&self, arc: usize) -> bool {
        self.arc_flags(arc) & BIT_LAST_ARC != 0
    }

    #[inline]
    fn skip_arc(&self, arc: usize) -> usize {
        arc + 1
            + if self.is_next_set(arc) {
                1
            } else {
                self.goto_length
            }
    }

    fn destination(&self, mut arc: usize) -> usize {
        if self.is_next_set(arc) {
            while !self.is_arc_last(arc) {
                arc = self.skip_arc(arc);
            }
            self.skip_arc(arc)
        } else {
            let address = decode_le(&self.arcs[arc + ADDRESS_OFFSET..], self.goto_length);
            (address >> FLAG_BITS) as usize
        }
    }
}

/// Decodes an `n`-byte little-endian unsigned integer.
#[inline]
pub(crate) fn decode_le(data: &[u8], n: usize) -> u64 {
    data[..n]
        .iter()
        .rev()
        .fold(0u64, |acc, &b| acc << 8 | u64::from(b))
}

impl Automaton for PlainFsa {
    fn root_node(&self) -> usize {
        self.root
    }

    fn first_arc(&self, node: usize) -> usize {
        node + self.node_data_length
    }

    fn next_arc(&self, arc: usize) -> usize {
        if self.is_arc_last(arc) {
            0
        } else {
            self.skip_arc(arc)
        }
    }

    fn arc_label(&self, arc: usize) -> u8 {
        self.arcs[arc]
    }

    fn is_arc_final(&self, arc: usize) -> bool {
        self.arc_flags(arc) & BIT_FINAL_ARC != 0
    }

    fn is_arc_terminal(&self, arc: usize) -> bool {
        self.destination(arc) == 0
    }

    fn end_node(&self, arc: usize) -> usize {
        let node = self.destination(arc);
        debug_assert_ne!(node, 0, "terminal arcs have no end node");
        node
    }

    fn flags(&self) -> FsaFlags {
        self.flags
    }

    fn right_language_count(&self, node: usize) -> Result<u32, FsaError> {
        if !self.flags.contains(FsaFlag::Numbers) {
            return Err(FsaError::NumbersUnsupported);
        }
        Ok(decode_le(&self.arcs[node..], self.node_data_length) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{MAGIC, PLAIN_VERSION};

    /// Plain stream with goto width 1 and no numbers accepting "ab" and "b".
    ///
    /// Layout (arc block offsets):
    ///  0: dummy  [0x00, LAST]
    ///  2: epsilon ['^', LAST | NEXT]          -> root at 4
    ///  4: root   ['a', NEXT]                  -> s1 at 8 (after root's last arc)
    ///  6:        ['b', FINAL | LAST], addr 0
    ///  8: s1     ['b', FINAL | LAST], addr 0
    fn ab_b_stream() -> Vec<u8> {
        let mut data = MAGIC.to_vec();
        data.push(PLAIN_VERSION);
        data.extend_from_slice(&[DEFAULT_FILLER, DEFAULT_ANNOTATION, 0x01]);
        data.extend_from_slice(&[0x00, BIT_LAST_ARC]);
        data.extend_from_slice(&[b'^', BIT_LAST_ARC | BIT_TARGET_NEXT]);
        data.extend_from_slice(&[b'a', BIT_TARGET_NEXT]);
        data.extend_from_slice(&[b'b', BIT_FINAL_ARC | BIT_LAST_ARC]);
        data.extend_from_slice(&[b'b', BIT_FINAL_ARC | BIT_LAST_ARC]);
        data
    }

    #[test]
    fn load_header_fields() {
        let fsa = PlainFsa::from_bytes(&ab_b_stream()).unwrap();
        assert_eq!(fsa.filler(), b'_');
        assert_eq!(fsa.annotation(), b'+');
        assert_eq!(fsa.goto_length(), 1);
        assert_eq!(fsa.node_data_length(), 0);
        assert!(!fsa.flags().contains(FsaFlag::Numbers));
        assert!(fsa.flags().contains(FsaFlag::Nextbit));
    }

    #[test]
    fn target_next_scans_to_end_of_state() {
        let fsa = PlainFsa::from_bytes(&ab_b_stream()).unwrap();
        let root = fsa.root_node();
        assert_eq!(root, 4);
        let a = fsa.arc(root, b'a');
        assert!(!fsa.is_arc_terminal(a));
        assert_eq!(fsa.end_node(a), 8);
        let b = fsa.arc(root, b'b');
        assert!(fsa.is_arc_final(b));
        assert!(fsa.is_arc_terminal(b));
    }

    #[test]
    fn enumerates_sequences() {
        let fsa = PlainFsa::from_bytes(&ab_b_stream()).unwrap();
        let all: Vec<Vec<u8>> = fsa.sequences().map(|s| s.to_vec()).collect();
        assert_eq!(all, vec![b"ab".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn explicit_goto_address() {
        // goto width 2: address 6 << 3 | flags, little-endian.
        let word = (6u16 << 3) | u16::from(BIT_LAST_ARC);
        let bytes = word.to_le_bytes();
        let mut data = MAGIC.to_vec();
        data.push(PLAIN_VERSION);
        data.extend_from_slice(&[b'_', b'+', 0x02]);
        data.extend_from_slice(&[0x00, BIT_LAST_ARC, 0x00]); // dummy at 0
        data.extend_from_slice(&[b'^', bytes[0], bytes[1]]); // epsilon at 3 -> 6
        data.extend_from_slice(&[b'x', BIT_FINAL_ARC | BIT_LAST_ARC, 0x00]); // root at 6
        let fsa = PlainFsa::from_bytes(&data).unwrap();
        assert_eq!(fsa.root_node(), 6);
        let x = fsa.first_arc(6);
        assert_eq!(fsa.arc_label(x), b'x');
        assert!(fsa.is_arc_final(x));
        assert!(fsa.is_arc_terminal(x));
    }

    #[test]
    fn numbers_flag_follows_node_data_width() {
        let mut data = MAGIC.to_vec();
        data.push(PLAIN_VERSION);
        data.extend_from_slice(&[b'_', b'+', 0x11]);
        data.extend_from_slice(&[0x00, 0x00, BIT_LAST_ARC]); // dummy
        data.extend_from_slice(&[0x01, b'^', BIT_LAST_ARC | BIT_TARGET_NEXT]); // epsilon
        data.extend_from_slice(&[0x01, b'z', BIT_FINAL_ARC | BIT_LAST_ARC]); // root
        let fsa = PlainFsa::from_bytes(&data).unwrap();
        assert!(fsa.flags().contains(FsaFlag::Numbers));
        let root = fsa.root_node();
        assert_eq!(root, 6);
        assert_eq!(fsa.right_language_count(root).unwrap(), 1);
    }

    #[test]
    fn right_language_count_requires_numbers() {
        let fsa = PlainFsa::from_bytes(&ab_b_stream()).unwrap();
        assert!(matches!(
            fsa.right_language_count(fsa.root_node()),
            Err(FsaError::NumbersUnsupported)
        ));
    }

    #[test]
    fn reject_wrong_version() {
        let mut data = ab_b_stream();
        data[4] = crate::format::COMPACT_VERSION;
        assert!(matches!(
            PlainFsa::from_bytes(&data),
            Err(FsaError::UnsupportedVersion(0xC6))
        ));
    }

    #[test]
    fn reject_truncated_arcs() {
        let data = ab_b_stream();
        assert!(PlainFsa::from_bytes(&data[..HEADER_SIZE + PLAIN_HEADER_SIZE + 3]).is_err());
        assert!(PlainFsa::from_bytes(&data[..HEADER_SIZE + 1]).is_err());
    }

    #[test]
    fn reject_root_past_arcs() {
        let mut data = MAGIC.to_vec();
        data.push(PLAIN_VERSION);
        data.extend_from_slice(&[DEFAULT_FILLER, DEFAULT_ANNOTATION, 0x01]);
        data.extend_from_slice(&[0x00, BIT_LAST_ARC]);
        data.extend_from_slice(&[b'^', (4 << 3) | BIT_LAST_ARC]);
        assert!(matches!(
            PlainFsa::from_bytes(&data),
            Err(FsaError::Truncated { offset: 4 })
        ));
        // Root inside the block but its first arc cut short.
        data.push(b'a');
        assert!(matches!(
            PlainFsa::from_bytes(&data),
            Err(FsaError::Truncated { offset: 4 })
        ));
    }

    #[test]
    fn decode_little_endian() {
        assert_eq!(decode_le(&[0x34, 0x12, 0xFF], 2), 0x1234);
        assert_eq!(decode_le(&[0x01], 1), 1);
    }
}
