// Compact automaton format: v-int addresses and a frequent-label table.
//
// Arc layout: a flags byte packing TARGET_NEXT, LAST, FINAL and a 5-bit
// label index. A non-zero index selects a label from the header's label
// table; index 0 means the label is stored in the next byte. Unless
// TARGET_NEXT is set, a v-int target address follows. With NUMBERS, every
// state starts with its right-language count as a v-int.

use crate::format::{self, FsaVersion, HEADER_SIZE};
use crate::{Automaton, FsaError, FsaFlag, FsaFlags, vint};

/// The target state immediately follows the arc's state; no address is stored.
pub const BIT_TARGET_NEXT: u8 = 1 << 7;

/// The arc is the last one of its state.
pub const BIT_LAST_ARC: u8 = 1 << 6;

/// A sequence ending with this arc is accepted.
pub const BIT_FINAL_ARC: u8 = 1 << 5;

/// Bits of the flags byte holding the label table index.
pub const LABEL_INDEX_BITS: u32 = 5;

pub const LABEL_INDEX_MASK: u8 = (1 << LABEL_INDEX_BITS) - 1;

/// Number of usable label table slots (slot 0 means "explicit label").
pub const LABEL_INDEX_SIZE: usize = (1 << LABEL_INDEX_BITS) - 1;

/// Automaton in the compact format.
pub struct CompactFsa {
    arcs: Vec<u8>,
    /// Label table; slot 0 is unused.
    label_mapping: Vec<u8>,
    flags: FsaFlags,
    root: usize,
}

impl std::fmt::Debug for CompactFsa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompactFsa")
            .field("bytes", &self.arcs.len())
            .field("labels", &self.label_mapping.len())
            .field("flags", &self.flags)
            .field("root", &self.root)
            .finish()
    }
}

impl CompactFsa {
    /// Load a compact-format automaton from a complete serialized stream.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FsaError> {
        match format::parse_header(data)? {
            FsaVersion::Compact => Self::from_body(&data[HEADER_SIZE..]),
            other => Err(FsaError::UnsupportedVersion(other.as_byte())),
        }
    }

    /// Load from the bytes following the common header.
    pub(crate) fn from_body(body: &[u8]) -> Result<Self, FsaError> {
        let too_short = |expected: usize| FsaError::TooShort {
            expected: HEADER_SIZE + expected,
            actual: HEADER_SIZE + body.len(),
        };
        if body.len() < 3 {
            return Err(too_short(3));
        }
        let raw_flags = u16::from_be_bytes([body[0], body[1]]);
        let flags = FsaFlags::from_bits(raw_flags)?;

        let label_count = usize::from(body[2]);
        if label_count > LABEL_INDEX_SIZE + 1 {
            return Err(FsaError::LabelTableTooLarge(label_count));
        }
        let arcs_start = 3 + label_count;
        if body.len() < arcs_start {
            return Err(too_short(arcs_start));
        }

        let mut fsa = Self {
            arcs: body[arcs_start..].to_vec(),
            label_mapping: body[3..arcs_start].to_vec(),
            flags,
            root: 0,
        };
        fsa.root = fsa.resolve_root()?;
        Ok(fsa)
    }

    /// The epsilon state sits at offset 0; its only arc leads to the root.
    fn resolve_root(&self) -> Result<usize, FsaError> {
        let mut pos = 0;
        if self.flags.contains(FsaFlag::Numbers) {
            vint::decode(&self.arcs, &mut pos)?;
        }
        let Some(&arc_flags) = self.arcs.get(pos) else {
            return Err(FsaError::Truncated { offset: pos });
        };
        let index = usize::from(arc_flags & LABEL_INDEX_MASK);
        if index != 0 && index >= self.label_mapping.len() {
            return Err(FsaError::InvalidHeader("label index outside the label table"));
        }
        let mut end = pos + 1;
        if index == 0 {
            end += 1;
        }
        if arc_flags & BIT_TARGET_NEXT != 0 {
            if end >= self.arcs.len() {
                return Err(FsaError::Truncated { offset: pos });
            }
            return Ok(end);
        }
        // Root 0 is the empty automaton.
        let root = vint::decode(&self.arcs, &mut end)? as usize;
        if root != 0 && root >= self.arcs.len() {
            return Err(FsaError::Truncated { offset: root });
        }
        Ok(root)
    }

    /// The arc block (states only, no header).
    pub fn as_bytes(&self) -> &[u8] {
        &self.arcs
    }

    /// The label table, slot 0 included.
    pub fn label_mapping(&self) -> &[u8] {
        &self.label_mapping
    }

    #[inline]
    fn is_next_set(&self, arc: usize) -> bool {
        self.arcs[arc] & BIT_TARGET_NEXT != 0
    }

    #[inline]
    fn is_arc_last(&self, arc: usize) -> bool {
        self.arcs[arc] & BIT_LAST_ARC != 0
    }

    #[inline]
    fn has_explicit_label(&self, arc: usize) -> bool {
        self.arcs[arc] & LABEL_INDEX_MASK == 0
    }

    fn skip_arc(&self, arc: usize) -> usize {
        let flags = self.arcs[arc];
        let mut offset = arc + 1;
        if flags & LABEL_INDEX_MASK == 0 {
            offset += 1;
        }
        if flags & BIT_TARGET_NEXT == 0 {
            offset = vint::skip(&self.arcs, offset);
        }
        offset
    }

    fn destination(&self, mut arc: usize) -> usize {
        if self.is_next_set(arc) {
            while !self.is_arc_last(arc) {
                arc = self.skip_arc(arc);
            }
            self.skip_arc(arc)
        } else {
            let address = arc + if self.has_explicit_label(arc) { 2 } else { 1 };
            vint::read(&self.arcs, address) as usize
        }
    }
}

impl Automaton for CompactFsa {
    fn root_node(&self) -> usize {
        self.root
    }

    fn first_arc(&self, node: usize) -> usize {
        if self.flags.contains(FsaFlag::Numbers) {
            vint::skip(&self.arcs, node)
        } else {
            node
        }
    }

    fn next_arc(&self, arc: usize) -> usize {
        if self.is_arc_last(arc) {
            0
        } else {
            self.skip_arc(arc)
        }
    }

    fn arc_label(&self, arc: usize) -> u8 {
        let index = usize::from(self.arcs[arc] & LABEL_INDEX_MASK);
        if index > 0 {
            self.label_mapping[index]
        } else {
            self.arcs[arc + 1]
        }
    }

    fn is_arc_final(&self, arc: usize) -> bool {
        self.arcs[arc] & BIT_FINAL_ARC != 0
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
        Ok(vint::read(&self.arcs, node))
    }
}
