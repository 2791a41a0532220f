// Fixed-arc-size automaton layout produced by the builder.

use crate::{Automaton, FsaFlags};

/// Size of one arc: flags byte, label byte, 4-byte big-endian target.
pub const ARC_SIZE: usize = 6;

pub(crate) const FLAGS_OFFSET: usize = 0;
pub(crate) const LABEL_OFFSET: usize = 1;
pub(crate) const ADDRESS_OFFSET: usize = 2;

/// The arc is the last one of its state.
pub const BIT_ARC_LAST: u8 = 1 << 0;

/// A sequence ending with this arc is accepted.
pub const BIT_ARC_FINAL: u8 = 1 << 1;

/// Target address of arcs with no destination state.
pub const TERMINAL_STATE: usize = 0;

/// Automaton whose arcs all have the same size.
///
/// Offset 0 holds the epsilon state: a single arc whose target is the root.
/// Every other state is a run of [`ARC_SIZE`]-byte arcs ending with an arc
/// that carries [`BIT_ARC_LAST`].
pub struct ConstantArcSizeFsa {
    data: Vec<u8>,
}

impl std::fmt::Debug for ConstantArcSizeFsa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstantArcSizeFsa")
            .field("bytes", &self.data.len())
            .field("root", &self.root_node())
            .finish()
    }
}

impl ConstantArcSizeFsa {
    pub(crate) fn new(data: Vec<u8>) -> Self {
        debug_assert!(data.len() >= ARC_SIZE && data.len() % ARC_SIZE == 0);
        Self { data }
    }

    /// The raw arc buffer, epsilon state included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn arc_flags(&self, arc: usize) -> u8 {
        self.data[arc + FLAGS_OFFSET]
    }

    #[inline]
    fn arc_target(&self, arc: usize) -> usize {
        read_target(&self.data, arc)
    }
}

/// Reads the big-endian target address of the arc at `arc`.
#[inline]
pub(crate) fn read_target(data: &[u8], arc: usize) -> usize {
    let at = arc + ADDRESS_OFFSET;
    u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]) as usize
}

/// Writes the big-endian target address of the arc at `arc`.
#[inline]
pub(crate) fn write_target(data: &mut [u8], arc: usize, target: usize) {
    let at = arc + ADDRESS_OFFSET;
    data[at..at + 4].copy_from_slice(&(target as u32).to_be_bytes());
}

impl Automaton for ConstantArcSizeFsa {
    fn root_node(&self) -> usize {
        self.arc_target(0)
    }

    fn first_arc(&self, node: usize) -> usize {
        node
    }

    fn next_arc(&self, arc: usize) -> usize {
        if self.arc_flags(arc) & BIT_ARC_LAST != 0 {
            0
        } else {
            arc + ARC_SIZE
        }
    }

    fn arc_label(&self, arc: usize) -> u8 {
        self.data[arc + LABEL_OFFSET]
    }

    fn is_arc_final(&self, arc: usize) -> bool {
        self.arc_flags(arc) & BIT_ARC_FINAL != 0
    }

    fn is_arc_terminal(&self, arc: usize) -> bool {
        self.arc_target(arc) == TERMINAL_STATE
    }

    fn end_node(&self, arc: usize) -> usize {
        let target = self.arc_target(arc);
        debug_assert_ne!(target, TERMINAL_STATE, "terminal arcs have no end node");
        target
    }

    fn flags(&self) -> FsaFlags {
        FsaFlags::empty()
    }
}
