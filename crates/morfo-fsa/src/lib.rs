//! Minimal deterministic acyclic automata over byte sequences.
//!
//! This crate builds a minimal automaton from a sorted set of byte
//! sequences, serializes it into one of two compact binary layouts, and
//! traverses the serialized form for membership tests, perfect hashing and
//! enumeration.
//!
//! # Architecture
//!
//! - [`format`] -- Stream header (magic and version byte)
//! - [`vint`] -- Variable-length integer codec
//! - [`flags`] -- Capability flag bitset carried in headers
//! - [`builder`] -- Incremental minimal-automaton construction
//! - [`constant`] -- Fixed-arc-size automaton produced by the builder
//! - [`plain`] -- Plain format reader (fixed-width goto fields)
//! - [`compact`] -- Compact format reader (v-int addresses, label table)
//! - [`fsa`] -- Closed union over the loadable formats
//! - [`serialize`] -- Writers for the plain and compact formats
//! - [`traversal`] -- Matching and perfect hashing
//! - [`iter`] -- Depth-first enumeration of accepted sequences
//! - [`visit`] -- Post-order state visitor and whole-automaton statistics
//!
//! # Example
//!
//! ```
//! use morfo_fsa::builder::FsaBuilder;
//! use morfo_fsa::traversal::{Matcher, MatchKind};
//!
//! let fsa = FsaBuilder::build(["car", "cat"]).unwrap();
//! let matcher = Matcher::new(&fsa);
//! assert_eq!(matcher.match_sequence(b"cat").kind, MatchKind::ExactMatch);
//! assert_eq!(matcher.match_sequence(b"ca").kind, MatchKind::SequenceIsAPrefix);
//! ```

pub mod builder;
pub mod compact;
pub mod constant;
pub mod flags;
pub mod format;
pub mod fsa;
pub mod iter;
pub mod plain;
pub mod serialize;
pub mod traversal;
pub mod visit;
pub mod vint;

pub use flags::{FsaFlag, FsaFlags};
pub use fsa::Fsa;
pub use iter::SequenceIter;

/// Error type for automaton construction, loading and traversal.
#[derive(Debug, thiserror::Error)]
pub enum FsaError {
    #[error("invalid magic number in automaton header")]
    InvalidMagic,
    #[error("unsupported automaton version: 0x{0:02x}")]
    UnsupportedVersion(u8),
    #[error("input too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
    #[error("invalid header: {0}")]
    InvalidHeader(&'static str),
    #[error("unrecognized flags bitset: 0x{0:04x}")]
    InvalidFlags(u16),
    #[error("input must be sorted: {current:?} follows {previous:?}")]
    OutOfOrder { previous: Vec<u8>, current: Vec<u8> },
    #[error("build aborted by an earlier ordering violation")]
    BuildAborted,
    #[error("automaton was not built with the NUMBERS capability")]
    NumbersUnsupported,
    #[error("truncated arc data at offset {offset}")]
    Truncated { offset: usize },
    #[error("state address does not fit the encoding")]
    AddressOverflow,
    #[error("label table holds {0} entries, at most 31 are allowed")]
    LabelTableTooLarge(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Read-side capability surface shared by every automaton layout.
///
/// States and arcs are plain byte offsets into the automaton's buffer. A
/// state is the offset of its first arc (plus any per-state data). Offset 0
/// never denotes a reachable state, so it doubles as "none": `next_arc`
/// and `arc` return 0 when there is no such arc.
pub trait Automaton {
    /// The start state.
    fn root_node(&self) -> usize;

    /// Offset of the first arc leaving `node`.
    fn first_arc(&self, node: usize) -> usize;

    /// Offset of the arc following `arc` in the same state, or 0.
    fn next_arc(&self, arc: usize) -> usize;

    fn arc_label(&self, arc: usize) -> u8;

    /// Whether a sequence ending with this arc is accepted.
    fn is_arc_final(&self, arc: usize) -> bool;

    /// Whether this arc has no destination state.
    fn is_arc_terminal(&self, arc: usize) -> bool;

    /// Destination state of a non-terminal arc.
    fn end_node(&self, arc: usize) -> usize;

    fn flags(&self) -> FsaFlags;

    /// Number of sequences accepted from `node`.
    ///
    /// Only available on automata carrying the [`FsaFlag::Numbers`] capability.
    fn right_language_count(&self, _node: usize) -> Result<u32, FsaError> {
        Err(FsaError::NumbersUnsupported)
    }

    /// Find the arc leaving `node` labelled `label`, or 0.
    fn arc(&self, node: usize, label: u8) -> usize {
        let mut arc = self.first_arc(node);
        while arc != 0 {
            if self.arc_label(arc) == label {
                return arc;
            }
            arc = self.next_arc(arc);
        }
        0
    }

    /// Iterate over the arcs leaving `node`.
    fn arcs(&self, node: usize) -> Arcs<'_, Self>
    where
        Self: Sized,
    {
        Arcs {
            fsa: self,
            arc: self.first_arc(node),
        }
    }

    /// Enumerate every accepted sequence, in lexicographic order.
    fn sequences(&self) -> SequenceIter<'_, Self>
    where
        Self: Sized,
    {
        SequenceIter::new(self, self.root_node())
    }

    /// Enumerate every suffix accepted from `node`.
    fn sequences_from(&self, node: usize) -> SequenceIter<'_, Self>
    where
        Self: Sized,
    {
        SequenceIter::new(self, node)
    }
}

/// Iterator over the arc offsets of one state.
pub struct Arcs<'a, A: Automaton> {
    fsa: &'a A,
    arc: usize,
}

impl<A: Automaton> Iterator for Arcs<'_, A> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.arc == 0 {
            return None;
        }
        let arc = self.arc;
        self.arc = self.fsa.next_arc(arc);
        Some(arc)
    }
}
