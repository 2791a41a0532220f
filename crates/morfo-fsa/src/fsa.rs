// Closed union over the loadable automaton formats.

use std::io::Read;

use crate::compact::CompactFsa;
use crate::format::{self, FsaVersion, HEADER_SIZE};
use crate::plain::PlainFsa;
use crate::{Automaton, FsaError, FsaFlags};

/// A loaded automaton in either serialized format.
///
/// The header's version byte selects the variant.
#[derive(Debug)]
pub enum Fsa {
    Plain(PlainFsa),
    Compact(CompactFsa),
}

impl Fsa {
    /// Read a whole stream into memory and load it.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, FsaError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Load an automaton from a complete serialized stream.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FsaError> {
        let version = format::parse_header(data)?;
        let body = &data[HEADER_SIZE..];
        let fsa = match version {
            FsaVersion::Plain => Fsa::Plain(PlainFsa::from_body(body)?),
            FsaVersion::Compact => Fsa::Compact(CompactFsa::from_body(body)?),
        };
        tracing::debug!(
            format = ?version,
            flags = %fsa.flags(),
            bytes = data.len(),
            "loaded automaton"
        );
        Ok(fsa)
    }

    pub fn version(&self) -> FsaVersion {
        match self {
            Fsa::Plain(_) => FsaVersion::Plain,
            Fsa::Compact(_) => FsaVersion::Compact,
        }
    }
}

impl Automaton for Fsa {
    fn root_node(&self) -> usize {
        match self {
            Fsa::Plain(f) => f.root_node(),
            Fsa::Compact(f) => f.root_node(),
        }
    }

    fn first_arc(&self, node: usize) -> usize {
        match self {
            Fsa::Plain(f) => f.first_arc(node),
            Fsa::Compact(f) => f.first_arc(node),
        }
    }

    fn next_arc(&self, arc: usize) -> usize {
        match self {
            Fsa::Plain(f) => f.next_arc(arc),
            Fsa::Compact(f) => f.next_arc(arc),
        }
    }

    fn arc_label(&self, arc: usize) -> u8 {
        match self {
            Fsa::Plain(f) => f.arc_label(arc),
            Fsa::Compact(f) => f.arc_label(arc),
        }
    }

    fn is_arc_final(&self, arc: usize) -> bool {
        match self {
            Fsa::Plain(f) => f.is_arc_final(arc),
            Fsa::Compact(f) => f.is_arc_final(arc),
        }
    }

    fn is_arc_terminal(&self, arc: usize) -> bool {
        match self {
            Fsa::Plain(f) => f.is_arc_terminal(arc),
            Fsa::Compact(f) => f.is_arc_terminal(arc),
        }
    }

    fn end_node(&self, arc: usize) -> usize {
        match self {
            Fsa::Plain(f) => f.end_node(arc),
            Fsa::Compact(f) => f.end_node(arc),
        }
    }

    fn flags(&self) -> FsaFlags {
        match self {
            Fsa::Plain(f) => f.flags(),
            Fsa::Compact(f) => f.flags(),
        }
    }

    fn right_language_count(&self, node: usize) -> Result<u32, FsaError> {
        match self {
            Fsa::Plain(f) => f.right_language_count(node),
            Fsa::Compact(f) => f.right_language_count(node),
        }
    }

    fn arc(&self, node: usize, label: u8) -> usize {
        match self {
            Fsa::Plain(f) => f.arc(node, label),
            Fsa::Compact(f) => f.arc(node, label),
        }
    }
}
