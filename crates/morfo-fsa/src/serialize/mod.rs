// Writers for the plain and compact automaton formats.

pub mod compact;
pub mod plain;

use std::io::Write;

use hashbrown::HashSet;

pub use compact::{CompactSerializer, CompactSerializerOptions, LabelTable};
pub use plain::{PlainSerializer, PlainSerializerOptions};

use crate::{Automaton, FsaError};

/// Writes an automaton in one concrete binary layout.
pub trait FsaSerializer {
    /// Serialize every state reachable from the root of `fsa` into `out`.
    fn serialize<A: Automaton, W: Write>(&self, fsa: &A, out: &mut W) -> Result<(), FsaError>;

    /// Serialize into a fresh buffer.
    fn to_bytes<A: Automaton>(&self, fsa: &A) -> Result<Vec<u8>, FsaError> {
        let mut out = Vec::new();
        self.serialize(fsa, &mut out)?;
        Ok(out)
    }
}

/// Orders the reachable states for output, root first.
///
/// Depth-first, with the last arc's target taken first so that it tends to
/// land right after its source and can be addressed implicitly.
pub(crate) fn linearize<A: Automaton>(fsa: &A) -> Vec<usize> {
    let root = fsa.root_node();
    let mut order = Vec::new();
    if root == 0 {
        return order;
    }
    let mut seen: HashSet<usize> = HashSet::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if !seen.insert(node) {
            continue;
        }
        order.push(node);
        for arc in fsa.arcs(node) {
            if !fsa.is_arc_terminal(arc) {
                let target = fsa.end_node(arc);
                if !seen.contains(&target) {
                    stack.push(target);
                }
            }
        }
    }
    order
}
