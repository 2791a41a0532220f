// Depth-first enumeration of accepted sequences.

use crate::Automaton;

/// Enumerates every sequence accepted from a state, in lexicographic order.
///
/// Uses an explicit arc stack instead of recursion. The label buffer and the
/// stack are reused across [`restart_from`](Self::restart_from) calls, so one
/// iterator can walk many subtrees without reallocating. An iterator carries
/// mutable scratch state; give each thread its own.
pub struct SequenceIter<'a, A: Automaton> {
    fsa: &'a A,
    /// Labels of the current path.
    buffer: Vec<u8>,
    /// Next arc to try at each depth; 0 once the depth is exhausted.
    arcs: Vec<usize>,
}

impl<'a, A: Automaton> SequenceIter<'a, A> {
    /// Start enumerating the suffixes accepted from `node`.
    ///
    /// Node 0 denotes "no state" and yields nothing.
    pub fn new(fsa: &'a A, node: usize) -> Self {
        let mut iter = Self {
            fsa,
            buffer: Vec::with_capacity(32),
            arcs: Vec::with_capacity(32),
        };
        iter.restart_from(node);
        iter
    }

    /// Drop the current walk and start over from `node`.
    pub fn restart_from(&mut self, node: usize) {
        self.buffer.clear();
        self.arcs.clear();
        if node != 0 {
            self.arcs.push(self.fsa.first_arc(node));
        }
    }

    /// Advance to the next accepted sequence without allocating.
    ///
    /// The returned slice is only valid until the next call.
    pub fn next_sequence(&mut self) -> Option<&[u8]> {
        while let Some(&arc) = self.arcs.last() {
            let depth = self.arcs.len() - 1;
            if arc == 0 {
                self.arcs.pop();
                continue;
            }
            self.arcs[depth] = self.fsa.next_arc(arc);

            self.buffer.truncate(depth);
            self.buffer.push(self.fsa.arc_label(arc));

            if !self.fsa.is_arc_terminal(arc) {
                let next = self.fsa.end_node(arc);
                self.arcs.push(self.fsa.first_arc(next));
            }
            if self.fsa.is_arc_final(arc) {
                return Some(&self.buffer);
            }
        }
        None
    }
}

impl<A: Automaton> Iterator for SequenceIter<'_, A> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        self.next_sequence().map(<[u8]>::to_vec)
    }
}
