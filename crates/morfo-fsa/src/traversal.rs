// Sequence matching and perfect hashing over any automaton layout.

use crate::{Automaton, FsaError, FsaFlag};

/// Outcome of matching a sequence against an automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The whole sequence is accepted.
    ExactMatch,
    /// Not even the first symbol has an arc.
    NoMatch,
    /// An accepted sequence (or dead end) ends inside the input; see
    /// [`MatchResult::index`].
    AutomatonHasPrefix,
    /// The input was consumed in a state that still has continuations;
    /// [`MatchResult::node`] is that state.
    SequenceIsAPrefix,
}

/// Match classification with the position and state it was reached at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub kind: MatchKind,
    /// Input position the classification refers to.
    pub index: usize,
    /// State reached, for [`MatchKind::SequenceIsAPrefix`]; 0 otherwise.
    pub node: usize,
}

impl MatchResult {
    const fn new(kind: MatchKind, index: usize, node: usize) -> Self {
        Self { kind, index, node }
    }
}

/// Format-agnostic matcher. Holds no scratch state, so it is `Copy` and can
/// be shared freely.
#[derive(Debug)]
pub struct Matcher<'a, A: Automaton> {
    fsa: &'a A,
}

impl<A: Automaton> Clone for Matcher<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: Automaton> Copy for Matcher<'_, A> {}

impl<'a, A: Automaton> Matcher<'a, A> {
    pub fn new(fsa: &'a A) -> Self {
        Self { fsa }
    }

    pub fn automaton(&self) -> &'a A {
        self.fsa
    }

    /// Classify `sequence` starting from the root.
    pub fn match_sequence(&self, sequence: &[u8]) -> MatchResult {
        self.match_from(sequence, self.fsa.root_node())
    }

    /// Classify `sequence` starting from `node`.
    pub fn match_from(&self, sequence: &[u8], mut node: usize) -> MatchResult {
        if node == 0 {
            return MatchResult::new(MatchKind::NoMatch, 0, 0);
        }
        let fsa = self.fsa;
        for (i, &label) in sequence.iter().enumerate() {
            let arc = fsa.arc(node, label);
            if arc == 0 {
                let kind = if i > 0 {
                    MatchKind::AutomatonHasPrefix
                } else {
                    MatchKind::NoMatch
                };
                return MatchResult::new(kind, i, 0);
            }
            if i + 1 == sequence.len() && fsa.is_arc_final(arc) {
                return MatchResult::new(MatchKind::ExactMatch, i, 0);
            }
            if fsa.is_arc_terminal(arc) {
                return MatchResult::new(MatchKind::AutomatonHasPrefix, i + 1, 0);
            }
            node = fsa.end_node(arc);
        }
        MatchResult::new(MatchKind::SequenceIsAPrefix, sequence.len(), node)
    }

    /// Lexicographic rank of `sequence` among all accepted sequences.
    ///
    /// Returns `Ok(None)` when the sequence is not accepted, and
    /// [`FsaError::NumbersUnsupported`] when the automaton carries no
    /// right-language counts.
    pub fn perfect_hash(&self, sequence: &[u8]) -> Result<Option<u32>, FsaError> {
        let fsa = self.fsa;
        if !fsa.flags().contains(FsaFlag::Numbers) {
            return Err(FsaError::NumbersUnsupported);
        }
        let mut node = fsa.root_node();
        if node == 0 {
            return Ok(None);
        }

        let mut hash: u32 = 0;
        for (i, &label) in sequence.iter().enumerate() {
            let last = i + 1 == sequence.len();
            let mut arc = fsa.first_arc(node);
            loop {
                if arc == 0 {
                    return Ok(None);
                }
                if fsa.arc_label(arc) == label {
                    break;
                }
                if fsa.is_arc_final(arc) {
                    hash += 1;
                }
                if !fsa.is_arc_terminal(arc) {
                    hash += fsa.right_language_count(fsa.end_node(arc))?;
                }
                arc = fsa.next_arc(arc);
            }

            if fsa.is_arc_final(arc) {
                if last {
                    return Ok(Some(hash));
                }
                hash += 1;
            }
            if last || fsa.is_arc_terminal(arc) {
                return Ok(None);
            }
            node = fsa.end_node(arc);
        }
        Ok(None)
    }
}
