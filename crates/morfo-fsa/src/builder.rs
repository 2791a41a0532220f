// Incremental construction of a minimal automaton from sorted input.

use hashbrown::HashTable;

use crate::constant::{
    self, ARC_SIZE, BIT_ARC_FINAL, BIT_ARC_LAST, ConstantArcSizeFsa, FLAGS_OFFSET, LABEL_OFFSET,
    TERMINAL_STATE,
};
use crate::FsaError;

/// Maximum number of distinct labels leaving one state.
pub const MAX_LABELS: usize = 256;

/// Scratch bytes reserved for one state on the active path.
const STATE_SPAN: usize = ARC_SIZE * MAX_LABELS;

/// Default growth increment of the serialized state buffer.
pub const DEFAULT_BUFFER_GROWTH: usize = 1 << 20;

/// Statistics about a build in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuilderInfo {
    /// Sequences accepted by [`FsaBuilder::add`], duplicates included.
    pub sequences: usize,
    /// Distinct states serialized so far.
    pub states: usize,
    /// Freeze requests answered by an already interned state.
    pub shared_states: usize,
    /// Bytes of serialized state data, epsilon state included.
    pub buffer_bytes: usize,
}

/// Builds a minimal deterministic automaton from byte sequences added in
/// ascending order.
///
/// The most recently added sequence is kept on the *active path*: one
/// mutable state per depth, stored in a scratch buffer. When a new sequence
/// diverges from the previous one, every active state below the common
/// prefix is frozen: its arcs are looked up in the interning table and
/// either replaced by an identical state serialized earlier, or appended to
/// the output buffer as a new state.
///
/// ```
/// use morfo_fsa::builder::FsaBuilder;
///
/// let mut builder = FsaBuilder::new();
/// builder.add(b"bake").unwrap();
/// builder.add(b"cake").unwrap();
/// assert!(builder.add(b"apple").is_err());
/// ```
pub struct FsaBuilder {
    /// Epsilon state followed by every interned state.
    serialized: Vec<u8>,
    /// Active path scratch: depth `d` owns `[d * STATE_SPAN, (d + 1) * STATE_SPAN)`.
    active: Vec<u8>,
    /// Offset in `active` of the next free arc slot, per depth.
    next_arc: Vec<usize>,
    /// Length of the previously added sequence.
    active_len: usize,
    previous: Vec<u8>,
    /// Interned states, keyed by the hash of their arc bytes.
    states: HashTable<usize>,
    buffer_growth: usize,
    info: BuilderInfo,
    aborted: bool,
}

impl Default for FsaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FsaBuilder {
    pub fn new() -> Self {
        Self::with_buffer_growth(DEFAULT_BUFFER_GROWTH)
    }

    /// Create a builder whose state buffer grows by `buffer_growth` bytes
    /// at a time (never less than one fully branching state).
    pub fn with_buffer_growth(buffer_growth: usize) -> Self {
        let buffer_growth = buffer_growth.max(STATE_SPAN);
        let mut serialized = Vec::with_capacity(buffer_growth);
        // Epsilon state: one arc, retargeted at the root on completion.
        serialized.extend_from_slice(&[BIT_ARC_LAST, 0, 0, 0, 0, 0]);

        let mut builder = Self {
            serialized,
            active: Vec::new(),
            next_arc: Vec::new(),
            active_len: 0,
            previous: Vec::new(),
            states: HashTable::new(),
            buffer_growth,
            info: BuilderInfo::default(),
            aborted: false,
        };
        builder.expand_active_path(1);
        builder
    }

    /// Build an automaton from sequences already in ascending order.
    pub fn build<I, S>(sequences: I) -> Result<ConstantArcSizeFsa, FsaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut builder = Self::new();
        for sequence in sequences {
            builder.add(sequence.as_ref())?;
        }
        builder.complete()
    }

    /// Add the next sequence.
    ///
    /// `sequence` must not sort before the previously added one; a repeated
    /// sequence is accepted and has no effect. An ordering violation aborts
    /// the build: every later call fails with [`FsaError::BuildAborted`].
    pub fn add(&mut self, sequence: &[u8]) -> Result<(), FsaError> {
        if self.aborted {
            return Err(FsaError::BuildAborted);
        }
        if sequence < self.previous.as_slice() {
            self.aborted = true;
            return Err(FsaError::OutOfOrder {
                previous: self.previous.clone(),
                current: sequence.to_vec(),
            });
        }

        let common_prefix = self.common_prefix(sequence);
        self.expand_active_path(sequence.len());
        self.freeze_suffix(common_prefix);

        // Fresh arcs for the new suffix; targets are patched when the
        // state below is frozen.
        let len = sequence.len();
        for i in common_prefix + 1..=len {
            let p = self.next_arc[i - 1];
            self.active[p + FLAGS_OFFSET] = if i == len { BIT_ARC_FINAL } else { 0 };
            self.active[p + LABEL_OFFSET] = sequence[i - 1];
            constant::write_target(&mut self.active, p, TERMINAL_STATE);
            self.next_arc[i - 1] = p + ARC_SIZE;
        }

        self.active_len = len;
        self.previous.clear();
        self.previous.extend_from_slice(sequence);
        self.info.sequences += 1;
        Ok(())
    }

    /// Statistics for the sequences added so far.
    pub fn info(&self) -> BuilderInfo {
        BuilderInfo {
            buffer_bytes: self.serialized.len(),
            ..self.info
        }
    }

    /// Freeze the remaining active path and return the finished automaton.
    pub fn complete(mut self) -> Result<ConstantArcSizeFsa, FsaError> {
        if self.aborted {
            return Err(FsaError::BuildAborted);
        }
        self.freeze_suffix(0);
        self.active_len = 0;

        let root = if self.next_arc[0] == 0 {
            TERMINAL_STATE
        } else {
            self.freeze_state(0)
        };
        constant::write_target(&mut self.serialized, 0, root);

        let info = self.info();
        tracing::debug!(
            sequences = info.sequences,
            states = info.states,
            shared_states = info.shared_states,
            bytes = info.buffer_bytes,
            "automaton built"
        );

        let mut data = std::mem::take(&mut self.serialized);
        data.shrink_to_fit();
        Ok(ConstantArcSizeFsa::new(data))
    }

    /// Length of the prefix `sequence` shares with the active path.
    fn common_prefix(&self, sequence: &[u8]) -> usize {
        let max = sequence.len().min(self.active_len);
        (0..max)
            .take_while(|&i| {
                let last_arc = self.next_arc[i] - ARC_SIZE;
                self.active[last_arc + LABEL_OFFSET] == sequence[i]
            })
            .count()
    }

    /// Freeze active states deeper than `depth`, deepest first, pointing each
    /// parent's most recent arc at the frozen state.
    fn freeze_suffix(&mut self, depth: usize) {
        for i in (depth + 1..self.active_len).rev() {
            let frozen = self.freeze_state(i);
            let parent_arc = self.next_arc[i - 1] - ARC_SIZE;
            constant::write_target(&mut self.active, parent_arc, frozen);
            self.next_arc[i] = i * STATE_SPAN;
        }
    }

    /// Intern the active state at `depth`, returning its canonical offset.
    fn freeze_state(&mut self, depth: usize) -> usize {
        let start = depth * STATE_SPAN;
        let end = self.next_arc[depth];
        debug_assert!(end > start, "cannot freeze a state without arcs");
        self.active[end - ARC_SIZE + FLAGS_OFFSET] |= BIT_ARC_LAST;

        let arcs = &self.active[start..end];
        let hash = hash_arcs(arcs);
        let serialized = &self.serialized;
        if let Some(&state) = self
            .states
            .find(hash, |&state| serialized.get(state..state + arcs.len()) == Some(arcs))
        {
            self.info.shared_states += 1;
            return state;
        }

        if self.serialized.capacity() - self.serialized.len() < arcs.len() {
            self.serialized.reserve_exact(self.buffer_growth);
        }
        let state = self.serialized.len();
        self.serialized.extend_from_slice(&self.active[start..end]);

        let serialized = &self.serialized;
        self.states
            .insert_unique(hash, state, |&s| hash_state(serialized, s));
        self.info.states += 1;
        state
    }

    /// Make room on the active path for `len` states.
    fn expand_active_path(&mut self, len: usize) {
        let depth = self.next_arc.len();
        if depth >= len {
            return;
        }
        self.active.resize(len * STATE_SPAN, 0);
        self.next_arc.extend((depth..len).map(|d| d * STATE_SPAN));
    }
}

/// Hash of a state's arcs over their (label, target, final) tuples.
fn hash_arcs(arcs: &[u8]) -> u64 {
    let mut h: u64 = 0;
    for arc in arcs.chunks_exact(ARC_SIZE) {
        h = h.wrapping_mul(17).wrapping_add(u64::from(arc[LABEL_OFFSET]));
        h = h
            .wrapping_mul(17)
            .wrapping_add(constant::read_target(arc, 0) as u64);
        if arc[FLAGS_OFFSET] & BIT_ARC_FINAL != 0 {
            h = h.wrapping_add(17);
        }
    }
    // Spread the low bits across the word; the table indexes by both ends.
    h.wrapping_mul(0x9E37_79B9_7F4A_7C15).rotate_left(29)
}

/// Hash of the serialized state starting at `state`.
fn hash_state(data: &[u8], state: usize) -> u64 {
    let mut end = state;
    while data[end + FLAGS_OFFSET] & BIT_ARC_LAST == 0 {
        end += ARC_SIZE;
    }
    hash_arcs(&data[state..end + ARC_SIZE])
}
