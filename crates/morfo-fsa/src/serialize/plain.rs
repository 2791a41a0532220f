// Plain format writer.

use std::io::Write;

use hashbrown::HashMap;

use super::{FsaSerializer, linearize};
use crate::format::{self, FsaVersion};
use crate::plain::{
    BIT_FINAL_ARC, BIT_LAST_ARC, BIT_TARGET_NEXT, DEFAULT_ANNOTATION, DEFAULT_FILLER, FLAG_BITS,
};
use crate::visit::right_language_counts;
use crate::{Automaton, FsaError};

/// Widest goto field tried before giving up.
const MAX_GOTO_LENGTH: usize = 8;

/// Label of the arc leading from the epsilon state to the root.
const EPSILON_LABEL: u8 = b'^';

/// Settings of the plain format writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainSerializerOptions {
    /// Prefix every state with its right-language count.
    pub numbers: bool,
    /// Filler byte recorded in the header.
    pub filler: u8,
    /// Annotation (separator) byte recorded in the header.
    pub annotation: u8,
}

impl Default for PlainSerializerOptions {
    fn default() -> Self {
        Self {
            numbers: false,
            filler: DEFAULT_FILLER,
            annotation: DEFAULT_ANNOTATION,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlainSerializer {
    options: PlainSerializerOptions,
}

/// Byte offsets of every output state for one goto width.
struct Layout {
    offsets: HashMap<usize, usize>,
    /// Offset of the first linearized state.
    first_state: usize,
    size: usize,
}

impl PlainSerializer {
    pub fn new(options: PlainSerializerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PlainSerializerOptions {
        &self.options
    }

    fn layout<A: Automaton>(
        fsa: &A,
        order: &[usize],
        node_data_length: usize,
        goto_length: usize,
    ) -> Layout {
        let explicit_arc = 1 + goto_length;
        // Dummy terminal state, then the epsilon state.
        let mut offset = node_data_length + explicit_arc;
        offset += node_data_length + if order.is_empty() { explicit_arc } else { 2 };
        let first_state = offset;

        let mut offsets = HashMap::with_capacity(order.len());
        for (i, &node) in order.iter().enumerate() {
            offsets.insert(node, offset);
            offset += node_data_length;
            let next = order.get(i + 1).copied();
            for arc in fsa.arcs(node) {
                offset += if is_target_next(fsa, arc, next) {
                    2
                } else {
                    explicit_arc
                };
            }
        }
        Layout {
            offsets,
            first_state,
            size: offset,
        }
    }
}

/// Whether `arc` can point at the following state implicitly.
fn is_target_next<A: Automaton>(fsa: &A, arc: usize, next: Option<usize>) -> bool {
    fsa.next_arc(arc) == 0 && !fsa.is_arc_terminal(arc) && Some(fsa.end_node(arc)) == next
}

/// Smallest number of bytes holding `value` (at least one).
fn bytes_needed(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(8).max(1)
}

fn write_le(out: &mut Vec<u8>, value: u64, width: usize) {
    out.extend_from_slice(&value.to_le_bytes()[..width]);
}

impl FsaSerializer for PlainSerializer {
    fn serialize<A: Automaton, W: Write>(&self, fsa: &A, out: &mut W) -> Result<(), FsaError> {
        let order = linearize(fsa);
        let counts = if self.options.numbers {
            right_language_counts(fsa)
        } else {
            HashMap::new()
        };
        if counts.values().any(|&count| count > u64::from(u32::MAX)) {
            return Err(FsaError::AddressOverflow);
        }
        let root = fsa.root_node();
        let root_count = counts.get(&root).copied().unwrap_or_default();
        let node_data_length = if self.options.numbers {
            bytes_needed(root_count)
        } else {
            0
        };

        let mut chosen = None;
        for goto_length in 1..=MAX_GOTO_LENGTH {
            let layout = Self::layout(fsa, order.as_slice(), node_data_length, goto_length);
            let max_address = layout.offsets.values().copied().max().unwrap_or(0) as u64;
            if max_address < 1u64 << (8 * goto_length as u32 - FLAG_BITS) {
                chosen = Some((goto_length, layout));
                break;
            }
        }
        let Some((goto_length, layout)) = chosen else {
            return Err(FsaError::AddressOverflow);
        };

        let mut body = Vec::with_capacity(layout.size);
        let goto = |body: &mut Vec<u8>, target: usize, flags: u8| {
            let value = (target as u64) << FLAG_BITS | u64::from(flags);
            write_le(body, value, goto_length);
        };

        // Dummy terminal state.
        write_le(&mut body, 0, node_data_length);
        body.push(0);
        goto(&mut body, 0, BIT_LAST_ARC);

        // Epsilon state.
        write_le(&mut body, root_count, node_data_length);
        body.push(EPSILON_LABEL);
        if order.is_empty() {
            goto(&mut body, 0, BIT_LAST_ARC);
        } else {
            debug_assert_eq!(body.len() + 1, layout.first_state);
            body.push(BIT_LAST_ARC | BIT_TARGET_NEXT);
        }

        for (i, &node) in order.iter().enumerate() {
            debug_assert_eq!(body.len(), layout.offsets[&node]);
            let count = counts.get(&node).copied().unwrap_or_default();
            write_le(&mut body, count, node_data_length);

            let next = order.get(i + 1).copied();
            for arc in fsa.arcs(node) {
                let mut flags = 0;
                if fsa.is_arc_final(arc) {
                    flags |= BIT_FINAL_ARC;
                }
                if fsa.next_arc(arc) == 0 {
                    flags |= BIT_LAST_ARC;
                }
                body.push(fsa.arc_label(arc));
                if is_target_next(fsa, arc, next) {
                    body.push(flags | BIT_TARGET_NEXT);
                } else if fsa.is_arc_terminal(arc) {
                    goto(&mut body, 0, flags);
                } else {
                    goto(&mut body, layout.offsets[&fsa.end_node(arc)], flags);
                }
            }
        }
        debug_assert_eq!(body.len(), layout.size);

        format::write_header(out, FsaVersion::Plain)?;
        out.write_all(&[
            self.options.filler,
            self.options.annotation,
            ((node_data_length as u8) << 4) | goto_length as u8,
        ])?;
        out.write_all(&body)?;

        tracing::debug!(
            states = order.len(),
            goto_length,
            node_data_length,
            bytes = body.len(),
            "serialized plain automaton"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FsaBuilder;
    use crate::flags::FsaFlags;
    use crate::plain::PlainFsa;
    use crate::serialize::{CompactSerializer, CompactSerializerOptions};

    fn round_trip(words: &[&str], options: PlainSerializerOptions) -> PlainFsa {
        let fsa = FsaBuilder::build(words).unwrap();
        let bytes = PlainSerializer::new(options).to_bytes(&fsa).unwrap();
        PlainFsa::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn accepts_same_sequences() {
        let words = ["a", "ab", "abc", "b", "bcd", "xyz"];
        let loaded = round_trip(&words, PlainSerializerOptions::default());
        let all: Vec<Vec<u8>> = loaded.sequences().collect();
        let expected: Vec<Vec<u8>> = words.iter().map(|w| w.as_bytes().to_vec()).collect();
        assert_eq!(all, expected);
    }

    #[test]
    fn header_records_options() {
        let options = PlainSerializerOptions {
            numbers: false,
            filler: b'.',
            annotation: b'|',
        };
        let loaded = round_trip(&["q"], options);
        assert_eq!(loaded.filler(), b'.');
        assert_eq!(loaded.annotation(), b'|');
        assert_eq!(loaded.goto_length(), 1);
        assert_eq!(loaded.node_data_length(), 0);
    }

    #[test]
    fn numbers_store_right_language() {
        let words = ["a", "ab", "b"];
        let options = PlainSerializerOptions {
            numbers: true,
            ..Default::default()
        };
        let loaded = round_trip(&words, options);
        assert_eq!(loaded.node_data_length(), 1);
        let root = loaded.root_node();
        assert_eq!(loaded.right_language_count(root).unwrap(), 3);
        let a = loaded.end_node(loaded.arc(root, b'a'));
        assert_eq!(loaded.right_language_count(a).unwrap(), 1);
    }

    #[test]
    fn wide_goto_for_large_automata() {
        let words: Vec<String> = (0..3000).map(|i| format!("{i:06}")).collect();
        let fsa = FsaBuilder::build(&words).unwrap();
        let bytes = PlainSerializer::default().to_bytes(&fsa).unwrap();
        let loaded = PlainFsa::from_bytes(&bytes).unwrap();
        assert!(loaded.goto_length() >= 2);
        assert_eq!(loaded.sequences().count(), words.len());
    }

    #[test]
    fn empty_automaton() {
        let loaded = round_trip(&[], PlainSerializerOptions::default());
        assert_eq!(loaded.root_node(), 0);
        assert_eq!(loaded.sequences().count(), 0);
    }

    /// Chain of `DEPTH` states with arcs 'a' and 'b' each, accepting
    /// 2^DEPTH sequences. Node `n` owns arcs `2n` and `2n + 1`.
    struct Chain;

    impl Chain {
        const DEPTH: usize = 33;
    }

    impl Automaton for Chain {
        fn root_node(&self) -> usize {
            1
        }
        fn first_arc(&self, node: usize) -> usize {
            node * 2
        }
        fn next_arc(&self, arc: usize) -> usize {
            if arc % 2 == 0 { arc + 1 } else { 0 }
        }
        fn arc_label(&self, arc: usize) -> u8 {
            if arc % 2 == 0 { b'a' } else { b'b' }
        }
        fn is_arc_final(&self, arc: usize) -> bool {
            arc / 2 == Self::DEPTH
        }
        fn is_arc_terminal(&self, arc: usize) -> bool {
            arc / 2 == Self::DEPTH
        }
        fn end_node(&self, arc: usize) -> usize {
            arc / 2 + 1
        }
        fn flags(&self) -> FsaFlags {
            FsaFlags::standard()
        }
    }

    #[test]
    fn counts_wider_than_u32_are_rejected() {
        assert_eq!(right_language_counts(&Chain)[&1], 1u64 << Chain::DEPTH);
        let options = PlainSerializerOptions {
            numbers: true,
            ..Default::default()
        };
        assert!(matches!(
            PlainSerializer::new(options).to_bytes(&Chain),
            Err(FsaError::AddressOverflow)
        ));
        let options = CompactSerializerOptions {
            numbers: true,
            ..Default::default()
        };
        assert!(matches!(
            CompactSerializer::new(options).to_bytes(&Chain),
            Err(FsaError::AddressOverflow)
        ));
        // Without counts the chain is an ordinary automaton.
        let bytes = PlainSerializer::default().to_bytes(&Chain).unwrap();
        let loaded = PlainFsa::from_bytes(&bytes).unwrap();
        assert_eq!(loaded.arc_label(loaded.first_arc(loaded.root_node())), b'a');
    }

    #[test]
    fn bytes_needed_widths() {
        assert_eq!(bytes_needed(0), 1);
        assert_eq!(bytes_needed(255), 1);
        assert_eq!(bytes_needed(256), 2);
        assert_eq!(bytes_needed(u64::from(u32::MAX)), 4);
    }
}
