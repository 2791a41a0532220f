// Compact format writer.

use std::io::Write;

use hashbrown::HashMap;

use super::{FsaSerializer, linearize};
use crate::compact::{BIT_FINAL_ARC, BIT_LAST_ARC, BIT_TARGET_NEXT, LABEL_INDEX_SIZE};
use crate::format::{self, FsaVersion};
use crate::visit::right_language_counts;
use crate::{Automaton, FsaError, FsaFlag, FsaFlags, vint};

/// Label of the arc leading from the epsilon state to the root.
const EPSILON_LABEL: u8 = b'^';

/// How the header's label table is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LabelTable {
    /// The most frequent arc labels of the automaton; ties go to the
    /// smaller byte.
    #[default]
    MostFrequent,
    /// A fixed table, for output that must match another producer byte
    /// for byte. At most 31 labels.
    Explicit(Vec<u8>),
}

impl LabelTable {
    fn resolve<A: Automaton>(&self, fsa: &A, order: &[usize]) -> Result<Vec<u8>, FsaError> {
        match self {
            LabelTable::Explicit(labels) => {
                if labels.len() > LABEL_INDEX_SIZE {
                    return Err(FsaError::LabelTableTooLarge(labels.len()));
                }
                Ok(labels.clone())
            }
            LabelTable::MostFrequent => {
                let mut frequency = [0u64; 256];
                for &node in order {
                    for arc in fsa.arcs(node) {
                        frequency[usize::from(fsa.arc_label(arc))] += 1;
                    }
                }
                let mut labels: Vec<u8> = (0..=u8::MAX)
                    .filter(|&label| frequency[usize::from(label)] > 0)
                    .collect();
                labels.sort_by(|a, b| {
                    frequency[usize::from(*b)]
                        .cmp(&frequency[usize::from(*a)])
                        .then(a.cmp(b))
                });
                labels.truncate(LABEL_INDEX_SIZE);
                Ok(labels)
            }
        }
    }
}

/// Settings of the compact format writer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompactSerializerOptions {
    /// Prefix every state with its right-language count.
    pub numbers: bool,
    pub label_table: LabelTable,
}

#[derive(Debug, Clone, Default)]
pub struct CompactSerializer {
    options: CompactSerializerOptions,
}

/// Everything the size computation and the writer share.
struct Plan<'a> {
    order: &'a [usize],
    counts: &'a HashMap<usize, u64>,
    /// Label table slot for each byte, 0 if not in the table.
    index: [u8; 256],
    numbers: bool,
}

impl Plan<'_> {
    fn count(&self, node: usize) -> u32 {
        // Counts were range-checked before planning.
        self.counts.get(&node).copied().unwrap_or_default() as u32
    }

    fn label_size(&self, label: u8) -> usize {
        if self.index[usize::from(label)] == 0 { 2 } else { 1 }
    }

    fn epsilon_size(&self) -> usize {
        let mut size = self.label_size(EPSILON_LABEL);
        if let Some(&root) = self.order.first() {
            if self.numbers {
                size += vint::encoded_len(self.count(root));
            }
        } else {
            if self.numbers {
                size += 1;
            }
            size += 1;
        }
        size
    }

    /// Offsets of every state given the previous estimate of all offsets.
    fn layout<A: Automaton>(
        &self,
        fsa: &A,
        estimate: &HashMap<usize, usize>,
    ) -> HashMap<usize, usize> {
        let mut offsets = HashMap::with_capacity(self.order.len());
        let mut offset = self.epsilon_size();
        for (i, &node) in self.order.iter().enumerate() {
            offsets.insert(node, offset);
            if self.numbers {
                offset += vint::encoded_len(self.count(node));
            }
            let next = self.order.get(i + 1).copied();
            for arc in fsa.arcs(node) {
                offset += self.label_size(fsa.arc_label(arc));
                if fsa.is_arc_terminal(arc) {
                    offset += 1;
                } else {
                    let target = fsa.end_node(arc);
                    if Some(target) != next {
                        offset += vint::encoded_len(estimate[&target] as u32);
                    }
                }
            }
        }
        offsets
    }

    fn push_arc(&self, body: &mut Vec<u8>, label: u8, flags: u8) {
        let index = self.index[usize::from(label)];
        body.push(flags | index);
        if index == 0 {
            body.push(label);
        }
    }
}

impl CompactSerializer {
    pub fn new(options: CompactSerializerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompactSerializerOptions {
        &self.options
    }
}

impl FsaSerializer for CompactSerializer {
    fn serialize<A: Automaton, W: Write>(&self, fsa: &A, out: &mut W) -> Result<(), FsaError> {
        let numbers = self.options.numbers;
        let order = linearize(fsa);
        let counts = if numbers {
            right_language_counts(fsa)
        } else {
            HashMap::new()
        };
        if counts.values().any(|&count| count > u64::from(u32::MAX)) {
            return Err(FsaError::AddressOverflow);
        }

        let labels = self.options.label_table.resolve(fsa, &order)?;
        let mut index = [0u8; 256];
        for (slot, &label) in labels.iter().enumerate().rev() {
            index[usize::from(label)] = slot as u8 + 1;
        }
        let plan = Plan {
            order: &order,
            counts: &counts,
            index,
            numbers,
        };

        // Address widths depend on the offsets they encode; grow until stable.
        let mut offsets: HashMap<usize, usize> = order.iter().map(|&node| (node, 0)).collect();
        let mut rounds = 0;
        loop {
            let next = plan.layout(fsa, &offsets);
            rounds += 1;
            if next == offsets {
                break;
            }
            offsets = next;
        }
        if offsets.values().any(|&offset| offset > u32::MAX as usize) {
            return Err(FsaError::AddressOverflow);
        }

        let mut body = Vec::new();
        match order.first() {
            Some(&root) => {
                if numbers {
                    vint::encode(plan.count(root), &mut body);
                }
                plan.push_arc(&mut body, EPSILON_LABEL, BIT_LAST_ARC | BIT_TARGET_NEXT);
            }
            None => {
                if numbers {
                    vint::encode(0, &mut body);
                }
                plan.push_arc(&mut body, EPSILON_LABEL, BIT_LAST_ARC);
                vint::encode(0, &mut body);
            }
        }

        for (i, &node) in order.iter().enumerate() {
            debug_assert_eq!(body.len(), offsets[&node]);
            if numbers {
                vint::encode(plan.count(node), &mut body);
            }
            let next = order.get(i + 1).copied();
            for arc in fsa.arcs(node) {
                let mut flags = 0;
                if fsa.is_arc_final(arc) {
                    flags |= BIT_FINAL_ARC;
                }
                if fsa.next_arc(arc) == 0 {
                    flags |= BIT_LAST_ARC;
                }
                let label = fsa.arc_label(arc);
                if fsa.is_arc_terminal(arc) {
                    plan.push_arc(&mut body, label, flags);
                    vint::encode(0, &mut body);
                    continue;
                }
                let target = fsa.end_node(arc);
                if Some(target) == next {
                    plan.push_arc(&mut body, label, flags | BIT_TARGET_NEXT);
                } else {
                    plan.push_arc(&mut body, label, flags);
                    vint::encode(offsets[&target] as u32, &mut body);
                }
            }
        }

        let mut header_flags = FsaFlags::standard();
        if numbers {
            header_flags.insert(FsaFlag::Numbers);
        }
        format::write_header(out, FsaVersion::Compact)?;
        out.write_all(&header_flags.bits().to_be_bytes())?;
        out.write_all(&[labels.len() as u8 + 1, 0])?;
        out.write_all(&labels)?;
        out.write_all(&body)?;

        tracing::debug!(
            states = order.len(),
            labels = labels.len(),
            rounds,
            bytes = body.len(),
            "serialized compact automaton"
        );
        Ok(())
    }
}
