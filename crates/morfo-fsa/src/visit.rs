// Post-order state visitor and whole-automaton statistics.

use hashbrown::{HashMap, HashSet};

use crate::Automaton;

/// Callbacks of [`visit_post_order`].
pub trait StateVisitor {
    /// Called when a state is first reached. Returning false skips the
    /// state's subtree; [`leave`](Self::leave) is then not called for it.
    fn enter(&mut self, _node: usize) -> bool {
        true
    }

    /// Called once every state reachable from `node` has been left.
    fn leave(&mut self, node: usize);
}

/// Visit every state reachable from the root exactly once, in post order.
pub fn visit_post_order<A: Automaton, V: StateVisitor>(fsa: &A, visitor: &mut V) {
    visit_post_order_from(fsa, fsa.root_node(), visitor);
}

/// Visit every state reachable from `node` exactly once, in post order.
///
/// Keeps two parallel stacks (states and their next unexplored arc) instead
/// of recursing, so depth is bounded by memory only.
pub fn visit_post_order_from<A: Automaton, V: StateVisitor>(
    fsa: &A,
    node: usize,
    visitor: &mut V,
) {
    if node == 0 {
        return;
    }
    let mut seen: HashSet<usize> = HashSet::new();
    let mut nodes: Vec<usize> = Vec::new();
    let mut arcs: Vec<usize> = Vec::new();

    seen.insert(node);
    if !visitor.enter(node) {
        return;
    }
    nodes.push(node);
    arcs.push(fsa.first_arc(node));

    while let Some(&current) = nodes.last() {
        let top = arcs.len() - 1;
        let arc = arcs[top];
        if arc == 0 {
            nodes.pop();
            arcs.pop();
            visitor.leave(current);
            continue;
        }
        arcs[top] = fsa.next_arc(arc);

        if fsa.is_arc_terminal(arc) {
            continue;
        }
        let next = fsa.end_node(arc);
        if seen.insert(next) && visitor.enter(next) {
            nodes.push(next);
            arcs.push(fsa.first_arc(next));
        }
    }
}

/// Number of sequences accepted from every reachable state.
pub fn right_language_counts<A: Automaton>(fsa: &A) -> HashMap<usize, u64> {
    struct Counter<'a, A> {
        fsa: &'a A,
        counts: HashMap<usize, u64>,
    }

    impl<A: Automaton> StateVisitor for Counter<'_, A> {
        fn leave(&mut self, node: usize) {
            let mut count = 0;
            for arc in self.fsa.arcs(node) {
                if self.fsa.is_arc_final(arc) {
                    count += 1;
                }
                if !self.fsa.is_arc_terminal(arc) {
                    count += self.counts[&self.fsa.end_node(arc)];
                }
            }
            self.counts.insert(node, count);
        }
    }

    let mut counter = Counter {
        fsa,
        counts: HashMap::new(),
    };
    visit_post_order(fsa, &mut counter);
    counter.counts
}

/// Shape statistics of an automaton.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FsaInfo {
    /// Reachable states.
    pub states: usize,
    /// Arcs leaving reachable states.
    pub arcs: usize,
    /// Arcs carrying the final flag.
    pub final_arcs: usize,
    /// Accepted sequences.
    pub sequences: u64,
}

impl FsaInfo {
    pub fn compute<A: Automaton>(fsa: &A) -> Self {
        struct Collector<'a, A> {
            fsa: &'a A,
            info: FsaInfo,
        }

        impl<A: Automaton> StateVisitor for Collector<'_, A> {
            fn leave(&mut self, node: usize) {
                self.info.states += 1;
                for arc in self.fsa.arcs(node) {
                    self.info.arcs += 1;
                    if self.fsa.is_arc_final(arc) {
                        self.info.final_arcs += 1;
                    }
                }
            }
        }

        let mut collector = Collector {
            fsa,
            info: FsaInfo::default(),
        };
        visit_post_order(fsa, &mut collector);

        let root = fsa.root_node();
        if root != 0 {
            collector.info.sequences = right_language_counts(fsa)
                .get(&root)
                .copied()
                .unwrap_or_default();
        }
        collector.info
    }
}
