//! Evaluation order.
//!
//! The schedule is a topological order of a validated graph: every node appears
//! after all nodes it reads from. It depends only on the graph shape, so it is
//! computed once and reused for every set of input values.
//!
//! # Algorithm
//!
//! Kahn's algorithm over in-degree counts. Among nodes that are ready at the same
//! time, the smallest node id goes first, which makes the order deterministic.

use crate::validator::ValidatedGraph;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    order: Vec<usize>,
}

impl Schedule {
    pub fn new(graph: &ValidatedGraph) -> Self {
        let mut in_degree: Vec<usize> = (0..graph.len()).map(|idx| graph.inputs(idx).len()).collect();
        let mut ready: BinaryHeap<Reverse<(&str, usize)>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(idx, _)| Reverse((graph.node(idx).id.as_str(), idx)))
            .collect();

        let mut order = Vec::with_capacity(graph.len());
        while let Some(Reverse((_, idx))) = ready.pop() {
            order.push(idx);
            for &dependent in graph.dependents(idx) {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push(Reverse((graph.node(dependent).id.as_str(), dependent)));
                }
            }
        }

        debug_assert_eq!(order.len(), graph.len(), "validated graphs are acyclic");
        Self { order }
    }

    /// Node positions in evaluation order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn node_ids<'g>(&self, graph: &'g ValidatedGraph) -> Vec<&'g str> {
        self.order.iter().map(|idx| graph.node(*idx).id.as_str()).collect()
    }
}

/// Computes the evaluation order of a validated graph.
pub fn schedule(graph: &ValidatedGraph) -> Schedule {
    Schedule::new(graph)
}
