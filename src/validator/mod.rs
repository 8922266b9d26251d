use crate::error::GraphError;
use crate::graph::{GraphNode, GraphStructure, NodeKind, SlotIndex};
use ahash::AHashMap;
use tracing::{debug, warn};

mod checks;

use checks::GraphIndex;

/// A graph that passed every structural check.
///
/// This is the only form of graph the scheduler and the evaluator accept, so an
/// unvalidated graph can never be evaluated. It is immutable once built.
#[derive(Debug, Clone)]
pub struct ValidatedGraph {
    graph: GraphStructure,
    index: AHashMap<String, usize>,
    /// Predecessors per node as `(slot, node)`, ordered by slot.
    inputs: Vec<Vec<(SlotIndex, usize)>>,
    dependents: Vec<Vec<usize>>,
    sink: usize,
    reaches_sink: Vec<bool>,
    warnings: Vec<GraphError>,
}

impl ValidatedGraph {
    pub fn graph(&self) -> &GraphStructure {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.graph.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.nodes.is_empty()
    }

    pub fn node(&self, idx: usize) -> &GraphNode {
        &self.graph.nodes[idx]
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Input nodes of `idx` in slot order.
    pub fn inputs(&self, idx: usize) -> &[(SlotIndex, usize)] {
        &self.inputs[idx]
    }

    pub fn dependents(&self, idx: usize) -> &[usize] {
        &self.dependents[idx]
    }

    pub fn sink(&self) -> usize {
        self.sink
    }

    pub fn sink_node(&self) -> &GraphNode {
        self.node(self.sink)
    }

    /// Source nodes whose values reach the final grade, sorted by id.
    pub fn required_sources(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .graph
            .nodes
            .iter()
            .zip(&self.reaches_sink)
            .filter(|(node, reaches)| **reaches && node.kind() == NodeKind::Source)
            .map(|(node, _)| node.id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Warning-level findings, such as nodes that do not contribute to the final grade.
    pub fn warnings(&self) -> &[GraphError] {
        &self.warnings
    }
}

/// Checks grading model graphs for structural problems.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    warnings_as_errors: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ValidatorBuilder {
    warnings_as_errors: bool,
}

impl ValidatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects graphs that only have warnings, e.g. unconnected nodes.
    pub fn warnings_as_errors(mut self, enabled: bool) -> Self {
        self.warnings_as_errors = enabled;
        self
    }

    pub fn build(self) -> Validator {
        Validator {
            warnings_as_errors: self.warnings_as_errors,
        }
    }
}

impl Validator {
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    /// Runs every check and returns all problems found, not just the first.
    ///
    /// On success the returned graph carries any warnings. On failure the error
    /// list contains the warnings as well.
    pub fn validate(&self, graph: GraphStructure) -> Result<ValidatedGraph, Vec<GraphError>> {
        let mut errors = Vec::new();
        let index = GraphIndex::build(&graph, &mut errors);

        checks::check_sink_count(&index, &mut errors);
        checks::check_slots(&index, &mut errors);
        checks::check_settings(index.nodes, &mut errors);

        let successors = index.successors();
        checks::check_cycles(&index, &successors, &mut errors);

        let reaches_sink = checks::reaches_sink(&index);
        checks::check_reachability(&index, &reaches_sink, &mut errors);

        let rejected = errors
            .iter()
            .any(|e| self.warnings_as_errors || !e.is_warning());
        if rejected {
            debug!(
                nodes = graph.nodes.len(),
                edges = graph.edges.len(),
                problems = errors.len(),
                "grading model rejected"
            );
            return Err(errors);
        }

        let sink = match index.sinks().as_slice() {
            [sink] => *sink,
            // Unreachable: the sink count check rejects anything else.
            _ => return Err(errors),
        };

        let mut inputs = vec![Vec::new(); graph.nodes.len()];
        let mut dependents = vec![Vec::new(); graph.nodes.len()];
        for e in &index.edges {
            inputs[e.target].push((e.edge.target_slot, e.source));
            dependents[e.source].push(e.target);
        }
        for list in &mut inputs {
            list.sort_unstable();
        }
        for list in &mut dependents {
            list.sort_unstable();
        }
        let index_by_id = index
            .by_id
            .iter()
            .map(|(id, idx)| (id.to_string(), *idx))
            .collect();

        for warning in &errors {
            warn!(nodes = ?warning.node_ids, "{}", warning);
        }
        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            warnings = errors.len(),
            "grading model validated"
        );

        Ok(ValidatedGraph {
            index: index_by_id,
            inputs,
            dependents,
            sink,
            reaches_sink,
            warnings: errors,
            graph,
        })
    }
}

/// Validates a graph with the default settings.
pub fn validate(graph: GraphStructure) -> Result<ValidatedGraph, Vec<GraphError>> {
    Validator::default().validate(graph)
}
