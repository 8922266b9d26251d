//! Individual structural checks. Each check appends every problem it finds.

use crate::error::{GraphError, GraphErrorKind};
use crate::graph::{
    AverageSettings, GraphEdge, GraphNode, GraphStructure, NodeKind, NodeSettings, SlotIndex,
    StepOutput, StepperSettings,
};
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use std::collections::{BTreeMap, VecDeque};

/// An edge whose endpoints both exist, resolved to node positions.
#[derive(Clone, Copy)]
pub(super) struct IndexedEdge<'a> {
    pub source: usize,
    pub target: usize,
    pub edge: &'a GraphEdge,
}

/// Node lookup shared by the checks. Edges with a missing endpoint are excluded
/// from `edges` so later checks only see well-formed connections.
pub(super) struct GraphIndex<'a> {
    pub nodes: &'a [GraphNode],
    pub by_id: AHashMap<&'a str, usize>,
    pub edges: Vec<IndexedEdge<'a>>,
}

impl<'a> GraphIndex<'a> {
    pub fn build(graph: &'a GraphStructure, errors: &mut Vec<GraphError>) -> Self {
        let mut by_id = AHashMap::with_capacity(graph.nodes.len());
        for (idx, node) in graph.nodes.iter().enumerate() {
            by_id.entry(node.id.as_str()).or_insert(idx);
        }

        for id in graph.nodes.iter().map(|n| n.id.as_str()).duplicates().sorted() {
            errors.push(
                GraphError::new(
                    GraphErrorKind::DuplicateNode,
                    format!("Node id '{}' is used by more than one node", id),
                )
                .with_nodes([id]),
            );
        }

        let mut edges = Vec::with_capacity(graph.edges.len());
        for edge in &graph.edges {
            if let (Some(&source), Some(&target)) =
                (by_id.get(edge.source.as_str()), by_id.get(edge.target.as_str()))
            {
                edges.push(IndexedEdge { source, target, edge });
            } else {
                let missing: Vec<&str> = [edge.source.as_str(), edge.target.as_str()]
                    .into_iter()
                    .filter(|id| !by_id.contains_key(*id))
                    .dedup()
                    .collect();
                errors.push(
                    GraphError::new(
                        GraphErrorKind::DanglingEdge,
                        format!(
                            "Edge '{}' references unknown node(s): {}",
                            edge.id,
                            missing.iter().join(", ")
                        ),
                    )
                    .with_edges([edge.id.as_str()]),
                );
            }
        }

        Self {
            nodes: &graph.nodes,
            by_id,
            edges,
        }
    }

    /// Well-formed incoming edges per node, grouped by slot.
    pub fn incoming_by_slot(&self) -> Vec<BTreeMap<SlotIndex, Vec<&'a GraphEdge>>> {
        let mut incoming = vec![BTreeMap::new(); self.nodes.len()];
        for e in &self.edges {
            incoming[e.target]
                .entry(e.edge.target_slot)
                .or_insert_with(Vec::new)
                .push(e.edge);
        }
        incoming
    }

    /// Outgoing neighbours per node, sorted by node id.
    pub fn successors(&self) -> Vec<Vec<usize>> {
        let mut successors = vec![Vec::new(); self.nodes.len()];
        for e in &self.edges {
            successors[e.source].push(e.target);
        }
        for list in &mut successors {
            list.sort_by(|a, b| self.nodes[*a].id.cmp(&self.nodes[*b].id));
            list.dedup();
        }
        successors
    }

    pub fn sinks(&self) -> Vec<usize> {
        self.by_id
            .values()
            .copied()
            .filter(|idx| self.nodes[*idx].kind() == NodeKind::Sink)
            .sorted()
            .collect()
    }
}

pub(super) fn check_sink_count(index: &GraphIndex, errors: &mut Vec<GraphError>) {
    let sinks = index.sinks();
    match sinks.as_slice() {
        [] => errors.push(GraphError::new(
            GraphErrorKind::SinkCount,
            "The graph has no final grade node",
        )),
        [sink] => {
            let node = &index.nodes[*sink];
            let incoming: Vec<&str> = index
                .edges
                .iter()
                .filter(|e| e.target == *sink)
                .map(|e| e.edge.id.as_str())
                .collect();
            if incoming.len() != 1 {
                errors.push(
                    GraphError::new(
                        GraphErrorKind::SinkCount,
                        format!(
                            "The final grade node must have exactly one input, but has {}",
                            incoming.len()
                        ),
                    )
                    .with_nodes([node.id.as_str()])
                    .with_edges(incoming),
                );
            }
        }
        many => errors.push(
            GraphError::new(
                GraphErrorKind::SinkCount,
                format!("The graph has {} final grade nodes, expected one", many.len()),
            )
            .with_nodes(many.iter().map(|idx| index.nodes[*idx].id.as_str())),
        ),
    }
}

pub(super) fn check_slots(index: &GraphIndex, errors: &mut Vec<GraphError>) {
    for edge in index.edges.iter().map(|e| e.edge).filter(|e| e.source_output != 0) {
        errors.push(
            GraphError::new(
                GraphErrorKind::SlotCompleteness,
                format!(
                    "Edge '{}' reads output {} of '{}', which only has output 0",
                    edge.id, edge.source_output, edge.source
                ),
            )
            .with_nodes([edge.source.as_str()])
            .with_edges([edge.id.as_str()]),
        );
    }

    for (position, (node, slots)) in index.nodes.iter().zip(index.incoming_by_slot()).enumerate() {
        if index.by_id.get(node.id.as_str()) != Some(&position) {
            // Edges of a duplicated id resolve to its first node.
            continue;
        }

        for (slot, edges) in slots.iter().filter(|(_, edges)| edges.len() > 1) {
            errors.push(
                GraphError::new(
                    GraphErrorKind::SlotCollision,
                    format!("{} edges claim input slot {} of '{}'", edges.len(), slot, node.id),
                )
                .with_nodes([node.id.as_str()])
                .with_edges(edges.iter().map(|e| e.id.as_str())),
            );
        }

        check_slot_arity(node, &slots, errors);
    }
}

fn check_slot_arity(
    node: &GraphNode,
    slots: &BTreeMap<SlotIndex, Vec<&GraphEdge>>,
    errors: &mut Vec<GraphError>,
) {
    let slot_error = |message: String, edges: Vec<&str>| {
        GraphError::new(GraphErrorKind::SlotCompleteness, message)
            .with_nodes([node.id.as_str()])
            .with_edges(edges)
    };

    match &node.settings {
        NodeSettings::Source(_) => {
            if !slots.is_empty() {
                let edges = slots.values().flatten().map(|e| e.id.as_str()).collect();
                errors.push(slot_error(
                    format!("Source node '{}' cannot have inputs", node.id),
                    edges,
                ));
            }
        }
        NodeSettings::Addition | NodeSettings::Max(_) => {
            if slots.is_empty() {
                errors.push(slot_error(
                    format!("{} node '{}' has no inputs", node.kind(), node.id),
                    Vec::new(),
                ));
            }
        }
        NodeSettings::Average(AverageSettings { weights, .. }) => {
            for slot in weights.keys().filter(|slot| !slots.contains_key(*slot)) {
                errors.push(slot_error(
                    format!("Weight for slot {} of '{}' has no incoming edge", slot, node.id),
                    Vec::new(),
                ));
            }
            for (slot, edges) in slots.iter().filter(|(slot, _)| !weights.contains_key(*slot)) {
                errors.push(slot_error(
                    format!("Input slot {} of '{}' has no weight", slot, node.id),
                    edges.iter().map(|e| e.id.as_str()).collect(),
                ));
            }
        }
        NodeSettings::Stepper(_)
        | NodeSettings::MinPoints(_)
        | NodeSettings::Round(_)
        | NodeSettings::Sink => {
            for (slot, edges) in slots.iter().filter(|(slot, _)| **slot != 0) {
                errors.push(slot_error(
                    format!("{} node '{}' has no input slot {}", node.kind(), node.id, slot),
                    edges.iter().map(|e| e.id.as_str()).collect(),
                ));
            }
            // A sink without input is reported by the sink count check.
            if !slots.contains_key(&0) && node.kind() != NodeKind::Sink {
                errors.push(slot_error(
                    format!("{} node '{}' has no input", node.kind(), node.id),
                    Vec::new(),
                ));
            }
        }
    }
}

pub(super) fn check_settings(nodes: &[GraphNode], errors: &mut Vec<GraphError>) {
    for node in nodes {
        match &node.settings {
            NodeSettings::Stepper(stepper) => check_stepper(node, stepper, errors),
            NodeSettings::Average(average) => check_weights(node, average, errors),
            NodeSettings::Source(source) => {
                if let Some(min) = source.min_points.filter(|m| !m.is_finite()) {
                    errors.push(invalid_setting(node, "minPoints", min));
                }
            }
            NodeSettings::MinPoints(settings) if !settings.min_points.is_finite() => {
                errors.push(invalid_setting(node, "minPoints", settings.min_points));
            }
            NodeSettings::Max(settings) if !settings.min_value.is_finite() => {
                errors.push(invalid_setting(node, "minValue", settings.min_value));
            }
            _ => {}
        }
    }
}

fn invalid_setting(node: &GraphNode, field: &str, value: f64) -> GraphError {
    GraphError::new(
        GraphErrorKind::InvalidSettings,
        format!("Setting '{}' of '{}' must be a finite number, got {}", field, node.id, value),
    )
    .with_nodes([node.id.as_str()])
}

fn check_stepper(node: &GraphNode, stepper: &StepperSettings, errors: &mut Vec<GraphError>) {
    let mut problems = Vec::new();
    let steps = stepper.num_steps as usize;

    if steps == 0 {
        problems.push("numSteps must be at least 1".to_string());
    }
    if stepper.output_values.len() != steps {
        problems.push(format!(
            "expected {} output values, found {}",
            steps,
            stepper.output_values.len()
        ));
    }
    if stepper.middle_points.len() + 1 != steps {
        problems.push(format!(
            "expected {} middle points, found {}",
            steps.saturating_sub(1),
            stepper.middle_points.len()
        ));
    }
    if stepper.middle_points.iter().any(|p| !p.is_finite()) {
        problems.push("middle points must be finite".to_string());
    }
    if let Some((a, b)) = stepper.middle_points.iter().tuple_windows().find(|(a, b)| a >= b) {
        problems.push(format!(
            "middle points must be strictly ascending ({} is followed by {})",
            a, b
        ));
    }
    if stepper
        .output_values
        .iter()
        .any(|v| matches!(v, StepOutput::Value(v) if !v.is_finite()))
    {
        problems.push("output values must be finite".to_string());
    }

    for problem in problems {
        errors.push(
            GraphError::new(
                GraphErrorKind::StepperShape,
                format!("Stepper '{}': {}", node.id, problem),
            )
            .with_nodes([node.id.as_str()]),
        );
    }
}

fn check_weights(node: &GraphNode, average: &AverageSettings, errors: &mut Vec<GraphError>) {
    for (slot, weight) in average.weights.iter().filter(|(_, w)| !w.is_finite() || **w < 0.0) {
        errors.push(
            GraphError::new(
                GraphErrorKind::AverageWeights,
                format!(
                    "Weight {} for slot {} of '{}' must be finite and non-negative",
                    weight, slot, node.id
                ),
            )
            .with_nodes([node.id.as_str()]),
        );
    }
    if !average.weights.values().any(|w| w.is_finite() && *w > 0.0) {
        errors.push(
            GraphError::new(
                GraphErrorKind::AverageWeights,
                format!("Average '{}' needs at least one positive weight", node.id),
            )
            .with_nodes([node.id.as_str()]),
        );
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Colour {
    White,
    Grey,
    Black,
}

/// Depth-first colouring; every back edge closes a cycle, reported once per node set.
pub(super) fn check_cycles(index: &GraphIndex, successors: &[Vec<usize>], errors: &mut Vec<GraphError>) {
    let mut colour = vec![Colour::White; index.nodes.len()];
    let mut path = Vec::new();
    let mut seen_cycles: AHashSet<Vec<usize>> = AHashSet::new();
    let mut cycles = Vec::new();

    let roots = (0..index.nodes.len()).sorted_by(|a, b| index.nodes[*a].id.cmp(&index.nodes[*b].id));
    for root in roots {
        if colour[root] == Colour::White {
            visit(root, successors, &mut colour, &mut path, &mut |cycle: &[usize]| {
                let key: Vec<usize> = cycle.iter().copied().sorted().collect();
                if seen_cycles.insert(key) {
                    cycles.push(cycle.to_vec());
                }
            });
        }
    }

    for mut cycle in cycles {
        // Start each report at the smallest id so output is stable.
        if let Some(start) = cycle.iter().position_min_by(|a, b| index.nodes[**a].id.cmp(&index.nodes[**b].id)) {
            cycle.rotate_left(start);
        }
        let ids: Vec<&str> = cycle.iter().map(|idx| index.nodes[*idx].id.as_str()).collect();
        let members: AHashSet<usize> = cycle.iter().copied().collect();
        let edge_ids = index
            .edges
            .iter()
            .filter(|e| members.contains(&e.source) && members.contains(&e.target))
            .map(|e| e.edge.id.as_str());
        errors.push(
            GraphError::new(
                GraphErrorKind::Cycle,
                format!("Cycle through {}", ids.iter().chain(ids.first()).join(" -> ")),
            )
            .with_nodes(ids.iter().copied())
            .with_edges(edge_ids),
        );
    }
}

fn visit(
    node: usize,
    successors: &[Vec<usize>],
    colour: &mut [Colour],
    path: &mut Vec<usize>,
    on_cycle: &mut impl FnMut(&[usize]),
) {
    colour[node] = Colour::Grey;
    path.push(node);
    for &next in &successors[node] {
        match colour[next] {
            Colour::White => visit(next, successors, colour, path, on_cycle),
            Colour::Grey => {
                if let Some(start) = path.iter().position(|n| *n == next) {
                    on_cycle(&path[start..]);
                }
            }
            Colour::Black => {}
        }
    }
    path.pop();
    colour[node] = Colour::Black;
}

/// Marks every node with a path to a sink. Unmarked nodes are dead graph sections.
pub(super) fn reaches_sink(index: &GraphIndex) -> Vec<bool> {
    let mut predecessors = vec![Vec::new(); index.nodes.len()];
    for e in &index.edges {
        predecessors[e.target].push(e.source);
    }

    let mut reached = vec![false; index.nodes.len()];
    let mut queue: VecDeque<usize> = index.sinks().into();
    for sink in &queue {
        reached[*sink] = true;
    }
    while let Some(current) = queue.pop_front() {
        for &prev in &predecessors[current] {
            if !reached[prev] {
                reached[prev] = true;
                queue.push_back(prev);
            }
        }
    }
    reached
}

pub(super) fn check_reachability(index: &GraphIndex, reached: &[bool], errors: &mut Vec<GraphError>) {
    if index.sinks().is_empty() {
        // Nothing can reach a missing sink; the sink count error covers it.
        return;
    }
    let unreachable = index
        .by_id
        .iter()
        .filter(|(_, idx)| !reached[**idx])
        .map(|(id, _)| *id)
        .sorted();
    for id in unreachable {
        errors.push(
            GraphError::new(
                GraphErrorKind::Reachability,
                format!("Node '{}' does not contribute to the final grade", id),
            )
            .with_nodes([id]),
        );
    }
}
