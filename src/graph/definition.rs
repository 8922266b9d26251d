use super::settings::{NodeKind, NodeSettings, SlotIndex};
use ahash::RandomState;
use serde::{Deserialize, Serialize};
use std::hash::BuildHasher;

// Fixed seeds keep content hashes stable for the lifetime of a cache.
const CONTENT_HASH_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// The complete, canonical definition of a grading model graph.
///
/// Produced by the editor (or by [`crate::ui::GraphImporter`]) and never mutated by
/// the validator or the evaluator.
#[derive(Debug, Clone, Default, PartialEq, Hash, Serialize, Deserialize)]
pub struct GraphStructure {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// One vertex of the graph.
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub settings: NodeSettings,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, settings: NodeSettings) -> Self {
        Self {
            id: id.into(),
            settings,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.settings.kind()
    }
}

/// A directed connection carrying one value from `source` into a numbered
/// input slot of `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    /// Output of the source node this edge reads. Every node type has a single output `0`.
    #[serde(default)]
    pub source_output: u32,
    pub target: String,
    pub target_slot: SlotIndex,
}

impl GraphEdge {
    /// Creates an edge reading output `0` of `source`, with a generated id.
    pub fn new(source: impl Into<String>, target: impl Into<String>, target_slot: SlotIndex) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("{}-{}:{}", source, target, target_slot),
            source,
            source_output: 0,
            target,
            target_slot,
        }
    }
}

impl GraphStructure {
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Incoming edges of a node, ordered by target slot.
    pub fn incoming(&self, node_id: &str) -> Vec<&GraphEdge> {
        let mut edges: Vec<&GraphEdge> = self.edges.iter().filter(|e| e.target == node_id).collect();
        edges.sort_by(|a, b| a.target_slot.cmp(&b.target_slot).then_with(|| a.id.cmp(&b.id)));
        edges
    }

    pub fn source_ids(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.kind() == NodeKind::Source)
            .map(|n| n.id.as_str())
            .collect()
    }

    /// The sink node, if exactly one exists.
    pub fn sink(&self) -> Option<&GraphNode> {
        let mut sinks = self.nodes.iter().filter(|n| n.kind() == NodeKind::Sink);
        match (sinks.next(), sinks.next()) {
            (Some(sink), None) => Some(sink),
            _ => None,
        }
    }

    /// A structural hash of the graph. Equal graphs always hash equally.
    pub fn content_hash(&self) -> u64 {
        let [k0, k1, k2, k3] = CONTENT_HASH_SEEDS;
        BuildHasher::hash_one(&RandomState::with_seeds(k0, k1, k2, k3), self)
    }
}
