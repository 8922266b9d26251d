//! Import of grading models saved by the graph editor.
//!
//! The editor identifies input slots with string handles: a target handle is
//! either the bare target id (slot 0) or `<target>-<n>` (slot `n`), and a source
//! handle is `<source>-source` or `<source>-<n>-source`. Handles are parsed once
//! here, so the rest of the crate only sees numeric slots.

use crate::error::ConversionError;
use crate::graph::{
    AverageSettings, GraphEdge, GraphNode, GraphStructure, IntoGraph, NodeKind, NodeSettings,
    SlotIndex,
};
use ahash::AHashMap;
use itertools::Itertools;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::debug;

mod types;

pub use types::{UiEdge, UiGraph, UiNode, UiNodeData};
use types::UiAverageSettings;

/// Converts editor graphs into `GraphStructure`s.
///
/// Node type names are resolved through a registry holding the canonical names
/// (`source`, `addition`, `average`, `stepper`, `sink`, `minpoints`, `max`,
/// `round`). Other names can be mapped onto them with
/// [`GraphImporterBuilder::with_type_mapping`].
#[derive(Debug, Clone)]
pub struct GraphImporter {
    registry: AHashMap<String, NodeKind>,
}

pub struct GraphImporterBuilder {
    registry: AHashMap<String, NodeKind>,
}

impl Default for GraphImporterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphImporterBuilder {
    pub fn new() -> Self {
        let registry = NodeKind::ALL
            .into_iter()
            .map(|kind| (kind.name().to_string(), kind))
            .collect();
        Self { registry }
    }

    /// Accepts `user_type_name` as another name for a canonical node type, e.g.
    /// `("attainment", "source")`. Unknown canonical names are ignored.
    pub fn with_type_mapping(mut self, user_type_name: &str, canonical_type_name: &str) -> Self {
        if let Some(kind) = NodeKind::from_name(canonical_type_name) {
            self.registry.insert(user_type_name.to_string(), kind);
        }
        self
    }

    pub fn build(self) -> GraphImporter {
        GraphImporter {
            registry: self.registry,
        }
    }
}

impl Default for GraphImporter {
    fn default() -> Self {
        GraphImporterBuilder::new().build()
    }
}

impl GraphImporter {
    pub fn builder() -> GraphImporterBuilder {
        GraphImporterBuilder::new()
    }

    /// Parses the editor's JSON and converts it.
    pub fn from_json(&self, json: &str) -> Result<GraphStructure, ConversionError> {
        let graph: UiGraph =
            serde_json::from_str(json).map_err(|e| ConversionError::Json(e.to_string()))?;
        self.import(graph)
    }

    pub fn import(&self, graph: UiGraph) -> Result<GraphStructure, ConversionError> {
        let UiGraph {
            nodes,
            edges,
            mut node_data,
        } = graph;

        let nodes = nodes
            .into_iter()
            .map(|node| {
                let data = node_data.remove(&node.id).unwrap_or_default();
                self.convert_node(node, data)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let edges = edges
            .into_iter()
            .map(convert_edge)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(nodes = nodes.len(), edges = edges.len(), "imported editor graph");
        Ok(GraphStructure::new(nodes, edges))
    }

    fn resolve_kind(&self, node: &UiNode) -> Result<NodeKind, ConversionError> {
        node.node_type
            .as_deref()
            .and_then(|name| self.registry.get(name).copied())
            .ok_or_else(|| ConversionError::UnknownNodeType {
                node_id: node.id.clone(),
                type_name: node.node_type.clone().unwrap_or_default(),
            })
    }

    fn convert_node(&self, node: UiNode, data: UiNodeData) -> Result<GraphNode, ConversionError> {
        let kind = self.resolve_kind(&node)?;
        let id = node.id;

        let settings = match kind {
            NodeKind::Addition => NodeSettings::Addition,
            NodeKind::Sink => NodeSettings::Sink,
            NodeKind::Source => NodeSettings::Source(parse_settings(&id, data.settings)?),
            NodeKind::Stepper => NodeSettings::Stepper(parse_settings(&id, data.settings)?),
            NodeKind::MinPoints => NodeSettings::MinPoints(parse_settings(&id, data.settings)?),
            NodeKind::Max => NodeSettings::Max(parse_settings(&id, data.settings)?),
            NodeKind::Round => NodeSettings::Round(parse_settings(&id, data.settings)?),
            NodeKind::Average => {
                let raw: UiAverageSettings = parse_settings(&id, data.settings)?;
                let mut weights = BTreeMap::new();
                let mut keys: BTreeMap<SlotIndex, String> = BTreeMap::new();
                for (handle, weight) in raw.weights.into_iter().sorted_by(|a, b| a.0.cmp(&b.0)) {
                    let invalid = |message: String| ConversionError::InvalidSettings {
                        node_id: id.clone(),
                        message,
                    };
                    let slot = parse_target_handle(&id, &handle).ok_or_else(|| {
                        invalid(format!("weight key '{}' is not a handle of this node", handle))
                    })?;
                    if let Some(previous) = keys.get(&slot) {
                        return Err(invalid(format!(
                            "weight keys '{}' and '{}' both name slot {}",
                            previous, handle, slot
                        )));
                    }
                    keys.insert(slot, handle);
                    weights.insert(slot, weight);
                }
                NodeSettings::Average(AverageSettings {
                    weights,
                    percentage_mode: raw.percentage_mode,
                })
            }
        };

        Ok(GraphNode::new(id, settings))
    }
}

fn parse_settings<T: DeserializeOwned>(
    node_id: &str,
    settings: Option<serde_json::Value>,
) -> Result<T, ConversionError> {
    let value = settings.ok_or_else(|| ConversionError::MissingSettings(node_id.to_string()))?;
    serde_json::from_value(value).map_err(|e| ConversionError::InvalidSettings {
        node_id: node_id.to_string(),
        message: e.to_string(),
    })
}

fn convert_edge(edge: UiEdge) -> Result<GraphEdge, ConversionError> {
    let target_slot = match edge.target_handle.as_deref() {
        None => 0,
        Some(handle) => parse_target_handle(&edge.target, handle).ok_or_else(|| {
            invalid_handle(&edge, &edge.target, handle)
        })?,
    };
    let source_output = match edge.source_handle.as_deref() {
        None => 0,
        Some(handle) => parse_source_handle(&edge.source, handle).ok_or_else(|| {
            invalid_handle(&edge, &edge.source, handle)
        })?,
    };

    let mut converted = GraphEdge::new(edge.source, edge.target, target_slot);
    converted.source_output = source_output;
    if let Some(id) = edge.id {
        converted.id = id;
    }
    Ok(converted)
}

fn invalid_handle(edge: &UiEdge, node_id: &str, handle: &str) -> ConversionError {
    ConversionError::InvalidHandle {
        edge_id: edge
            .id
            .clone()
            .unwrap_or_else(|| format!("{}-{}", edge.source, edge.target)),
        node_id: node_id.to_string(),
        handle: handle.to_string(),
    }
}

/// `"<node>"` is slot 0, `"<node>-<n>"` is slot `n`.
pub fn parse_target_handle(node_id: &str, handle: &str) -> Option<SlotIndex> {
    if handle == node_id {
        return Some(0);
    }
    handle
        .strip_prefix(node_id)?
        .strip_prefix('-')?
        .parse()
        .ok()
}

/// `"<node>"` and `"<node>-source"` are output 0, `"<node>-<n>-source"` is output `n`.
pub fn parse_source_handle(node_id: &str, handle: &str) -> Option<u32> {
    if handle == node_id {
        return Some(0);
    }
    let rest = handle.strip_prefix(node_id)?.strip_suffix("-source")?;
    if rest.is_empty() {
        return Some(0);
    }
    rest.strip_prefix('-')?.parse().ok()
}

impl IntoGraph for UiGraph {
    fn into_graph(self) -> Result<GraphStructure, ConversionError> {
        GraphImporter::default().import(self)
    }
}
