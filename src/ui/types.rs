use ahash::AHashMap;
use serde::Deserialize;

/// Per-node data stored next to the editor's node list
#[derive(Debug, Deserialize, Clone, Default)]
pub struct UiNodeData {
    #[serde(default)]
    pub title: String,
    /// Raw settings JSON; its shape depends on the node type
    #[serde(default)]
    pub settings: Option<serde_json::Value>,
}

/// UI node with ID and type name. Layout fields are ignored.
#[derive(Debug, Deserialize, Clone)]
pub struct UiNode {
    pub id: String,
    #[serde(rename = "type", default)]
    pub node_type: Option<String>,
}

/// UI edge connecting two node handles
#[derive(Debug, Deserialize, Clone)]
pub struct UiEdge {
    #[serde(default)]
    pub id: Option<String>,
    pub source: String,
    #[serde(alias = "sourceHandle", default)]
    pub source_handle: Option<String>,
    pub target: String,
    #[serde(alias = "targetHandle", default)]
    pub target_handle: Option<String>,
}

/// Complete graph as saved by the editor
#[derive(Debug, Deserialize, Clone)]
pub struct UiGraph {
    pub nodes: Vec<UiNode>,
    pub edges: Vec<UiEdge>,
    #[serde(alias = "nodeData", default)]
    pub node_data: AHashMap<String, UiNodeData>,
}

/// Average settings as the editor stores them, with weights keyed by target handle.
#[derive(Debug, Deserialize)]
pub(super) struct UiAverageSettings {
    pub weights: AHashMap<String, f64>,
    #[serde(alias = "percentageMode", default)]
    pub percentage_mode: bool,
}
