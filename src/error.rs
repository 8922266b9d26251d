use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The kind of structural problem found by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GraphErrorKind {
    Cycle,
    SinkCount,
    SlotCollision,
    SlotCompleteness,
    StepperShape,
    AverageWeights,
    Reachability,
    DuplicateNode,
    DanglingEdge,
    InvalidSettings,
}

impl fmt::Display for GraphErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GraphErrorKind::Cycle => "cycle",
            GraphErrorKind::SinkCount => "sink count",
            GraphErrorKind::SlotCollision => "slot collision",
            GraphErrorKind::SlotCompleteness => "slot completeness",
            GraphErrorKind::StepperShape => "stepper shape",
            GraphErrorKind::AverageWeights => "average weights",
            GraphErrorKind::Reachability => "reachability",
            GraphErrorKind::DuplicateNode => "duplicate node",
            GraphErrorKind::DanglingEdge => "dangling edge",
            GraphErrorKind::InvalidSettings => "invalid settings",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The graph cannot be evaluated.
    Error,
    /// The graph evaluates correctly but contains dead sections.
    Warning,
}

/// A structural problem in a grading model graph, with the ids the editor
/// should highlight.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
#[serde(rename_all = "camelCase")]
pub struct GraphError {
    pub kind: GraphErrorKind,
    pub severity: Severity,
    pub node_ids: Vec<String>,
    pub edge_ids: Vec<String>,
    pub message: String,
}

impl GraphError {
    pub fn new(kind: GraphErrorKind, message: impl Into<String>) -> Self {
        let severity = match kind {
            GraphErrorKind::Reachability => Severity::Warning,
            _ => Severity::Error,
        };
        Self {
            kind,
            severity,
            node_ids: Vec::new(),
            edge_ids: Vec::new(),
            message: message.into(),
        }
    }

    pub fn with_nodes<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.node_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_edges<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edge_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

/// Errors that can occur while evaluating a validated graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Missing input values for source nodes: {}", .0.join(", "))]
    MissingInputs(Vec<String>),

    #[error("Input value for source '{node_id}' is not a finite number: {value}")]
    InvalidInput { node_id: String, value: f64 },
}

/// Errors that can occur when converting an editor graph or a template into a
/// `GraphStructure`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Failed to parse graph JSON: {0}")]
    Json(String),

    #[error("Node '{node_id}' has an unregistered or invalid node type: '{type_name}'")]
    UnknownNodeType { node_id: String, type_name: String },

    #[error("Node '{0}' has no settings, but its node type requires them")]
    MissingSettings(String),

    #[error("Node '{node_id}' has invalid settings: {message}")]
    InvalidSettings { node_id: String, message: String },

    #[error("Edge '{edge_id}' uses handle '{handle}', which does not belong to node '{node_id}'")]
    InvalidHandle {
        edge_id: String,
        node_id: String,
        handle: String,
    },

    #[error("Invalid graph: {0}")]
    Invalid(String),
}
