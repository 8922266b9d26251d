//! Explains why an evaluation ended in `Fail`.

use crate::evaluator::InputMap;
use crate::graph::{NodeKind, NodeSettings, PartialValue};
use crate::validator::ValidatedGraph;
use ahash::AHashSet;
use serde::Serialize;

mod formatter;

pub use formatter::TraceFormatter;

/// A node where a failure originated: its input fell below a course-fail threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureCause {
    pub node_id: String,
    pub kind: NodeKind,
    /// The value that was checked against the threshold.
    pub value: f64,
    pub min_points: f64,
}

/// Every failure origin upstream of the sink, in the order they are met walking
/// back from the sink through slot-ordered inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FailureTrace {
    pub causes: Vec<FailureCause>,
}

impl FailureTrace {
    /// Walks back from the sink along `Fail` values. `values` holds one value per
    /// node position, as produced by a single evaluation pass.
    pub fn collect(graph: &ValidatedGraph, values: &[PartialValue], inputs: &InputMap) -> Self {
        let mut causes = Vec::new();
        let mut visited = AHashSet::new();
        let mut stack = vec![graph.sink()];

        while let Some(idx) = stack.pop() {
            if !visited.insert(idx) || values[idx] != PartialValue::Fail {
                continue;
            }
            let node = graph.node(idx);
            let failed_inputs: Vec<usize> = graph
                .inputs(idx)
                .iter()
                .map(|(_, source)| *source)
                .filter(|source| values[*source] == PartialValue::Fail)
                .collect();

            match &node.settings {
                NodeSettings::Source(source) => {
                    if let (Some(value), Some(min_points)) = (inputs.get(&node.id), source.min_points) {
                        causes.push(FailureCause {
                            node_id: node.id.clone(),
                            kind: NodeKind::Source,
                            value: *value,
                            min_points,
                        });
                    }
                }
                NodeSettings::MinPoints(gate) if failed_inputs.is_empty() => {
                    let value = graph
                        .inputs(idx)
                        .first()
                        .and_then(|(_, source)| match values[*source] {
                            PartialValue::Number(n) => Some(n),
                            _ => None,
                        });
                    if let Some(value) = value {
                        causes.push(FailureCause {
                            node_id: node.id.clone(),
                            kind: NodeKind::MinPoints,
                            value,
                            min_points: gate.min_points,
                        });
                    }
                }
                _ => {
                    // Reversed so the lowest slot is visited first.
                    stack.extend(failed_inputs.into_iter().rev());
                }
            }
        }

        Self { causes }
    }

    pub fn is_empty(&self) -> bool {
        self.causes.is_empty()
    }
}
