use super::{FailureCause, FailureTrace};
use crate::graph::value::format_number;
use itertools::Itertools;

/// Formats failure traces into human-readable strings
pub struct TraceFormatter;

impl TraceFormatter {
    /// Format a failure trace into a human-readable explanation, e.g.
    /// `source-1 (was 2) < 5, midterm (was 9.5) < 10`.
    pub fn format_trace(trace: &FailureTrace) -> String {
        if trace.is_empty() {
            return "unknown cause".to_string();
        }
        trace.causes.iter().map(Self::format_cause).join(", ")
    }

    fn format_cause(cause: &FailureCause) -> String {
        format!(
            "{} (was {}) < {}",
            cause.node_id,
            format_number(cause.value),
            format_number(cause.min_points)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKind;

    #[test]
    fn joins_causes_in_order() {
        let trace = FailureTrace {
            causes: vec![
                FailureCause {
                    node_id: "source-1".to_string(),
                    kind: NodeKind::Source,
                    value: 2.0,
                    min_points: 5.0,
                },
                FailureCause {
                    node_id: "gate".to_string(),
                    kind: NodeKind::MinPoints,
                    value: 9.5,
                    min_points: 10.0,
                },
            ],
        };
        assert_eq!(
            TraceFormatter::format_trace(&trace),
            "source-1 (was 2) < 5, gate (was 9.5) < 10"
        );
    }

    #[test]
    fn empty_trace() {
        assert_eq!(TraceFormatter::format_trace(&FailureTrace::default()), "unknown cause");
    }
}
