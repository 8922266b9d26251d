use super::definition::{GraphEdge, GraphNode, GraphStructure};
use super::settings::{
    AverageSettings, NodeSettings, SourceSettings, StepOutput, StepperSettings,
};
use crate::error::ConversionError;
use serde::{Deserialize, Serialize};

pub const SINK_ID: &str = "final-grade";
pub const STEPPER_ID: &str = "stepper";

const GRADE_STEPS: u32 = 6;
const AVERAGE_BREAKPOINTS: [f64; 5] = [1.7, 3.3, 5.0, 6.7, 8.3];

/// Starter layouts offered when a new grading model is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphTemplate {
    /// Sources and the sink only; everything is wired by hand.
    None,
    /// Sources summed, then converted to a 0-5 grade.
    Addition,
    /// Sources averaged with equal percentage weights, then converted to a 0-5 grade.
    Average,
}

/// Node id of the source node representing course part or task `id`.
pub fn source_node_id(id: u32) -> String {
    format!("source-{}", id)
}

/// Builds a starter graph over the given course parts or tasks.
///
/// The `None` template is not evaluable until the sink is connected.
pub fn init_graph(template: GraphTemplate, source_ids: &[u32]) -> Result<GraphStructure, ConversionError> {
    let mut nodes = vec![GraphNode::new(SINK_ID, NodeSettings::Sink)];
    nodes.extend(source_ids.iter().map(|id| {
        GraphNode::new(source_node_id(*id), NodeSettings::Source(SourceSettings::default()))
    }));

    let (middle_id, middle_settings, middle_points) = match template {
        GraphTemplate::None => return Ok(GraphStructure::new(nodes, Vec::new())),
        _ if source_ids.is_empty() => {
            return Err(ConversionError::Invalid(format!(
                "the {:?} template needs at least one source",
                template
            )));
        }
        GraphTemplate::Addition => (
            "addition",
            NodeSettings::Addition,
            addition_breakpoints(source_ids.len()),
        ),
        GraphTemplate::Average => (
            "average",
            NodeSettings::Average(equal_weights(source_ids.len())),
            AVERAGE_BREAKPOINTS.to_vec(),
        ),
    };

    let mut edges: Vec<GraphEdge> = source_ids
        .iter()
        .enumerate()
        .map(|(slot, id)| GraphEdge::new(source_node_id(*id), middle_id, slot as u32))
        .collect();
    edges.push(GraphEdge::new(middle_id, STEPPER_ID, 0));
    edges.push(GraphEdge::new(STEPPER_ID, SINK_ID, 0));

    nodes.push(GraphNode::new(middle_id, middle_settings));
    nodes.push(GraphNode::new(
        STEPPER_ID,
        NodeSettings::Stepper(StepperSettings {
            num_steps: GRADE_STEPS,
            output_values: (0..GRADE_STEPS).map(|g| StepOutput::Value(g as f64)).collect(),
            middle_points,
        }),
    ));

    Ok(GraphStructure::new(nodes, edges))
}

fn equal_weights(count: usize) -> AverageSettings {
    let weight = round_to_tenth(100.0 / count as f64);
    AverageSettings {
        weights: (0..count as u32).map(|slot| (slot, weight)).collect(),
        percentage_mode: true,
    }
}

/// Evenly spaced breakpoints over a sum of `count` ten-point sources.
fn addition_breakpoints(count: usize) -> Vec<f64> {
    (1..GRADE_STEPS)
        .map(|step| round_to_tenth(step as f64 * 10.0 * count as f64 / GRADE_STEPS as f64))
        .collect()
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_breakpoints_scale_with_source_count() {
        assert_eq!(addition_breakpoints(1), vec![1.7, 3.3, 5.0, 6.7, 8.3]);
        assert_eq!(addition_breakpoints(3), vec![5.0, 10.0, 15.0, 20.0, 25.0]);
    }

    #[test]
    fn average_weights_split_one_hundred_percent() {
        let settings = equal_weights(3);
        assert!(settings.percentage_mode);
        assert_eq!(settings.weights.len(), 3);
        assert!(settings.weights.values().all(|w| *w == 33.3));
    }

    #[test]
    fn empty_sources_are_rejected_for_wired_templates() {
        assert!(init_graph(GraphTemplate::Average, &[]).is_err());
        assert!(init_graph(GraphTemplate::None, &[]).is_ok());
    }
}
