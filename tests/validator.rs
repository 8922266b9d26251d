//! Tests for structural validation of grading models.
mod common;
use common::*;
use gradeflow::error::Severity;
use gradeflow::graph::{StepOutput, StepperSettings};
use gradeflow::prelude::*;

fn kinds(errors: &[GraphError]) -> Vec<GraphErrorKind> {
    errors.iter().map(|e| e.kind).collect()
}

fn errors_of(graph: GraphStructure) -> Vec<GraphError> {
    validate(graph).expect_err("graph should be rejected")
}

#[test]
fn test_course_graph_is_valid() {
    let validated = validate(create_course_graph()).unwrap();
    assert!(validated.warnings().is_empty());
    assert_eq!(validated.sink_node().id, "sink");
    assert_eq!(validated.required_sources(), vec!["s1", "s2", "s3"]);
}

#[test]
fn test_cycle_is_reported_with_its_nodes() {
    let graph = GraphStructure::new(
        vec![
            source("s", None),
            GraphNode::new("A", NodeSettings::Addition),
            GraphNode::new("B", NodeSettings::Addition),
            GraphNode::new("C", NodeSettings::Addition),
            GraphNode::new("sink", NodeSettings::Sink),
        ],
        vec![
            GraphEdge::new("s", "A", 0),
            GraphEdge::new("C", "A", 1),
            GraphEdge::new("A", "B", 0),
            GraphEdge::new("B", "C", 0),
            GraphEdge::new("C", "sink", 0),
        ],
    );
    let errors = errors_of(graph);

    let cycles: Vec<&GraphError> = errors.iter().filter(|e| e.kind == GraphErrorKind::Cycle).collect();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].node_ids, vec!["A", "B", "C"]);
    assert_eq!(cycles[0].edge_ids.len(), 3);
    assert!(cycles[0].message.contains("A -> B -> C -> A"));
}

#[test]
fn test_self_loop_is_a_cycle() {
    let mut graph = create_course_graph();
    graph.nodes.push(GraphNode::new("loop", NodeSettings::Addition));
    graph.edges.push(GraphEdge::new("loop", "loop", 0));

    let errors = errors_of(graph);
    let cycle = errors.iter().find(|e| e.kind == GraphErrorKind::Cycle).unwrap();
    assert_eq!(cycle.node_ids, vec!["loop"]);
}

#[test]
fn test_missing_and_duplicate_sinks() {
    let mut graph = create_course_graph();
    graph.nodes.retain(|n| n.id != "sink");
    graph.edges.retain(|e| e.target != "sink");
    assert!(kinds(&errors_of(graph)).contains(&GraphErrorKind::SinkCount));

    let mut graph = create_course_graph();
    graph.nodes.push(GraphNode::new("sink-2", NodeSettings::Sink));
    let errors = errors_of(graph);
    let sink_error = errors.iter().find(|e| e.kind == GraphErrorKind::SinkCount).unwrap();
    assert_eq!(sink_error.node_ids, vec!["sink", "sink-2"]);
}

#[test]
fn test_unconnected_sink_is_rejected() {
    let mut graph = create_course_graph();
    graph.edges.retain(|e| e.target != "sink");
    let errors = errors_of(graph);
    assert!(
        errors
            .iter()
            .any(|e| e.kind == GraphErrorKind::SinkCount && e.node_ids == vec!["sink"])
    );
}

#[test]
fn test_slot_collision() {
    let mut graph = create_course_graph();
    // s3 now also claims slot 1 of the average.
    graph.edges[2].target_slot = 1;
    let errors = errors_of(graph);

    let collision = errors
        .iter()
        .find(|e| e.kind == GraphErrorKind::SlotCollision)
        .unwrap();
    assert_eq!(collision.node_ids, vec!["average"]);
    assert_eq!(collision.edge_ids.len(), 2);
    // Slot 2 has a weight but no edge any more.
    assert!(kinds(&errors).contains(&GraphErrorKind::SlotCompleteness));
}

#[test]
fn test_single_input_nodes_only_accept_slot_zero() {
    let mut graph = create_course_graph();
    graph.edges[3].target_slot = 1; // average -> stepper slot 1
    let errors = errors_of(graph);

    let incomplete: Vec<&GraphError> = errors
        .iter()
        .filter(|e| e.kind == GraphErrorKind::SlotCompleteness)
        .collect();
    assert_eq!(incomplete.len(), 2, "{:?}", incomplete);
    assert!(incomplete.iter().all(|e| e.node_ids == vec!["stepper"]));
}

#[test]
fn test_source_cannot_have_inputs() {
    let mut graph = create_course_graph();
    graph.edges.push(GraphEdge::new("s2", "s1", 0));
    let errors = errors_of(graph);
    assert!(
        errors
            .iter()
            .any(|e| e.kind == GraphErrorKind::SlotCompleteness && e.node_ids == vec!["s1"])
    );
}

#[test]
fn test_stepper_shape() {
    let mut graph = create_course_graph();
    graph.nodes[4].settings = NodeSettings::Stepper(StepperSettings {
        num_steps: 3,
        output_values: vec![StepOutput::Value(0.0), StepOutput::Value(1.0)],
        middle_points: vec![5.0, 2.0],
    });
    let errors = errors_of(graph);

    let shape: Vec<&GraphError> = errors
        .iter()
        .filter(|e| e.kind == GraphErrorKind::StepperShape)
        .collect();
    // Wrong output count and descending middle points.
    assert_eq!(shape.len(), 2, "{:?}", shape);
    assert!(shape.iter().all(|e| e.node_ids == vec!["stepper"]));
}

#[test]
fn test_average_weights() {
    let mut graph = create_course_graph();
    graph.nodes[3].settings = average(&[1.0, -2.0, 1.0]);
    assert!(kinds(&errors_of(graph)).contains(&GraphErrorKind::AverageWeights));

    let mut graph = create_course_graph();
    graph.nodes[3].settings = average(&[0.0, 0.0, 0.0]);
    assert!(kinds(&errors_of(graph)).contains(&GraphErrorKind::AverageWeights));
}

#[test]
fn test_duplicate_ids_and_dangling_edges() {
    let mut graph = create_course_graph();
    graph.nodes.push(source("s2", None));
    graph.edges.push(GraphEdge::new("ghost", "average", 7));
    let errors = errors_of(graph);

    let duplicate = errors.iter().find(|e| e.kind == GraphErrorKind::DuplicateNode).unwrap();
    assert_eq!(duplicate.node_ids, vec!["s2"]);
    let dangling = errors.iter().find(|e| e.kind == GraphErrorKind::DanglingEdge).unwrap();
    assert_eq!(dangling.edge_ids, vec!["ghost-average:7"]);
    assert!(dangling.message.contains("ghost"));
}

#[test]
fn test_unreachable_node_is_a_warning() {
    let mut graph = create_course_graph();
    graph.nodes.push(source("extra", None));

    let validated = validate(graph.clone()).unwrap();
    assert_eq!(validated.warnings().len(), 1);
    let warning = &validated.warnings()[0];
    assert_eq!(warning.kind, GraphErrorKind::Reachability);
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(warning.node_ids, vec!["extra"]);
    // The dead source is not needed for evaluation.
    assert_eq!(validated.required_sources(), vec!["s1", "s2", "s3"]);

    let strict = Validator::builder().warnings_as_errors(true).build();
    let errors = strict.validate(graph).unwrap_err();
    assert_eq!(kinds(&errors), vec![GraphErrorKind::Reachability]);
}

#[test]
fn test_all_errors_are_reported_at_once() {
    let mut graph = create_course_graph();
    graph.nodes[3].settings = average(&[0.0, 0.0, 0.0]);
    graph.edges.push(GraphEdge::new("stepper", "average", 3));
    graph.nodes.push(GraphNode::new("sink-2", NodeSettings::Sink));
    let errors = errors_of(graph);

    let found = kinds(&errors);
    for expected in [
        GraphErrorKind::AverageWeights,
        GraphErrorKind::SlotCompleteness,
        GraphErrorKind::Cycle,
        GraphErrorKind::SinkCount,
    ] {
        assert!(found.contains(&expected), "missing {:?} in {:?}", expected, found);
    }
}

#[test]
fn test_templates_validate_cleanly() {
    for template in [GraphTemplate::Addition, GraphTemplate::Average] {
        let graph = init_graph(template, &[1, 2, 3, 4]).unwrap();
        let validated = validate(graph).unwrap();
        assert!(validated.warnings().is_empty(), "{:?}", template);
    }

    // Without wiring the sink has no input and the sources are dead.
    let errors = errors_of(init_graph(GraphTemplate::None, &[1, 2]).unwrap());
    assert_eq!(
        kinds(&errors),
        vec![
            GraphErrorKind::SinkCount,
            GraphErrorKind::Reachability,
            GraphErrorKind::Reachability
        ]
    );
}

#[test]
fn test_errors_serialize_for_the_editor() {
    let errors = errors_of(GraphStructure::default());
    let json = serde_json::to_value(&errors[0]).unwrap();
    assert_eq!(json["kind"], "sinkCount");
    assert_eq!(json["severity"], "error");
    assert!(json["nodeIds"].as_array().unwrap().is_empty());
}
