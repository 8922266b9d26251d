//! Unit tests for core gradeflow types.
mod common;
use gradeflow::graph::{
    MinPointsSettings, OnFailSetting, RoundSettings, RoundingSetting, StepOutput, StepperSettings,
};
use gradeflow::prelude::*;
use gradeflow::trace::FailureCause;

#[test]
fn test_value_display() {
    assert_eq!(format!("{}", NumberOrFail::Number(42.0)), "42");
    assert_eq!(format!("{}", NumberOrFail::Number(4.25)), "4.25");
    assert_eq!(format!("{}", NumberOrFail::Fail), "fail");
    assert_eq!(format!("{}", PartialValue::Unevaluable), "-");
}

#[test]
fn test_partial_value_conversion() {
    assert_eq!(PartialValue::from(NumberOrFail::Fail), PartialValue::Fail);
    assert_eq!(PartialValue::Number(3.0).known(), Some(NumberOrFail::Number(3.0)));
    assert_eq!(PartialValue::Unevaluable.known(), None);
    assert!(PartialValue::Unevaluable.is_unevaluable());
}

#[test]
fn test_node_kind_names() {
    for kind in NodeKind::ALL {
        assert_eq!(NodeKind::from_name(kind.name()), Some(kind));
    }
    assert_eq!(NodeKind::from_name("attainment"), None);
    assert_eq!(NodeKind::MinPoints.to_string(), "minpoints");
}

#[test]
fn test_settings_serde_shape() {
    let stepper: StepperSettings = serde_json::from_str(
        r#"{"numSteps": 2, "outputValues": [0, "same"], "middlePoints": [50]}"#,
    )
    .unwrap();
    assert_eq!(stepper.output_values, vec![StepOutput::Value(0.0), StepOutput::Same]);
    let json = serde_json::to_value(&stepper).unwrap();
    assert_eq!(json["outputValues"][1], "same");

    let gate: MinPointsSettings =
        serde_json::from_str(r#"{"minPoints": 3, "onFailSetting": "fullfail"}"#).unwrap();
    assert_eq!(gate.on_fail, OnFailSetting::CourseFail);
    let gate: MinPointsSettings =
        serde_json::from_str(r#"{"minPoints": 3, "onFailSetting": "fail"}"#).unwrap();
    assert_eq!(gate.on_fail, OnFailSetting::CourseFail);
    assert_eq!(serde_json::to_value(gate.on_fail).unwrap(), "coursefail");

    let round = NodeSettings::Round(RoundSettings {
        mode: RoundingSetting::RoundDown,
    });
    let json = serde_json::to_value(&round).unwrap();
    assert_eq!(json["round"]["roundingSetting"], "round-down");
}

#[test]
fn test_graph_structure_roundtrips_through_json() {
    let graph = common::create_course_graph();
    let json = serde_json::to_string(&graph).unwrap();
    assert!(json.contains("\"targetSlot\":2"));
    let back: GraphStructure = serde_json::from_str(&json).unwrap();
    assert_eq!(back, graph);
    assert_eq!(back.content_hash(), graph.content_hash());
}

#[test]
fn test_trace_formatter() {
    let trace = FailureTrace {
        causes: vec![FailureCause {
            node_id: "exam".to_string(),
            kind: NodeKind::Source,
            value: 11.5,
            min_points: 12.0,
        }],
    };
    assert_eq!(TraceFormatter::format_trace(&trace), "exam (was 11.5) < 12");
}

#[test]
fn test_error_display() {
    let err = GraphError::new(GraphErrorKind::Cycle, "Cycle through A -> B -> A").with_nodes(["A", "B"]);
    assert_eq!(err.to_string(), "cycle: Cycle through A -> B -> A");
    assert!(!err.is_warning());
    assert!(GraphError::new(GraphErrorKind::Reachability, "dead").is_warning());

    let eval_err = EvaluationError::InvalidInput {
        node_id: "s1".to_string(),
        value: f64::INFINITY,
    };
    assert!(eval_err.to_string().contains("s1"));
    assert!(eval_err.to_string().contains("inf"));

    let conv_err = ConversionError::InvalidHandle {
        edge_id: "e1".to_string(),
        node_id: "avg".to_string(),
        handle: "x-1".to_string(),
    };
    assert!(conv_err.to_string().contains("x-1"));
    assert!(conv_err.to_string().contains("avg"));
}
