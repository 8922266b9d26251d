//! Common test utilities for building grading models and inputs.
use gradeflow::graph::{
    AverageSettings, OnFailSetting, SourceSettings, StepOutput, StepperSettings,
};
use gradeflow::prelude::*;
use std::collections::BTreeMap;

/// A source node. With `min_points`, falling below it fails the course.
#[allow(dead_code)]
pub fn source(id: &str, min_points: Option<f64>) -> GraphNode {
    GraphNode::new(
        id,
        NodeSettings::Source(SourceSettings {
            min_points,
            on_fail: OnFailSetting::CourseFail,
        }),
    )
}

#[allow(dead_code)]
pub fn average(weights: &[f64]) -> NodeSettings {
    NodeSettings::Average(AverageSettings {
        weights: weights
            .iter()
            .enumerate()
            .map(|(slot, w)| (slot as u32, *w))
            .collect::<BTreeMap<_, _>>(),
        percentage_mode: false,
    })
}

/// The usual 0-5 grade scale over a 0-10 average.
#[allow(dead_code)]
pub fn grade_stepper() -> NodeSettings {
    NodeSettings::Stepper(StepperSettings {
        num_steps: 6,
        output_values: (0..6).map(|g| StepOutput::Value(g as f64)).collect(),
        middle_points: vec![1.7, 3.3, 5.0, 6.7, 8.3],
    })
}

/// Creates the standard course model.
///
/// Logic: `s1, s2, s3` -> equal `average` -> 6-step `stepper` -> `sink`.
/// `s1` fails the course below 5 points.
#[allow(dead_code)]
pub fn create_course_graph() -> GraphStructure {
    GraphStructure::new(
        vec![
            source("s1", Some(5.0)),
            source("s2", None),
            source("s3", None),
            GraphNode::new("average", average(&[1.0, 1.0, 1.0])),
            GraphNode::new("stepper", grade_stepper()),
            GraphNode::new("sink", NodeSettings::Sink),
        ],
        vec![
            GraphEdge::new("s1", "average", 0),
            GraphEdge::new("s2", "average", 1),
            GraphEdge::new("s3", "average", 2),
            GraphEdge::new("average", "stepper", 0),
            GraphEdge::new("stepper", "sink", 0),
        ],
    )
}

/// Creates a model with two independent branches.
///
/// Logic: `(a1 + a2)` and `(b1 + b2)` -> equal `total` average -> `sink`.
/// `a1` fails the course below 5 points.
#[allow(dead_code)]
pub fn create_branched_graph() -> GraphStructure {
    GraphStructure::new(
        vec![
            source("a1", Some(5.0)),
            source("a2", None),
            source("b1", None),
            source("b2", None),
            GraphNode::new("exams", NodeSettings::Addition),
            GraphNode::new("project", NodeSettings::Addition),
            GraphNode::new("total", average(&[1.0, 1.0])),
            GraphNode::new("sink", NodeSettings::Sink),
        ],
        vec![
            GraphEdge::new("a1", "exams", 0),
            GraphEdge::new("a2", "exams", 1),
            GraphEdge::new("b1", "project", 0),
            GraphEdge::new("b2", "project", 1),
            GraphEdge::new("exams", "total", 0),
            GraphEdge::new("project", "total", 1),
            GraphEdge::new("total", "sink", 0),
        ],
    )
}

#[allow(dead_code)]
pub fn inputs(values: &[(&str, f64)]) -> InputMap {
    values.iter().map(|(id, v)| (id.to_string(), *v)).collect()
}

/// A graph as saved by the editor: two exercises summed, gated by minimum points,
/// then rounded into the final grade. Uses the editor's legacy type names.
#[allow(dead_code)]
pub fn create_editor_json() -> &'static str {
    r#"{
        "nodes": [
            {"id": "final-grade", "type": "grade", "position": {"x": 0, "y": 0}, "data": {}},
            {"id": "source-1", "type": "attainment", "position": {"x": 0, "y": 0}, "data": {}},
            {"id": "source-2", "type": "attainment", "position": {"x": 0, "y": 0}, "data": {}},
            {"id": "average", "type": "average", "position": {"x": 0, "y": 0}, "data": {}},
            {"id": "gate", "type": "minpoints", "position": {"x": 0, "y": 0}, "data": {}},
            {"id": "round", "type": "round", "position": {"x": 0, "y": 0}, "data": {}}
        ],
        "edges": [
            {"id": "e1", "source": "source-1", "target": "average",
             "sourceHandle": "source-1-source", "targetHandle": "average-0"},
            {"id": "e2", "source": "source-2", "target": "average",
             "sourceHandle": "source-2-source", "targetHandle": "average-1"},
            {"id": "e3", "source": "average", "target": "gate",
             "sourceHandle": "average-source", "targetHandle": "gate"},
            {"id": "e4", "source": "gate", "target": "round",
             "sourceHandle": "gate-source", "targetHandle": "round"},
            {"id": "e5", "source": "round", "target": "final-grade",
             "sourceHandle": "round-source", "targetHandle": "final-grade"}
        ],
        "nodeData": {
            "final-grade": {"title": "Final grade"},
            "source-1": {"title": "Exercises", "settings": {"minPoints": null, "onFailSetting": "coursefail"}},
            "source-2": {"title": "Exam", "settings": {"minPoints": 10, "onFailSetting": "ignore"}},
            "average": {"title": "Average", "settings": {"weights": {"average-0": 25, "average-1": 75}, "percentageMode": true}},
            "gate": {"title": "Pass limit", "settings": {"minPoints": 2, "onFailSetting": "coursefail"}},
            "round": {"title": "Round", "settings": {"roundingSetting": "round-closest"}}
        }
    }"#
}

/// An importer that understands the editor's legacy type names.
#[allow(dead_code)]
pub fn editor_importer() -> GraphImporter {
    GraphImporter::builder()
        .with_type_mapping("attainment", "source")
        .with_type_mapping("grade", "sink")
        .build()
}
