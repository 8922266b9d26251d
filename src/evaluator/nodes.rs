//! One pure function per node type.
//!
//! Every evaluator receives its inputs already ordered by slot and returns
//! `Fail` as soon as any input is `Fail`, so a single failed requirement can never
//! be compensated by numbers elsewhere in the graph.

use crate::graph::{
    AverageSettings, MaxSettings, NodeSettings, NumberOrFail, OnFailSetting, RoundSettings,
    RoundingSetting, SourceSettings, StepOutput, StepperSettings,
};

/// Evaluates one node of a validated graph.
///
/// Source nodes have no graph inputs; for them `inputs` holds the single
/// externally supplied value.
pub(crate) fn evaluate_node(settings: &NodeSettings, inputs: &[NumberOrFail]) -> NumberOrFail {
    let Some(values) = numbers(inputs) else {
        return NumberOrFail::Fail;
    };

    let result = match settings {
        NodeSettings::Source(source) => return evaluate_source(source, first(&values)),
        NodeSettings::Addition => values.iter().sum(),
        NodeSettings::Average(average) => weighted_average(average, &values),
        NodeSettings::Stepper(stepper) => step(stepper, first(&values)),
        NodeSettings::Sink => first(&values),
        NodeSettings::MinPoints(gate) => {
            return require_min_points(first(&values), Some(gate.min_points), gate.on_fail);
        }
        NodeSettings::Max(MaxSettings { min_value }) => {
            values.iter().copied().fold(*min_value, f64::max)
        }
        NodeSettings::Round(RoundSettings { mode }) => round(*mode, first(&values)),
    };
    NumberOrFail::Number(result)
}

/// A source passes its raw value through unless it falls below `min_points`
/// with the course-fail policy.
pub(crate) fn evaluate_source(settings: &SourceSettings, value: f64) -> NumberOrFail {
    require_min_points(value, settings.min_points, settings.on_fail)
}

fn require_min_points(value: f64, min_points: Option<f64>, on_fail: OnFailSetting) -> NumberOrFail {
    match min_points {
        Some(min) if value < min && on_fail == OnFailSetting::CourseFail => NumberOrFail::Fail,
        _ => NumberOrFail::Number(value),
    }
}

/// `None` if any input failed.
fn numbers(inputs: &[NumberOrFail]) -> Option<Vec<f64>> {
    inputs.iter().map(NumberOrFail::as_number).collect()
}

// Single-input nodes always have slot 0 wired in a validated graph.
fn first(values: &[f64]) -> f64 {
    values.first().copied().unwrap_or_default()
}

/// Weights are normalized by their actual sum, whatever mode the editor shows them in.
///
/// `values` are in slot order and a validated average has exactly one weight per
/// wired slot, so zipping with the ordered weight map pairs them correctly.
/// Weights are scaled by the largest one first so the sum cannot overflow.
fn weighted_average(settings: &AverageSettings, values: &[f64]) -> f64 {
    let largest = settings.weights.values().copied().fold(0.0, f64::max);
    if largest <= 0.0 {
        return 0.0;
    }
    let total: f64 = settings.weights.values().map(|w| w / largest).sum();
    settings
        .weights
        .values()
        .zip(values)
        .map(|(weight, value)| (weight / largest / total) * value)
        .sum()
}

/// Picks the first bucket whose upper breakpoint lies above `x`. A value equal to
/// a breakpoint lands in the higher bucket.
fn step(settings: &StepperSettings, x: f64) -> f64 {
    let bucket = settings
        .middle_points
        .iter()
        .position(|point| x < *point)
        .unwrap_or(settings.middle_points.len());
    match settings.output_values.get(bucket) {
        Some(StepOutput::Value(v)) => *v,
        Some(StepOutput::Same) | None => x,
    }
}

fn round(mode: RoundingSetting, x: f64) -> f64 {
    match mode {
        RoundingSetting::RoundUp => x.ceil(),
        // Halves round towards positive infinity; `x + 0.5` would itself round.
        RoundingSetting::RoundClosest => {
            let floor = x.floor();
            if x - floor >= 0.5 { floor + 1.0 } else { floor }
        }
        RoundingSetting::RoundDown => x.floor(),
    }
}
