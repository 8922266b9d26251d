use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Index of a numbered input slot on a node.
pub type SlotIndex = u32;

/// The closed set of node types a grading model can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Source,
    Addition,
    Average,
    Stepper,
    Sink,
    MinPoints,
    Max,
    Round,
}

impl NodeKind {
    pub const ALL: [NodeKind; 8] = [
        NodeKind::Source,
        NodeKind::Addition,
        NodeKind::Average,
        NodeKind::Stepper,
        NodeKind::Sink,
        NodeKind::MinPoints,
        NodeKind::Max,
        NodeKind::Round,
    ];

    /// The canonical type name used by the graph editor.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Source => "source",
            NodeKind::Addition => "addition",
            NodeKind::Average => "average",
            NodeKind::Stepper => "stepper",
            NodeKind::Sink => "sink",
            NodeKind::MinPoints => "minpoints",
            NodeKind::Max => "max",
            NodeKind::Round => "round",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happens when a value falls below its minimum points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OnFailSetting {
    /// The node outputs `Fail`, which fails everything downstream.
    #[serde(rename = "coursefail", alias = "fullfail", alias = "fail")]
    CourseFail,
    /// The raw value passes through unchanged.
    #[serde(rename = "ignore")]
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundingSetting {
    #[serde(rename = "round-up")]
    RoundUp,
    #[serde(rename = "round-closest")]
    RoundClosest,
    #[serde(rename = "round-down")]
    RoundDown,
}

/// Settings of a leaf node representing one course part or task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSettings {
    pub min_points: Option<f64>,
    #[serde(rename = "onFailSetting")]
    pub on_fail: OnFailSetting,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            min_points: None,
            on_fail: OnFailSetting::CourseFail,
        }
    }
}

/// Weighted average over the wired slots.
///
/// `percentage_mode` only changes how the editor presents the weights; the
/// evaluator always divides by the actual weight sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageSettings {
    pub weights: BTreeMap<SlotIndex, f64>,
    pub percentage_mode: bool,
}

/// Output of one stepper bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawStepOutput", into = "RawStepOutput")]
pub enum StepOutput {
    Value(f64),
    /// The stepper's input passes through unchanged.
    Same,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum RawStepOutput {
    Value(f64),
    Keyword(StepKeyword),
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StepKeyword {
    Same,
}

impl From<RawStepOutput> for StepOutput {
    fn from(raw: RawStepOutput) -> Self {
        match raw {
            RawStepOutput::Value(v) => StepOutput::Value(v),
            RawStepOutput::Keyword(StepKeyword::Same) => StepOutput::Same,
        }
    }
}

impl From<StepOutput> for RawStepOutput {
    fn from(output: StepOutput) -> Self {
        match output {
            StepOutput::Value(v) => RawStepOutput::Value(v),
            StepOutput::Same => RawStepOutput::Keyword(StepKeyword::Same),
        }
    }
}

impl Hash for StepOutput {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        if let StepOutput::Value(v) = self {
            v.to_bits().hash(state);
        }
    }
}

/// Piecewise-constant quantization into `num_steps` buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepperSettings {
    pub num_steps: u32,
    pub output_values: Vec<StepOutput>,
    pub middle_points: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinPointsSettings {
    pub min_points: f64,
    #[serde(rename = "onFailSetting")]
    pub on_fail: OnFailSetting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxSettings {
    pub min_value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSettings {
    #[serde(rename = "roundingSetting")]
    pub mode: RoundingSetting,
}

/// Per-node configuration. The variant determines the node's type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeSettings {
    Source(SourceSettings),
    Addition,
    Average(AverageSettings),
    Stepper(StepperSettings),
    Sink,
    #[serde(rename = "minpoints")]
    MinPoints(MinPointsSettings),
    Max(MaxSettings),
    Round(RoundSettings),
}

impl NodeSettings {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeSettings::Source(_) => NodeKind::Source,
            NodeSettings::Addition => NodeKind::Addition,
            NodeSettings::Average(_) => NodeKind::Average,
            NodeSettings::Stepper(_) => NodeKind::Stepper,
            NodeSettings::Sink => NodeKind::Sink,
            NodeSettings::MinPoints(_) => NodeKind::MinPoints,
            NodeSettings::Max(_) => NodeKind::Max,
            NodeSettings::Round(_) => NodeKind::Round,
        }
    }
}

// Floats are hashed by their bit pattern so graphs can be keyed by content.
impl Hash for NodeSettings {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            NodeSettings::Source(s) => {
                s.min_points.map(f64::to_bits).hash(state);
                s.on_fail.hash(state);
            }
            NodeSettings::Average(s) => {
                for (slot, weight) in &s.weights {
                    slot.hash(state);
                    weight.to_bits().hash(state);
                }
                s.percentage_mode.hash(state);
            }
            NodeSettings::Stepper(s) => {
                s.num_steps.hash(state);
                s.output_values.hash(state);
                for point in &s.middle_points {
                    point.to_bits().hash(state);
                }
            }
            NodeSettings::MinPoints(s) => {
                s.min_points.to_bits().hash(state);
                s.on_fail.hash(state);
            }
            NodeSettings::Max(s) => s.min_value.to_bits().hash(state),
            NodeSettings::Round(s) => s.hash(state),
            NodeSettings::Addition | NodeSettings::Sink => {}
        }
    }
}
