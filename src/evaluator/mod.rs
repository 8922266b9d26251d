use crate::error::EvaluationError;
use crate::graph::{NodeSettings, NumberOrFail, PartialValue};
use crate::scheduler::Schedule;
use crate::trace::{FailureTrace, TraceFormatter};
use crate::validator::ValidatedGraph;
use ahash::AHashMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, trace};

mod nodes;

use nodes::evaluate_node;

/// Externally supplied values for `Source` nodes, keyed by node id.
pub type InputMap = AHashMap<String, f64>;

/// The result of a full evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    /// The value of the sink node.
    pub final_grade: NumberOrFail,
    /// Every node's value. Nodes that do not reach the sink are left out when
    /// their inputs are missing.
    pub node_values: AHashMap<String, NumberOrFail>,
    /// A human-readable explanation of the final grade.
    pub reason: String,
}

impl EvaluationResult {
    pub fn is_fail(&self) -> bool {
        self.final_grade.is_fail()
    }
}

/// The result of a preview evaluation over possibly incomplete inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialEvaluation {
    pub final_grade: PartialValue,
    pub node_values: AHashMap<String, PartialValue>,
}

impl PartialEvaluation {
    pub fn get(&self, node_id: &str) -> Option<PartialValue> {
        self.node_values.get(node_id).copied()
    }
}

/// Evaluates a validated grading model against runtime input values.
///
/// An `Evaluator` holds the validated graph and its schedule, both computed once.
/// It holds no mutable state and can be shared freely across threads to evaluate
/// different students' inputs.
#[derive(Debug, Clone)]
pub struct Evaluator {
    graph: ValidatedGraph,
    schedule: Schedule,
}

impl Evaluator {
    pub fn new(graph: ValidatedGraph) -> Self {
        let schedule = Schedule::new(&graph);
        Self { graph, schedule }
    }

    pub fn graph(&self) -> &ValidatedGraph {
        &self.graph
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Computes the final grade from a complete set of inputs.
    ///
    /// # Returns
    ///
    /// * `Ok(EvaluationResult)`: the final grade, which is `Fail` when any
    ///   course-fail requirement upstream of the sink is not met.
    /// * `Err(EvaluationError)`: if a source that contributes to the final grade
    ///   has no value, or a supplied value is not finite.
    pub fn evaluate(&self, inputs: &InputMap) -> Result<EvaluationResult, EvaluationError> {
        let missing: Vec<String> = self
            .graph
            .required_sources()
            .into_iter()
            .filter(|id| !inputs.contains_key(*id))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(EvaluationError::MissingInputs(missing));
        }

        let values = self.run(inputs)?;
        let final_grade = values[self.graph.sink()]
            .known()
            .ok_or_else(|| EvaluationError::MissingInputs(Vec::new()))?;

        let reason = match final_grade {
            NumberOrFail::Fail => {
                let trace = FailureTrace::collect(&self.graph, &values, inputs);
                format!("Failed: {}", TraceFormatter::format_trace(&trace))
            }
            NumberOrFail::Number(_) => format!("Final grade {}", final_grade),
        };

        let node_values = values
            .iter()
            .enumerate()
            .filter_map(|(idx, value)| Some((self.graph.node(idx).id.clone(), value.known()?)))
            .collect();

        Ok(EvaluationResult {
            final_grade,
            node_values,
            reason,
        })
    }

    /// Computes as much of the graph as the given inputs allow.
    ///
    /// Sources missing from `inputs` are `Unevaluable`, and so is every node that
    /// depends on them, unless one of its other inputs already failed: a known
    /// failure is reported even when other branches are still unknown.
    pub fn evaluate_partial(&self, inputs: &InputMap) -> Result<PartialEvaluation, EvaluationError> {
        let values = self.run(inputs)?;
        Ok(PartialEvaluation {
            final_grade: values[self.graph.sink()],
            node_values: values
                .iter()
                .enumerate()
                .map(|(idx, value)| (self.graph.node(idx).id.clone(), *value))
                .collect(),
        })
    }

    /// Evaluates many independent input sets in parallel, e.g. one per student.
    /// Results are returned in the order of `batch`.
    pub fn evaluate_batch<K>(
        &self,
        batch: &[(K, InputMap)],
    ) -> Vec<(K, Result<EvaluationResult, EvaluationError>)>
    where
        K: Clone + Send + Sync,
    {
        debug!(size = batch.len(), "evaluating batch");
        batch
            .par_iter()
            .map(|(key, inputs)| (key.clone(), self.evaluate(inputs)))
            .collect()
    }

    /// Like [`Evaluator::evaluate_batch`], but previews each input set with
    /// [`Evaluator::evaluate_partial`].
    pub fn evaluate_partial_batch<K>(
        &self,
        batch: &[(K, InputMap)],
    ) -> Vec<(K, Result<PartialEvaluation, EvaluationError>)>
    where
        K: Clone + Send + Sync,
    {
        debug!(size = batch.len(), "previewing batch");
        batch
            .par_iter()
            .map(|(key, inputs)| (key.clone(), self.evaluate_partial(inputs)))
            .collect()
    }

    /// Walks the schedule once, producing a value per node position.
    fn run(&self, inputs: &InputMap) -> Result<Vec<PartialValue>, EvaluationError> {
        let mut values = vec![PartialValue::Unevaluable; self.graph.len()];

        for &idx in self.schedule.order() {
            let node = self.graph.node(idx);
            let value = match &node.settings {
                NodeSettings::Source(_) => match inputs.get(&node.id) {
                    Some(v) if !v.is_finite() => {
                        return Err(EvaluationError::InvalidInput {
                            node_id: node.id.clone(),
                            value: *v,
                        });
                    }
                    Some(v) => evaluate_node(&node.settings, &[NumberOrFail::Number(*v)]).into(),
                    None => PartialValue::Unevaluable,
                },
                settings => {
                    let node_inputs: Vec<PartialValue> = self
                        .graph
                        .inputs(idx)
                        .iter()
                        .map(|(_, source)| values[*source])
                        .collect();
                    combine(settings, &node_inputs)
                }
            };
            trace!(node = %node.id, kind = %node.kind(), %value, "evaluated node");
            values[idx] = value;
        }

        Ok(values)
    }
}

/// Fail dominates unevaluable; only fully known inputs reach the node evaluator.
fn combine(settings: &NodeSettings, inputs: &[PartialValue]) -> PartialValue {
    if inputs.contains(&PartialValue::Fail) {
        return PartialValue::Fail;
    }
    let known: Option<Vec<NumberOrFail>> = inputs.iter().map(|v| v.known()).collect();
    match known {
        Some(known) => evaluate_node(settings, &known).into(),
        None => PartialValue::Unevaluable,
    }
}
