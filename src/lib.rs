//! # gradeflow - Grading Model Validation and Evaluation
//!
//! **gradeflow** turns a course's grading model, drawn as a graph of nodes in an
//! editor, into a final grade. Course parts and tasks are `source` nodes; their
//! points flow through sums, weighted averages, thresholds and steppers into a
//! single `sink` holding the final grade.
//!
//! ## Core Workflow
//!
//! 1.  **Load Your Graph**: Parse the editor's JSON with [`ui::GraphImporter`], build a
//!     [`graph::GraphStructure`] by hand, or implement [`graph::IntoGraph`] for your own format.
//! 2.  **Validate**: [`validator::Validator`] reports every structural problem at once
//!     (cycles, sink count, slot wiring, stepper and weight shapes, unreachable nodes).
//!     Only a [`validator::ValidatedGraph`] can be evaluated.
//! 3.  **Evaluate**: An [`evaluator::Evaluator`] schedules the graph once and evaluates it
//!     against any number of input maps, fully, as a preview over incomplete
//!     inputs, or as a parallel batch.
//!
//! A failed requirement is a value, not an error: `Fail` propagates through every
//! downstream node, so the final grade is either a number or `Fail`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gradeflow::prelude::*;
//!
//! fn main() -> Result<()> {
//!     // A starter model: three course parts, averaged, converted to a 0-5 grade.
//!     let graph = init_graph(GraphTemplate::Average, &[1, 2, 3])?;
//!
//!     let validated = Validator::builder().build().validate(graph).map_err(|errors| {
//!         errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
//!     })?;
//!     let evaluator = Evaluator::new(validated);
//!
//!     let mut inputs = InputMap::new();
//!     inputs.insert(source_node_id(1), 8.0);
//!     inputs.insert(source_node_id(2), 6.0);
//!     inputs.insert(source_node_id(3), 7.0);
//!
//!     let result = evaluator.evaluate(&inputs)?;
//!     println!("-> Final grade: {}", result.final_grade);
//!     println!("-> Reason: {}", result.reason);
//!
//!     // Preview while some points are still missing.
//!     inputs.remove(&source_node_id(3));
//!     let preview = evaluator.evaluate_partial(&inputs)?;
//!     println!("-> Preview: {}", preview.final_grade);
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod evaluator;
pub mod graph;
pub mod prelude;
pub mod scheduler;
pub mod trace;
pub mod ui;
pub mod validator;
