//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the gradeflow crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use gradeflow::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/graph.json")?;
//! let graph = GraphImporter::default().from_json(&json)?;
//!
//! let evaluator = ModelCache::new()
//!     .get_or_compile(&graph)
//!     .map_err(|errors| format!("{} problems in grading model", errors.len()))?;
//!
//! let inputs: InputMap = serde_json::from_str(&std::fs::read_to_string("path/to/points.json")?)?;
//! let result = evaluator.evaluate(&inputs)?;
//!
//! println!("Evaluation Result: {:?}", result);
//! # Ok(())
//! # }
//! ```

// Validation and evaluation
pub use crate::cache::ModelCache;
pub use crate::evaluator::{EvaluationResult, Evaluator, InputMap, PartialEvaluation};
pub use crate::scheduler::Schedule;
pub use crate::validator::{ValidatedGraph, Validator, ValidatorBuilder, validate};

// Graph model
pub use crate::graph::{
    GraphEdge, GraphNode, GraphStructure, GraphTemplate, IntoGraph, NodeKind, NodeSettings,
    NumberOrFail, PartialValue, init_graph, source_node_id,
};

// Editor import
pub use crate::ui::{GraphImporter, UiGraph};

// Error types
pub use crate::error::{ConversionError, EvaluationError, GraphError, GraphErrorKind};

// Trace formatting
pub use crate::trace::{FailureTrace, TraceFormatter};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
