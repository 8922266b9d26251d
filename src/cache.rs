//! Compiled grading models, shared across evaluations.
//!
//! Validation and scheduling only depend on the graph, so a service evaluating
//! many students against the same model does that work once. Entries are keyed by
//! [`GraphStructure::content_hash`] and a hit is confirmed by comparing graphs,
//! so an edited model never reuses a stale entry.

use crate::error::GraphError;
use crate::evaluator::Evaluator;
use crate::graph::GraphStructure;
use crate::validator::Validator;
use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
pub struct ModelCache {
    validator: Validator,
    entries: RwLock<AHashMap<u64, Arc<Evaluator>>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `validator` for every graph compiled by this cache.
    pub fn with_validator(validator: Validator) -> Self {
        Self {
            validator,
            entries: RwLock::new(AHashMap::new()),
        }
    }

    /// Returns the cached evaluator for `graph`, validating and scheduling it on a miss.
    ///
    /// Invalid graphs are not cached.
    pub fn get_or_compile(&self, graph: &GraphStructure) -> Result<Arc<Evaluator>, Vec<GraphError>> {
        let key = graph.content_hash();
        if let Some(hit) = self.lookup(key, graph) {
            return Ok(hit);
        }

        let evaluator = Arc::new(Evaluator::new(self.validator.validate(graph.clone())?));

        let mut entries = self.entries.write();
        // Another thread may have compiled the same graph in the meantime.
        if let Some(existing) = entries.get(&key) {
            if existing.graph().graph() == graph {
                return Ok(Arc::clone(existing));
            }
        }
        debug!(key, nodes = graph.nodes.len(), "caching compiled grading model");
        entries.insert(key, Arc::clone(&evaluator));
        Ok(evaluator)
    }

    fn lookup(&self, key: u64, graph: &GraphStructure) -> Option<Arc<Evaluator>> {
        let entries = self.entries.read();
        entries
            .get(&key)
            .filter(|cached| cached.graph().graph() == graph)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
