//! Per-plan resource limits shown by the collection list

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_collections_per_project: usize,
    pub max_documents_per_collection: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_collections_per_project: 20,
            max_documents_per_collection: 500,
        }
    }
}

impl Limits {
    /// Refuse a new collection once the project holds the maximum.
    pub fn check_collection_capacity(&self, current: usize) -> Result<(), ValidationError> {
        if current >= self.max_collections_per_project {
            return Err(ValidationError::LimitReached {
                limit: self.max_collections_per_project,
            });
        }
        Ok(())
    }

    /// Fill ratio of a collection, clamped to `0.0..=1.0`.
    pub fn document_usage(&self, count: usize) -> f64 {
        if self.max_documents_per_collection == 0 {
            return 1.0;
        }
        (count as f64 / self.max_documents_per_collection as f64).min(1.0)
    }
}
