//! Storage key layout

use roadmap_model::StepId;
use serde::{Deserialize, Serialize};

/// Names under which state is persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    /// Key of the completed-ids list
    pub completed: String,
    /// Prefix of per-step checklist keys; the step id is appended
    pub checklist_prefix: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            completed: "completedStepIds".to_string(),
            checklist_prefix: "roadmap:checklist:".to_string(),
        }
    }
}

impl StorageKeys {
    /// Checklist key for one step
    #[inline]
    #[must_use]
    pub fn checklist(&self, step: &StepId) -> String {
        format!("{}{}", self.checklist_prefix, step)
    }
}
