//! Completion tracking
//!
//! The set of finished step ids, mirrored to the persistence adapter on every
//! change. The in-memory set is authoritative for the session; failed writes
//! are logged and otherwise ignored.

use crate::adapter::PersistenceAdapter;
use crate::keys::StorageKeys;
use indexmap::IndexSet;
use roadmap_model::{StepId, StepRepository};
use serde::Serialize;
use serde_json::Value;

/// Completed/total counts with a rounded percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    /// Completed steps that exist in the repository
    pub completed: usize,
    /// Steps in the repository
    pub total: usize,
    /// `round(completed / total * 100)`, zero for an empty repository
    pub percent: u8,
}

impl ProgressSummary {
    /// Compute from counts
    #[must_use]
    pub fn new(completed: usize, total: usize) -> Self {
        let completed = completed.min(total);
        let percent = if total == 0 {
            0
        } else {
            // completed <= total, so the quotient is within 0..=100
            u8::try_from((completed * 200 + total) / (total * 2)).unwrap_or(100)
        };
        Self {
            completed,
            total,
            percent,
        }
    }

    /// Label like `3/14 • 21%`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}/{} • {}%", self.completed, self.total, self.percent)
    }
}

/// Persisted set of completed step ids
#[derive(Debug)]
pub struct CompletionTracker<S: PersistenceAdapter> {
    store: S,
    key: String,
    done: IndexSet<StepId>,
}

impl<S: PersistenceAdapter> CompletionTracker<S> {
    /// Load the completed set from `store`
    ///
    /// Missing, unreadable or malformed data yields an empty set.
    pub fn load(store: S, keys: &StorageKeys) -> Self {
        let key = keys.completed.clone();
        let done = match store.get(&key) {
            Ok(Some(value)) => decode(&value),
            Ok(None) => IndexSet::new(),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "could not read completed steps");
                IndexSet::new()
            }
        };
        tracing::debug!(completed = done.len(), "completion state loaded");
        Self { store, key, done }
    }

    /// Flip membership of `id` and persist; returns the new state
    pub fn toggle(&mut self, id: &StepId) -> bool {
        let now_done = if self.done.shift_remove(id) {
            false
        } else {
            self.done.insert(id.clone());
            true
        };
        self.persist();
        now_done
    }

    /// Whether `id` is marked done
    #[inline]
    #[must_use]
    pub fn is_done(&self, id: &str) -> bool {
        self.done.contains(id)
    }

    /// Completed ids that still exist in `repo`
    #[must_use]
    pub fn completed_count(&self, repo: &StepRepository) -> usize {
        self.done.iter().filter(|id| repo.contains(id.as_str())).count()
    }

    /// Progress over `repo`
    #[must_use]
    pub fn summary(&self, repo: &StepRepository) -> ProgressSummary {
        ProgressSummary::new(self.completed_count(repo), repo.len())
    }

    /// Every stored id, including ones no longer in the repository
    pub fn ids(&self) -> impl Iterator<Item = &StepId> {
        self.done.iter()
    }

    fn persist(&self) {
        let value = Value::Array(
            self.done
                .iter()
                .map(|id| Value::String(id.to_string()))
                .collect(),
        );
        if let Err(err) = self.store.set(&self.key, value) {
            tracing::warn!(key = %self.key, error = %err, "could not save completed steps");
        }
    }
}

fn decode(value: &Value) -> IndexSet<StepId> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(StepId::from)
            .collect(),
        other => {
            tracing::warn!(found = %other, "completed steps are not a list; starting empty");
            IndexSet::new()
        }
    }
}
