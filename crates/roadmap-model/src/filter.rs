//! Search filtering
//!
//! Pure substring containment over case-folded step text. No ranking, no
//! fuzzy matching; the relative order of the input is always kept.

use crate::step::{Step, StepId};

/// Trim and case-fold a raw query
#[inline]
#[must_use]
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Steps whose title, description or tags contain `query`
///
/// An empty (or whitespace-only) query returns every step.
#[must_use]
pub fn filter<'a>(steps: &'a [Step], query: &str) -> Vec<&'a Step> {
    let q = normalize_query(query);
    if q.is_empty() {
        return steps.iter().collect();
    }
    steps.iter().filter(|s| s.haystack().contains(&q)).collect()
}

/// Identifiers of the visible set, in order
#[must_use]
pub fn filter_ids(steps: &[Step], query: &str) -> Vec<StepId> {
    filter(steps, query).into_iter().map(|s| s.id.clone()).collect()
}
