//! Per-step checklist state
//!
//! Each step's checklist is a sparse index → checked map, stored as a JSON
//! object under a key namespaced by the step id. Steps are loaded lazily the
//! first time they are selected and cached for the session.

use crate::adapter::PersistenceAdapter;
use crate::keys::StorageKeys;
use roadmap_model::StepId;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Checked flags of one step's checklist, by item index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecklistState {
    items: BTreeMap<usize, bool>,
}

impl ChecklistState {
    /// Empty state
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether item `index` is checked
    #[inline]
    #[must_use]
    pub fn is_checked(&self, index: usize) -> bool {
        self.items.get(&index).copied().unwrap_or(false)
    }

    /// Flip item `index`; returns the new value
    pub fn toggle(&mut self, index: usize) -> bool {
        let entry = self.items.entry(index).or_insert(false);
        *entry = !*entry;
        *entry
    }

    /// Checked items among the first `item_count`
    #[must_use]
    pub fn checked_count(&self, item_count: usize) -> usize {
        self.items
            .range(..item_count)
            .filter(|(_, &checked)| checked)
            .count()
    }

    /// Whether no entry is stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Decode a stored value
    ///
    /// Objects are keyed by index; keys that are not non-negative integers
    /// are skipped. Arrays are read by position. Anything else is empty.
    /// Values are read by truthiness: `true`, non-zero numbers and non-empty
    /// strings count as checked.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let items = match value {
            Value::Object(map) => map
                .iter()
                .filter_map(|(k, v)| Some((k.parse::<usize>().ok()?, truthy(v))))
                .collect(),
            Value::Array(flags) => flags.iter().map(truthy).enumerate().collect(),
            _ => BTreeMap::new(),
        };
        Self { items }
    }

    /// Encode as a JSON object keyed by index
    #[must_use]
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .items
            .iter()
            .map(|(i, checked)| (i.to_string(), Value::Bool(*checked)))
            .collect();
        Value::Object(map)
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    }
}

/// Checklist states for every step touched this session
#[derive(Debug)]
pub struct ChecklistTracker<S: PersistenceAdapter> {
    store: S,
    keys: StorageKeys,
    states: HashMap<StepId, ChecklistState>,
}

impl<S: PersistenceAdapter> ChecklistTracker<S> {
    /// Create tracker; nothing is read until a step is selected
    pub fn new(store: S, keys: StorageKeys) -> Self {
        Self {
            store,
            keys,
            states: HashMap::new(),
        }
    }

    /// Load (once) and return the state of `step`
    ///
    /// Missing, unreadable or malformed data yields an empty state.
    pub fn select(&mut self, step: &StepId) -> &ChecklistState {
        if !self.states.contains_key(step) {
            let state = self.read(step);
            self.states.insert(step.clone(), state);
        }
        &self.states[step]
    }

    /// State of `step` if it was already selected
    #[must_use]
    pub fn get(&self, step: &str) -> Option<&ChecklistState> {
        self.states.get(step)
    }

    /// Flip one item and persist the whole map; returns the new value
    pub fn toggle_item(&mut self, step: &StepId, index: usize) -> bool {
        self.select(step);
        let state = self.states.entry(step.clone()).or_default();
        let checked = state.toggle(index);
        let value = state.to_value();
        self.write(step, value);
        checked
    }

    /// Clear every item of `step` and persist the empty map
    pub fn reset_all(&mut self, step: &StepId) {
        self.states.insert(step.clone(), ChecklistState::new());
        self.write(step, Value::Object(Map::new()));
    }

    /// Checked items of `step` among its first `item_count`
    pub fn checked_count(&mut self, step: &StepId, item_count: usize) -> usize {
        self.select(step).checked_count(item_count)
    }

    fn read(&self, step: &StepId) -> ChecklistState {
        let key = self.keys.checklist(step);
        match self.store.get(&key) {
            Ok(Some(value)) => ChecklistState::from_value(&value),
            Ok(None) => ChecklistState::new(),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "could not read checklist; starting empty");
                ChecklistState::new()
            }
        }
    }

    fn write(&self, step: &StepId, value: Value) {
        let key = self.keys.checklist(step);
        if let Err(err) = self.store.set(&key, value) {
            tracing::warn!(key = %key, error = %err, "could not save checklist");
        }
    }
}
