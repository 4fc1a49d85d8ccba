//! Step repository
//!
//! Provides [`StepRepository`], the ordered read-only sequence of steps.
//! Loaded once, shared cheaply (`Arc`), never mutated.

use crate::error::{RepositoryError, StepError};
use crate::step::{RawStep, Step, StepId};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

static BUILTIN_JSON: &str = include_str!("../data/roadmap.json");

static BUILTIN: Lazy<StepRepository> = Lazy::new(|| {
    StepRepository::from_json_str(BUILTIN_JSON).unwrap_or_else(|err| {
        tracing::error!(error = %err, "embedded roadmap data is invalid");
        StepRepository::empty()
    })
});

/// Serialized formats a repository can be read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryFormat {
    /// JSON array of step records
    Json,
    /// YAML sequence of step records
    Yaml,
}

impl RepositoryFormat {
    /// Detect format from a file extension
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Ordered, immutable step sequence
#[derive(Debug, Clone)]
pub struct StepRepository {
    steps: Arc<[Step]>,
    positions: Arc<HashMap<StepId, usize>>,
}

impl StepRepository {
    /// Build from validated steps
    ///
    /// # Errors
    /// Returns error if two steps share an id
    pub fn from_steps(steps: Vec<Step>) -> Result<Self, StepError> {
        let mut positions = HashMap::with_capacity(steps.len());
        for (i, step) in steps.iter().enumerate() {
            if positions.insert(step.id.clone(), i).is_some() {
                return Err(StepError::DuplicateId(step.id.to_string()));
            }
        }

        Ok(Self {
            steps: steps.into(),
            positions: Arc::new(positions),
        })
    }

    /// Repository with no steps
    #[must_use]
    pub fn empty() -> Self {
        Self {
            steps: Arc::from(Vec::new()),
            positions: Arc::new(HashMap::new()),
        }
    }

    /// Curriculum shipped with the crate
    #[must_use]
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Parse a JSON array of step records
    ///
    /// # Errors
    /// Returns error on malformed JSON or invalid records
    pub fn from_json_str(source: &str) -> Result<Self, RepositoryError> {
        let raw: Vec<RawStep> = serde_json::from_str(source)?;
        Self::from_raw(raw)
    }

    /// Parse a YAML sequence of step records
    ///
    /// # Errors
    /// Returns error on malformed YAML or invalid records
    pub fn from_yaml_str(source: &str) -> Result<Self, RepositoryError> {
        let raw: Vec<RawStep> = serde_yaml::from_str(source)?;
        Self::from_raw(raw)
    }

    /// Parse source text in the given format
    ///
    /// # Errors
    /// Returns error on malformed input or invalid records
    pub fn parse(source: &str, format: RepositoryFormat) -> Result<Self, RepositoryError> {
        match format {
            RepositoryFormat::Json => Self::from_json_str(source),
            RepositoryFormat::Yaml => Self::from_yaml_str(source),
        }
    }

    /// Load a `.json`, `.yaml` or `.yml` file
    ///
    /// # Errors
    /// Returns error if the file cannot be read, has an unknown extension,
    /// or does not contain a valid step list
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let format = RepositoryFormat::from_extension(ext)
            .ok_or_else(|| RepositoryError::UnsupportedFormat(ext.to_string()))?;

        let source =
            std::fs::read_to_string(path).map_err(|e| RepositoryError::io_error(path, e))?;
        let repo = Self::parse(&source, format)?;
        tracing::debug!(path = %path.display(), steps = repo.len(), "loaded step repository");
        Ok(repo)
    }

    fn from_raw(raw: Vec<RawStep>) -> Result<Self, RepositoryError> {
        let steps = raw
            .into_iter()
            .enumerate()
            .map(|(i, r)| r.into_step(i))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_steps(steps)?)
    }

    /// All steps in authored order
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if repository has no steps
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Lookup step by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Step> {
        self.positions.get(id).map(|&i| &self.steps[i])
    }

    /// Check if id exists
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Position of id in authored order
    #[inline]
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// First step, if any
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&Step> {
        self.steps.first()
    }
}

impl Default for StepRepository {
    fn default() -> Self {
        Self::empty()
    }
}
