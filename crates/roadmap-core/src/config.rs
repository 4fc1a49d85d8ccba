//! Session configuration
//!
//! Every field has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! narrow_max_width = 820.0
//! expand_first = true
//!
//! [connectors]
//! bend_min = 70.0
//! bend_max = 160.0
//!
//! [storage]
//! completed = "completedStepIds"
//! checklist_prefix = "roadmap:checklist:"
//!
//! [headless]
//! container_width = 1100.0
//! ```

use crate::error::ConfigError;
use crate::headless::HeadlessMetrics;
use roadmap_layout::ConnectorStyle;
use roadmap_store::StorageKeys;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Roadmap session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadmapConfig {
    /// Viewports at most this wide render a single column
    pub narrow_max_width: f64,
    /// Whether the first step starts expanded
    pub expand_first: bool,
    /// Connector geometry constants
    pub connectors: ConnectorStyle,
    /// Persistence key names
    pub storage: StorageKeys,
    /// Card metrics of the headless layout
    pub headless: HeadlessMetrics,
}

impl Default for RoadmapConfig {
    fn default() -> Self {
        Self {
            narrow_max_width: 820.0,
            expand_first: true,
            connectors: ConnectorStyle::default(),
            storage: StorageKeys::default(),
            headless: HeadlessMetrics::default(),
        }
    }
}

impl RoadmapConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With narrow viewport breakpoint
    #[inline]
    #[must_use]
    pub fn with_narrow_max_width(mut self, width: f64) -> Self {
        self.narrow_max_width = width;
        self
    }

    /// With initial expansion of the first step
    #[inline]
    #[must_use]
    pub fn with_expand_first(mut self, expand: bool) -> Self {
        self.expand_first = expand;
        self
    }

    /// With connector constants
    #[inline]
    #[must_use]
    pub fn with_connectors(mut self, style: ConnectorStyle) -> Self {
        self.connectors = style;
        self
    }

    /// With storage keys
    #[inline]
    #[must_use]
    pub fn with_storage(mut self, keys: StorageKeys) -> Self {
        self.storage = keys;
        self
    }

    /// With headless card metrics
    #[inline]
    #[must_use]
    pub fn with_headless(mut self, metrics: HeadlessMetrics) -> Self {
        self.headless = metrics;
        self
    }

    /// Parse and validate TOML text
    ///
    /// # Errors
    /// Returns error if the text is not valid TOML or a value is out of range
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is invalid
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns the first out-of-range field
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("narrow_max_width", self.narrow_max_width)?;

        let c = &self.connectors;
        non_negative("connectors.outset", c.outset)?;
        non_negative("connectors.bend_min", c.bend_min)?;
        if c.bend_min > c.bend_max {
            return Err(ConfigError::invalid(
                "connectors.bend_max",
                format!("{} is below bend_min {}", c.bend_max, c.bend_min),
            ));
        }
        non_negative("connectors.link_bend_min", c.link_bend_min)?;
        if c.link_bend_min > c.link_bend_max {
            return Err(ConfigError::invalid(
                "connectors.link_bend_max",
                format!("{} is below link_bend_min {}", c.link_bend_max, c.link_bend_min),
            ));
        }

        if self.storage.completed.is_empty() {
            return Err(ConfigError::invalid("storage.completed", "must not be empty"));
        }
        if self.storage.checklist_prefix.is_empty() {
            return Err(ConfigError::invalid(
                "storage.checklist_prefix",
                "must not be empty",
            ));
        }

        positive("headless.container_width", self.headless.container_width)?;
        if !(0.0..=0.5).contains(&self.headless.column_ratio) {
            return Err(ConfigError::invalid(
                "headless.column_ratio",
                format!("{} is outside 0..=0.5", self.headless.column_ratio),
            ));
        }
        positive("headless.char_width", self.headless.char_width)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} is not a positive number")))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} is negative or not finite")))
    }
}
