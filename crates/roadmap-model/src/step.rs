//! Curriculum step records
//!
//! Raw records are deserialized permissively and then narrowed into [`Step`]:
//! malformed links and blank checklist items are dropped, unknown
//! difficulties become `None`. Only identity problems are hard errors.

use crate::error::StepError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use url::Url;

/// Stable step identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    /// Create identifier from any string
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as str
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StepId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for StepId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StepId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for StepId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Step difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Introductory
    Easy,
    /// Intermediate
    Mid,
    /// Advanced
    Hard,
}

impl Difficulty {
    /// Parse the stored token (`easy`, `mid`, `hard`)
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "easy" => Some(Self::Easy),
            "mid" => Some(Self::Mid),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    /// Human label shown on the card badge
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Mid => "medium",
            Self::Hard => "hard",
        }
    }
}

/// External resource attached to a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Display label
    pub label: String,
    /// Target URL as authored
    pub url: String,
}

impl Link {
    /// Create link
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }

    /// Normalised URL if it parses as an absolute `http`/`https` address
    ///
    /// Anything else is rendered as a disabled label.
    #[must_use]
    pub fn safe_url(&self) -> Option<String> {
        let parsed = Url::parse(&self.url).ok()?;
        matches!(parsed.scheme(), "http" | "https").then(|| parsed.into())
    }
}

/// One curriculum item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// Unique identifier
    pub id: StepId,
    /// Card title
    pub title: String,
    /// Body text
    pub description: String,
    /// Search tags, in authored order
    pub tags: Vec<String>,
    /// Optional difficulty
    pub difficulty: Option<Difficulty>,
    /// Optional free-text duration label
    pub duration: Option<String>,
    /// Resource links
    pub links: Vec<Link>,
    /// Checklist items, never blank
    pub checklist: Vec<String>,
}

impl Step {
    /// Minimal step with no extras
    #[must_use]
    pub fn new(id: impl Into<StepId>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            tags: Vec::new(),
            difficulty: None,
            duration: None,
            links: Vec::new(),
            checklist: Vec::new(),
        }
    }

    /// With tags
    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// With difficulty
    #[inline]
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// With duration label
    #[inline]
    #[must_use]
    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    /// With links
    #[must_use]
    pub fn with_links(mut self, links: Vec<Link>) -> Self {
        self.links = links;
        self
    }

    /// With checklist items (blank items are dropped)
    #[must_use]
    pub fn with_checklist<I, T>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.checklist = items
            .into_iter()
            .map(Into::into)
            .filter(|item: &String| !item.trim().is_empty())
            .collect();
        self
    }

    /// Case-folded search text: title, description and space-joined tags
    #[must_use]
    pub fn haystack(&self) -> String {
        let mut hay = String::with_capacity(self.title.len() + self.description.len() + 16);
        hay.push_str(&self.title);
        hay.push(' ');
        hay.push_str(&self.description);
        hay.push(' ');
        hay.push_str(&self.tags.join(" "));
        hay.to_lowercase()
    }

    /// Badge text: `duration • difficulty`, or `step N` when neither is set
    ///
    /// `index` is the zero-based position in the visible set.
    #[must_use]
    pub fn badge(&self, index: usize) -> String {
        let parts: Vec<&str> = self
            .duration
            .as_deref()
            .into_iter()
            .chain(self.difficulty.map(Difficulty::label))
            .collect();

        if parts.is_empty() {
            format!("step {}", index + 1)
        } else {
            parts.join(" • ")
        }
    }
}

/// Permissive on-disk shape of a step
#[derive(Debug, Deserialize)]
pub(crate) struct RawStep {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<serde_json::Value>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    links: Vec<RawLink>,
    #[serde(default)]
    checklist: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawLink {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl RawStep {
    /// Validate into a [`Step`]
    ///
    /// # Errors
    /// Returns error if the id or title is blank
    pub(crate) fn into_step(self, position: usize) -> Result<Step, StepError> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(StepError::EmptyId { position });
        }
        if self.title.trim().is_empty() {
            return Err(StepError::EmptyTitle(id));
        }

        let tags = self
            .tags
            .into_iter()
            .filter_map(|tag| match tag {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
                other => {
                    tracing::warn!(step = %id, tag = %other, "dropping non-string tag");
                    None
                }
            })
            .collect();

        let difficulty = self.difficulty.as_deref().and_then(|token| {
            let parsed = Difficulty::parse(token);
            if parsed.is_none() {
                tracing::warn!(step = %id, difficulty = token, "unknown difficulty");
            }
            parsed
        });

        let links = self
            .links
            .into_iter()
            .filter_map(|link| match (link.label, link.url) {
                (Some(label), Some(url)) if !label.trim().is_empty() => Some(Link { label, url }),
                _ => {
                    tracing::warn!(step = %id, "dropping link without label or url");
                    None
                }
            })
            .collect();

        let checklist = self
            .checklist
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect();

        Ok(Step {
            id: StepId(id),
            title: self.title,
            description: self.description,
            tags,
            difficulty,
            duration: self.duration.filter(|d| !d.trim().is_empty()),
            links,
            checklist,
        })
    }
}
