//! Read-only view model of one frame

use roadmap_layout::{ConnectorSet, Placement};
use roadmap_model::{Link, StepId};
use roadmap_store::ProgressSummary;
use serde::Serialize;

/// Resource link as rendered; `url` is `None` when the link is disabled
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkView {
    /// Link text
    pub label: String,
    /// Target, only for `http`/`https` URLs
    pub url: Option<String>,
}

impl From<&Link> for LinkView {
    fn from(link: &Link) -> Self {
        Self {
            label: link.label.clone(),
            url: link.safe_url(),
        }
    }
}

/// One checklist row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItemView {
    /// Position in the step's checklist
    pub index: usize,
    /// Item text
    pub text: String,
    /// Whether ticked
    pub checked: bool,
}

/// Checklist of one card with its progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistView {
    /// Rows in order
    pub items: Vec<ChecklistItemView>,
    /// Ticked rows
    pub checked: usize,
}

impl ChecklistView {
    /// Badge text like `2/5 items`
    #[must_use]
    pub fn progress_label(&self) -> String {
        format!("{}/{} items", self.checked, self.items.len())
    }
}

/// One visible card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    /// Step id
    pub id: StepId,
    /// Position in the visible set
    pub index: usize,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Column the card renders in
    pub placement: Placement,
    /// `duration • difficulty` or `step N`
    pub badge: String,
    /// Marked done
    pub done: bool,
    /// Details expanded
    pub open: bool,
    /// Hovered/focused
    pub active: bool,
    /// Tags
    pub tags: Vec<String>,
    /// Resource links
    pub links: Vec<LinkView>,
    /// Checklist, `None` when the step has no items
    pub checklist: Option<ChecklistView>,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadmapView {
    /// Current query as typed
    pub query: String,
    /// Single-column layout in effect
    pub narrow: bool,
    /// Visible cards in order
    pub cards: Vec<CardView>,
    /// Connectors of the latest measurement
    pub connectors: ConnectorSet,
    /// Progress over the whole repository
    pub progress: ProgressSummary,
}

impl RoadmapView {
    /// Card by step id
    #[must_use]
    pub fn card(&self, id: &str) -> Option<&CardView> {
        self.cards.iter().find(|c| c.id.as_str() == id)
    }

    /// Whether the filter left nothing to show
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
