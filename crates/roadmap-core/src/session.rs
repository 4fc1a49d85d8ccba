//! Roadmap session
//!
//! Owns the selection state of one rendered roadmap (query, expanded cards,
//! hovered card) together with the layout engine and both trackers. The
//! layout engine only ever receives the visible set; selection state stays
//! here.

use crate::config::RoadmapConfig;
use crate::view::{CardView, ChecklistItemView, ChecklistView, LinkView, RoadmapView};
use roadmap_layout::{
    build_connectors, build_sequence_links, ConnectorSet, Element, GeometrySnapshot, LayoutEngine,
    Placement, Platform, SequenceLink, Trigger,
};
use roadmap_model::{filter_ids, normalize_query, Step, StepId, StepRepository};
use roadmap_store::{ChecklistTracker, CompletionTracker, PersistenceAdapter, ProgressSummary};
use std::collections::HashSet;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Interactive roadmap over one repository
pub struct Roadmap<P: Platform, S: PersistenceAdapter> {
    repo: StepRepository,
    config: RoadmapConfig,
    query: String,
    visible: Vec<StepId>,
    open: HashSet<StepId>,
    active: Option<StepId>,
    engine: LayoutEngine<P>,
    completion: CompletionTracker<S>,
    checklists: ChecklistTracker<S>,
}

impl<P: Platform, S: PersistenceAdapter> Debug for Roadmap<P, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Roadmap")
            .field("steps", &self.repo.len())
            .field("query", &self.query)
            .field("visible", &self.visible.len())
            .field("open", &self.open.len())
            .field("active", &self.active)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl<P: Platform, S: PersistenceAdapter + Clone> Roadmap<P, S> {
    /// Create session; loads completion state and syncs the engine
    pub fn new(repo: StepRepository, platform: P, store: S, config: RoadmapConfig) -> Self {
        let completion = CompletionTracker::load(store.clone(), &config.storage);
        let checklists = ChecklistTracker::new(store, config.storage.clone());

        let visible: Vec<StepId> = repo.steps().iter().map(|s| s.id.clone()).collect();
        let mut open = HashSet::new();
        if config.expand_first {
            if let Some(first) = repo.first() {
                open.insert(first.id.clone());
            }
        }

        let mut engine = LayoutEngine::new(platform);
        engine.sync(&visible, &Trigger::Mount);

        tracing::info!(steps = repo.len(), "roadmap session started");
        Self {
            repo,
            config,
            query: String::new(),
            visible,
            open,
            active: None,
            engine,
            completion,
            checklists,
        }
    }
}

impl<P: Platform, S: PersistenceAdapter> Roadmap<P, S> {
    /// Step repository
    #[inline]
    #[must_use]
    pub fn repository(&self) -> &StepRepository {
        &self.repo
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RoadmapConfig {
        &self.config
    }

    /// Query as last set
    #[inline]
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Ids passing the current filter, in repository order
    #[inline]
    #[must_use]
    pub fn visible(&self) -> &[StepId] {
        &self.visible
    }

    /// Visible steps in order
    pub fn visible_steps(&self) -> impl Iterator<Item = &Step> + '_ {
        self.visible.iter().filter_map(|id| self.repo.get(id.as_str()))
    }

    /// Layout engine, read-only
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &LayoutEngine<P> {
        &self.engine
    }

    /// Replace the search query and re-sync when the visible set changes
    pub fn set_query(&mut self, query: impl Into<String>) -> &[StepId] {
        self.query = query.into();
        let visible = filter_ids(self.repo.steps(), &self.query);
        tracing::info!(
            query = %normalize_query(&self.query),
            matches = visible.len(),
            "filter applied"
        );
        if visible != self.visible {
            self.visible = visible;
            self.engine.sync(&self.visible, &Trigger::VisibleSetChanged);
        }
        &self.visible
    }

    /// Whether a card is expanded
    #[inline]
    #[must_use]
    pub fn is_open(&self, id: &str) -> bool {
        self.open.contains(id)
    }

    /// Expand or collapse a card; `None` for unknown ids
    pub fn toggle_open(&mut self, id: &str) -> Option<bool> {
        let step_id = self.repo.get(id)?.id.clone();
        let now_open = if self.open.remove(id) {
            false
        } else {
            self.open.insert(step_id);
            true
        };
        tracing::debug!(id, open = now_open, "card toggled");
        self.engine.sync(&self.visible, &Trigger::ExpandedChanged);
        Some(now_open)
    }

    /// Hovered/focused card
    #[inline]
    #[must_use]
    pub fn active(&self) -> Option<&StepId> {
        self.active.as_ref()
    }

    /// Mark a card active; unknown ids are ignored
    pub fn set_active(&mut self, id: &str) {
        if let Some(step) = self.repo.get(id) {
            self.active = Some(step.id.clone());
        }
    }

    /// Clear the active card if it is `id`
    pub fn clear_active(&mut self, id: &str) {
        if self.active.as_ref().is_some_and(|a| a.as_str() == id) {
            self.active = None;
        }
    }

    /// Whether a step is marked done
    #[inline]
    #[must_use]
    pub fn is_done(&self, id: &str) -> bool {
        self.completion.is_done(id)
    }

    /// Flip completion of a step; `None` for unknown ids
    pub fn toggle_done(&mut self, id: &str) -> Option<bool> {
        let step_id = self.repo.get(id)?.id.clone();
        let done = self.completion.toggle(&step_id);
        tracing::info!(id, done, "completion toggled");
        Some(done)
    }

    /// Flip one checklist item
    ///
    /// `None` when the step is unknown or has no item at `index`.
    pub fn toggle_checklist_item(&mut self, id: &str, index: usize) -> Option<bool> {
        let step = self.repo.get(id)?;
        if index >= step.checklist.len() {
            return None;
        }
        let step_id = step.id.clone();
        let checked = self.checklists.toggle_item(&step_id, index);
        tracing::info!(id, index, checked, "checklist item toggled");
        Some(checked)
    }

    /// Clear a step's checklist; `false` for unknown ids
    pub fn reset_checklist(&mut self, id: &str) -> bool {
        let Some(step) = self.repo.get(id) else {
            return false;
        };
        let step_id = step.id.clone();
        self.checklists.reset_all(&step_id);
        tracing::info!(id, "checklist reset");
        true
    }

    /// Checklist view of a step, loading its state on first use
    pub fn checklist(&mut self, id: &str) -> Option<ChecklistView> {
        let step = self.repo.get(id)?;
        if step.checklist.is_empty() {
            return None;
        }
        let state = self.checklists.select(&step.id);
        let items: Vec<ChecklistItemView> = step
            .checklist
            .iter()
            .enumerate()
            .map(|(index, text)| ChecklistItemView {
                index,
                text: text.clone(),
                checked: state.is_checked(index),
            })
            .collect();
        let checked = state.checked_count(items.len());
        Some(ChecklistView { items, checked })
    }

    /// Mount or unmount the container element
    pub fn mount_container(&mut self, container: Option<Element>) {
        self.engine.mount_container(container);
    }

    /// Register or unregister a card element
    pub fn register(&mut self, id: StepId, element: Option<Element>) {
        self.engine.register(id, element);
    }

    /// Forward a platform notification
    pub fn notify(&mut self, trigger: Trigger) {
        self.engine.notify(trigger);
    }

    /// Run pending layout work; `true` if a pass ran
    pub fn frame(&mut self) -> bool {
        self.engine.flush()
    }

    /// Latest geometry
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Arc<GeometrySnapshot> {
        self.engine.snapshot()
    }

    /// Whether the single-column layout applies
    #[inline]
    #[must_use]
    pub fn is_narrow(&self) -> bool {
        self.engine.is_narrow(self.config.narrow_max_width)
    }

    /// Connectors of the latest snapshot
    #[must_use]
    pub fn connectors(&self) -> ConnectorSet {
        build_connectors(&self.engine.snapshot(), &self.visible, &self.config.connectors)
    }

    /// Card-to-card links of the latest snapshot
    #[must_use]
    pub fn sequence_links(&self) -> Vec<SequenceLink> {
        build_sequence_links(&self.engine.snapshot(), &self.visible, &self.config.connectors)
    }

    /// Progress over the whole repository
    #[must_use]
    pub fn progress(&self) -> ProgressSummary {
        self.completion.summary(&self.repo)
    }

    /// Build the view of the current frame
    pub fn view(&mut self) -> RoadmapView {
        let narrow = self.is_narrow();
        let visible = self.visible.clone();

        let mut cards = Vec::with_capacity(visible.len());
        for (index, id) in visible.iter().enumerate() {
            let Some(step) = self.repo.get(id.as_str()) else {
                continue;
            };
            let card = CardView {
                id: step.id.clone(),
                index,
                title: step.title.clone(),
                description: step.description.clone(),
                placement: Placement::for_index(index, narrow),
                badge: step.badge(index),
                done: self.completion.is_done(id.as_str()),
                open: self.open.contains(id),
                active: self.active.as_ref() == Some(id),
                tags: step.tags.clone(),
                links: step.links.iter().map(LinkView::from).collect(),
                checklist: None,
            };
            cards.push(card);
        }
        for card in &mut cards {
            card.checklist = self.checklist(card.id.as_str());
        }

        RoadmapView {
            query: self.query.clone(),
            narrow,
            cards,
            connectors: self.connectors(),
            progress: self.progress(),
        }
    }

    /// Release every platform subscription
    pub fn teardown(&mut self) {
        self.engine.teardown();
        tracing::debug!("roadmap session torn down");
    }
}
