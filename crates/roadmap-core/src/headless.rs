//! Headless card layout
//!
//! A deterministic stand-in for a browser: cards are placed in a
//! three-column grid (left, axis, right), one row per visible step, or in a
//! single full-width column on narrow viewports. Card heights follow from
//! content and expansion state, so expanding a card pushes every later row
//! down exactly like a real reflow would.
//!
//! The layout owns the element handles and reports changes to the session
//! the way a platform's observers would: new cards are registered, hidden
//! cards unregistered, moved cards notified as resized.

use crate::session::Roadmap;
use roadmap_layout::{Element, ElementHandle, Placement, Platform, Rect, Trigger};
use roadmap_model::{Step, StepId};
use roadmap_store::PersistenceAdapter;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

/// Card sizing rules of the headless layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessMetrics {
    /// Container width
    pub container_width: f64,
    /// Side column width as a fraction of the container
    pub column_ratio: f64,
    /// Space above the first row and below the last
    pub padding: f64,
    /// Vertical gap between rows
    pub row_gap: f64,
    /// Height of a collapsed card (title and badges)
    pub header_height: f64,
    /// Inner horizontal padding of a card
    pub card_padding: f64,
    /// Average glyph width used to wrap descriptions
    pub char_width: f64,
    /// Height of one wrapped description line
    pub line_height: f64,
    /// Height of one link, checklist item or tag row
    pub item_height: f64,
    /// Space before each section of an expanded card
    pub section_gap: f64,
}

impl Default for HeadlessMetrics {
    fn default() -> Self {
        Self {
            container_width: 1100.0,
            column_ratio: 0.42,
            padding: 24.0,
            row_gap: 40.0,
            header_height: 96.0,
            card_padding: 20.0,
            char_width: 7.5,
            line_height: 22.0,
            item_height: 28.0,
            section_gap: 18.0,
        }
    }
}

impl HeadlessMetrics {
    /// Width of a card for the given placement
    #[must_use]
    pub fn card_width(&self, placement: Placement) -> f64 {
        match placement {
            Placement::Single => self.container_width,
            Placement::Left | Placement::Right => self.container_width * self.column_ratio,
        }
    }

    /// Left edge of a card for the given placement
    #[must_use]
    pub fn card_x(&self, placement: Placement) -> f64 {
        match placement {
            Placement::Left | Placement::Single => 0.0,
            Placement::Right => self.container_width - self.card_width(placement),
        }
    }

    /// Height of a card of `width` showing `step`
    #[must_use]
    pub fn card_height(&self, step: &Step, open: bool, width: f64) -> f64 {
        if !open {
            return self.header_height;
        }

        let text_width = (width - 2.0 * self.card_padding).max(self.char_width);
        let per_line = (text_width / self.char_width).floor().max(1.0);
        let chars = step.description.chars().count() as f64;
        let lines = (chars / per_line).ceil().max(1.0);

        let mut height = self.header_height + self.section_gap + lines * self.line_height;
        if !step.links.is_empty() {
            height += self.section_gap + step.links.len() as f64 * self.item_height;
        }
        if !step.checklist.is_empty() {
            // items plus the reset button row
            height += self.section_gap + (step.checklist.len() + 1) as f64 * self.item_height;
        }
        if !step.tags.is_empty() {
            height += self.section_gap + self.item_height;
        }
        height
    }
}

/// Element whose box is set by the layout
#[derive(Debug, Default)]
pub struct HeadlessElement {
    rect: Cell<Rect>,
}

impl HeadlessElement {
    fn new(rect: Rect) -> Rc<Self> {
        Rc::new(Self {
            rect: Cell::new(rect),
        })
    }

    /// Replace the box; `true` if it changed
    fn update(&self, rect: Rect) -> bool {
        if self.rect.get() == rect {
            return false;
        }
        self.rect.set(rect);
        true
    }
}

impl ElementHandle for HeadlessElement {
    fn bounding_box(&self) -> Rect {
        self.rect.get()
    }
}

/// Grid layout driving a [`Roadmap`] without a browser
#[derive(Debug)]
pub struct HeadlessLayout {
    metrics: HeadlessMetrics,
    scroll_y: f64,
    container: Rc<HeadlessElement>,
    cards: HashMap<StepId, Rc<HeadlessElement>>,
    mounted: bool,
}

impl HeadlessLayout {
    /// Create an unmounted layout
    #[must_use]
    pub fn new(metrics: HeadlessMetrics) -> Self {
        Self {
            metrics,
            scroll_y: 0.0,
            container: HeadlessElement::new(Rect::new(0.0, 0.0, metrics.container_width, 0.0)),
            cards: HashMap::new(),
            mounted: false,
        }
    }

    /// Sizing rules in use
    #[inline]
    #[must_use]
    pub fn metrics(&self) -> &HeadlessMetrics {
        &self.metrics
    }

    /// Mount the container and every visible card, then measure
    pub fn attach<P: Platform, S: PersistenceAdapter>(&mut self, roadmap: &mut Roadmap<P, S>) {
        if !self.mounted {
            let container: Element = self.container.clone();
            roadmap.mount_container(Some(container));
            self.mounted = true;
        }
        self.arrange(roadmap);
        roadmap.frame();
    }

    /// Unmount everything
    pub fn detach<P: Platform, S: PersistenceAdapter>(&mut self, roadmap: &mut Roadmap<P, S>) {
        for (id, _) in self.cards.drain() {
            roadmap.register(id, None);
        }
        if self.mounted {
            roadmap.mount_container(None);
            self.mounted = false;
        }
    }

    /// Reflow after a state change; returns the number of elements that
    /// were added, moved or removed
    ///
    /// Pending notifications are left for the caller's next frame.
    pub fn arrange<P: Platform, S: PersistenceAdapter>(
        &mut self,
        roadmap: &mut Roadmap<P, S>,
    ) -> usize {
        let narrow = roadmap.is_narrow();
        let m = self.metrics;
        let origin_y = -self.scroll_y;

        let mut y = m.padding;
        let mut placed: Vec<(StepId, Rect)> = Vec::with_capacity(roadmap.visible().len());
        for (index, step) in roadmap.visible_steps().enumerate() {
            let placement = Placement::for_index(index, narrow);
            let width = m.card_width(placement);
            let height = m.card_height(step, roadmap.is_open(step.id.as_str()), width);
            placed.push((
                step.id.clone(),
                Rect::new(m.card_x(placement), origin_y + y, width, height),
            ));
            y += height + m.row_gap;
        }
        let content_height = if placed.is_empty() {
            2.0 * m.padding
        } else {
            y - m.row_gap + m.padding
        };

        let mut changes = 0;

        let stale: Vec<StepId> = self
            .cards
            .keys()
            .filter(|id| !placed.iter().any(|(p, _)| p == *id))
            .cloned()
            .collect();
        for id in stale {
            self.cards.remove(&id);
            roadmap.register(id, None);
            changes += 1;
        }

        for (id, rect) in placed {
            match self.cards.get(&id) {
                Some(el) => {
                    if el.update(rect) {
                        roadmap.notify(Trigger::CardResize(id));
                        changes += 1;
                    }
                }
                None => {
                    let el = HeadlessElement::new(rect);
                    let handle: Element = el.clone();
                    self.cards.insert(id.clone(), el);
                    roadmap.register(id, Some(handle));
                    changes += 1;
                }
            }
        }

        let container = Rect::new(0.0, origin_y, m.container_width, content_height);
        if self.container.update(container) {
            roadmap.notify(Trigger::ContainerResize);
            changes += 1;
        }

        tracing::debug!(changes, narrow, "headless layout arranged");
        changes
    }

    /// Scroll the page to `y`, moving every element in viewport space
    pub fn scroll_to<P: Platform, S: PersistenceAdapter>(
        &mut self,
        roadmap: &mut Roadmap<P, S>,
        y: f64,
    ) {
        let dy = self.scroll_y - y;
        self.scroll_y = y;
        self.container.update(self.container.bounding_box().translate(0.0, dy));
        for el in self.cards.values() {
            el.update(el.bounding_box().translate(0.0, dy));
        }
        roadmap.notify(Trigger::WindowScroll);
    }

    /// Viewport-space box of a card
    #[must_use]
    pub fn card_rect(&self, id: &str) -> Option<Rect> {
        self.cards.get(id).map(|el| el.bounding_box())
    }

    /// Viewport-space box of the container
    #[must_use]
    pub fn container_rect(&self) -> Rect {
        self.container.bounding_box()
    }

    /// Number of mounted cards
    #[inline]
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }
}
