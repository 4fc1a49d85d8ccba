//! Layout measurement engine
//!
//! Keeps a [`GeometrySnapshot`] in step with what is on screen.
//!
//! # Lifecycle
//!
//! 1. The host mounts the container and registers one element per card.
//! 2. [`LayoutEngine::sync`] is called whenever the visible set or the
//!    expanded set changes. It drops every subscription, subscribes afresh
//!    and measures immediately.
//! 3. Platform notifications are forwarded to [`LayoutEngine::notify`], which
//!    only marks the engine dirty. [`LayoutEngine::flush`] runs at most one
//!    pass for any number of pending triggers.
//! 4. [`LayoutEngine::teardown`] (or drop) releases every subscription.
//!
//! Passes never merge into the previous snapshot: each one builds a fresh map
//! and replaces the old `Arc` wholesale, so removed steps vanish on the next
//! pass.

use crate::geometry::Rect;
use crate::platform::{Element, ObserveTarget, Platform, SubscriptionId};
use crate::snapshot::GeometrySnapshot;
use indexmap::IndexMap;
use roadmap_model::StepId;
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;
use std::sync::Arc;

/// Why a measurement was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Container or a card was mounted
    Mount,
    /// Container changed size
    ContainerResize,
    /// A card changed size (expand/collapse, content reflow)
    CardResize(StepId),
    /// Browser window resized
    WindowResize,
    /// Page scrolled
    WindowScroll,
    /// Filter produced a different visible set
    VisibleSetChanged,
    /// A card was expanded or collapsed
    ExpandedChanged,
}

/// Active platform subscriptions
#[derive(Debug, Default)]
struct Observation {
    container: Option<SubscriptionId>,
    scroll: Option<SubscriptionId>,
    resize: Option<SubscriptionId>,
    cards: HashMap<StepId, SubscriptionId>,
}

impl Observation {
    fn len(&self) -> usize {
        usize::from(self.container.is_some())
            + usize::from(self.scroll.is_some())
            + usize::from(self.resize.is_some())
            + self.cards.len()
    }

    fn drain(&mut self) -> Vec<SubscriptionId> {
        let mut ids: Vec<SubscriptionId> = self.container.take().into_iter().collect();
        ids.extend(self.scroll.take());
        ids.extend(self.resize.take());
        ids.extend(self.cards.drain().map(|(_, id)| id));
        ids
    }
}

/// Counters for coalescing behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Measurement passes run
    pub passes: u64,
    /// Triggers received through [`LayoutEngine::notify`]
    pub triggers: u64,
    /// Triggers absorbed into an already pending pass
    pub coalesced: u64,
}

/// Measures card rectangles relative to the shared container
pub struct LayoutEngine<P: Platform> {
    platform: P,
    container: Option<Element>,
    elements: HashMap<StepId, Element>,
    visible: Vec<StepId>,
    snapshot: Arc<GeometrySnapshot>,
    observation: Option<Observation>,
    pending: Option<Trigger>,
    stats: EngineStats,
}

impl<P: Platform> Debug for LayoutEngine<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("container_mounted", &self.container.is_some())
            .field("registered", &self.elements.len())
            .field("visible", &self.visible.len())
            .field("measured", &self.snapshot.len())
            .field("observing", &self.observation.is_some())
            .field("pending", &self.pending)
            .field("stats", &self.stats)
            .finish()
    }
}

impl<P: Platform> LayoutEngine<P> {
    /// Create engine with nothing mounted
    #[must_use]
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            container: None,
            elements: HashMap::new(),
            visible: Vec::new(),
            snapshot: Arc::new(GeometrySnapshot::empty()),
            observation: None,
            pending: None,
            stats: EngineStats::default(),
        }
    }

    /// Platform this engine observes through
    #[inline]
    #[must_use]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Mount (`Some`) or unmount (`None`) the container
    pub fn mount_container(&mut self, container: Option<Element>) {
        let mounted = container.is_some();
        self.container = container;

        if let Some(obs) = self.observation.as_mut() {
            if let Some(id) = obs.container.take() {
                self.platform.unobserve(id);
            }
            if let Some(el) = self.container.as_ref() {
                obs.container = Some(self.platform.observe_size(&ObserveTarget::Container, el));
            }
        }

        tracing::debug!(mounted, "container mount changed");
        self.notify(Trigger::Mount);
    }

    /// Register (`Some`) or unregister (`None`) the element for a card
    ///
    /// Calls may arrive in any order relative to [`sync`](Self::sync).
    /// Replacing a visible card's element moves its size subscription to the
    /// new element.
    pub fn register(&mut self, id: StepId, element: Option<Element>) {
        let observed = self.visible.contains(&id);

        match element {
            Some(el) => {
                let replaced = self
                    .elements
                    .insert(id.clone(), Rc::clone(&el))
                    .is_some_and(|old| !same_element(&old, &el));
                if observed {
                    if let Some(obs) = self.observation.as_mut() {
                        if replaced {
                            if let Some(stale) = obs.cards.remove(&id) {
                                self.platform.unobserve(stale);
                            }
                        }
                        if !obs.cards.contains_key(&id) {
                            let target = ObserveTarget::Card(id.clone());
                            obs.cards.insert(id, self.platform.observe_size(&target, &el));
                        }
                    }
                }
                self.notify(Trigger::Mount);
            }
            None => {
                self.elements.remove(&id);
                if let Some(sub) = self.observation.as_mut().and_then(|obs| obs.cards.remove(&id)) {
                    self.platform.unobserve(sub);
                }
            }
        }
    }

    /// Adopt a new visible set, re-subscribe and measure
    ///
    /// `reason` is recorded for diagnostics; every call re-subscribes.
    pub fn sync(&mut self, visible: &[StepId], reason: &Trigger) -> Arc<GeometrySnapshot> {
        self.visible = visible.to_vec();
        self.release_subscriptions();

        let mut obs = Observation::default();
        if let Some(el) = self.container.as_ref() {
            obs.container = Some(self.platform.observe_size(&ObserveTarget::Container, el));
        }
        for id in &self.visible {
            let Some(el) = self.elements.get(id) else {
                continue;
            };
            if !obs.cards.contains_key(id) {
                let sub = self.platform.observe_size(&ObserveTarget::Card(id.clone()), el);
                obs.cards.insert(id.clone(), sub);
            }
        }
        obs.scroll = Some(self.platform.observe_scroll());
        obs.resize = Some(self.platform.observe_resize());

        tracing::debug!(
            ?reason,
            visible = self.visible.len(),
            subscriptions = obs.len(),
            "layout engine synced"
        );
        self.observation = Some(obs);
        self.measure()
    }

    /// Record a layout-affecting event; the pass runs on the next flush
    pub fn notify(&mut self, trigger: Trigger) {
        self.stats.triggers += 1;
        if self.pending.is_some() {
            self.stats.coalesced += 1;
        } else {
            self.pending = Some(trigger);
        }
    }

    /// Run one pass if anything is pending
    ///
    /// Returns `true` if a pass ran.
    pub fn flush(&mut self) -> bool {
        if self.pending.is_none() {
            return false;
        }
        self.measure();
        true
    }

    /// Measure now and replace the snapshot
    ///
    /// With no container mounted nothing is read; the current snapshot is
    /// kept, minus any step that is no longer visible.
    pub fn measure(&mut self) -> Arc<GeometrySnapshot> {
        let trigger = self.pending.take();

        let Some(container) = self.container.as_ref() else {
            if self.snapshot.ids().any(|id| !self.visible.contains(id)) {
                self.snapshot = Arc::new(self.snapshot.restricted_to(&self.visible));
            }
            tracing::debug!(
                ?trigger,
                kept = self.snapshot.len(),
                "measure skipped: container not mounted"
            );
            return Arc::clone(&self.snapshot);
        };

        let origin = container.bounding_box();
        let container_width = container.client_width();

        let mut rects: IndexMap<StepId, Rect> = IndexMap::with_capacity(self.visible.len());
        for id in &self.visible {
            let Some(el) = self.elements.get(id) else {
                continue;
            };
            rects.insert(id.clone(), el.bounding_box().relative_to(&origin));
        }

        self.stats.passes += 1;
        tracing::debug!(
            ?trigger,
            pass = self.stats.passes,
            measured = rects.len(),
            visible = self.visible.len(),
            "measurement pass"
        );

        self.snapshot = Arc::new(GeometrySnapshot::new(container_width, origin.height, rects));
        Arc::clone(&self.snapshot)
    }

    /// Latest snapshot
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Arc<GeometrySnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Visible set the engine measures
    #[inline]
    #[must_use]
    pub fn visible(&self) -> &[StepId] {
        &self.visible
    }

    /// Whether a pass is pending
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether subscriptions are active
    #[inline]
    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.observation.is_some()
    }

    /// Number of active platform subscriptions
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.observation.as_ref().map_or(0, Observation::len)
    }

    /// Number of registered card elements
    #[inline]
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.elements.len()
    }

    /// Whether a card element is registered
    #[inline]
    #[must_use]
    pub fn is_registered(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    /// Coalescing counters
    #[inline]
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Ask the platform whether the single-column layout applies
    #[inline]
    #[must_use]
    pub fn is_narrow(&self, max_width: f64) -> bool {
        self.platform.matches_narrow_viewport(max_width)
    }

    /// Release every subscription
    pub fn teardown(&mut self) {
        let released = self.release_subscriptions();
        if released > 0 {
            tracing::debug!(released, "layout engine torn down");
        }
        self.pending = None;
    }

    fn release_subscriptions(&mut self) -> usize {
        let Some(mut obs) = self.observation.take() else {
            return 0;
        };
        let ids = obs.drain();
        for id in &ids {
            self.platform.unobserve(*id);
        }
        ids.len()
    }
}

fn same_element(a: &Element, b: &Element) -> bool {
    Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
}

impl<P: Platform> Drop for LayoutEngine<P> {
    fn drop(&mut self) {
        self.release_subscriptions();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ElementHandle, StaticPlatform};
    use std::cell::Cell;

    #[derive(Debug)]
    struct Boxed(Cell<Rect>);

    impl ElementHandle for Boxed {
        fn bounding_box(&self) -> Rect {
            self.0.get()
        }
    }

    fn element(x: f64, y: f64, w: f64, h: f64) -> Rc<Boxed> {
        Rc::new(Boxed(Cell::new(Rect::new(x, y, w, h))))
    }

    fn ids(list: &[&str]) -> Vec<StepId> {
        list.iter().map(|s| StepId::from(*s)).collect()
    }

    #[test]
    fn measure_without_container_is_noop() {
        let mut engine = LayoutEngine::new(StaticPlatform::new(1200.0));
        engine.register("a".into(), Some(element(0.0, 0.0, 10.0, 10.0)));
        let snap = engine.sync(&ids(&["a"]), &Trigger::Mount);
        assert!(snap.is_empty());
        assert_eq!(engine.stats().passes, 0);
    }

    #[test]
    fn rects_are_container_relative() {
        let mut engine = LayoutEngine::new(StaticPlatform::new(1200.0));
        engine.mount_container(Some(element(50.0, 100.0, 1000.0, 900.0)));
        engine.register("a".into(), Some(element(80.0, 160.0, 300.0, 120.0)));

        let snap = engine.sync(&ids(&["a"]), &Trigger::Mount);
        assert_eq!(snap.get("a"), Some(&Rect::new(30.0, 60.0, 300.0, 120.0)));
        assert_eq!(snap.container_width(), 1000.0);
    }

    #[test]
    fn unregistered_steps_are_skipped() {
        let mut engine = LayoutEngine::new(StaticPlatform::new(1200.0));
        engine.mount_container(Some(element(0.0, 0.0, 1000.0, 900.0)));
        engine.register("a".into(), Some(element(0.0, 0.0, 100.0, 100.0)));

        let snap = engine.sync(&ids(&["a", "b"]), &Trigger::Mount);
        assert_eq!(snap.len(), 1);
        assert!(!snap.contains("b"));
    }

    #[test]
    fn notify_coalesces_until_flush() {
        let mut engine = LayoutEngine::new(StaticPlatform::new(1200.0));
        engine.mount_container(Some(element(0.0, 0.0, 1000.0, 900.0)));
        engine.sync(&[], &Trigger::Mount);
        let before = engine.stats().passes;

        engine.notify(Trigger::WindowScroll);
        engine.notify(Trigger::WindowScroll);
        engine.notify(Trigger::WindowResize);
        assert!(engine.is_dirty());

        assert!(engine.flush());
        assert!(!engine.flush());
        assert_eq!(engine.stats().passes, before + 1);
        assert_eq!(engine.stats().coalesced, 2);
    }

    #[test]
    fn unregister_drops_element_reference() {
        let mut engine = LayoutEngine::new(StaticPlatform::new(1200.0));
        let el = element(0.0, 0.0, 10.0, 10.0);
        engine.register("a".into(), Some(el.clone()));
        assert_eq!(Rc::strong_count(&el), 2);

        engine.register("a".into(), None);
        assert_eq!(Rc::strong_count(&el), 1);
        assert!(!engine.is_registered("a"));
    }
}
