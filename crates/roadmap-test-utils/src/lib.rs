//! Testing utilities for the roadmap workspace
//!
//! Fake rendering surface, fake elements, failing storage and step fixtures.

#![allow(missing_docs)]

use parking_lot::Mutex;
use roadmap_layout::{Element, ElementHandle, ObserveTarget, Platform, Rect, SubscriptionId};
use roadmap_model::{Step, StepId, StepRepository};
use roadmap_store::{PersistenceAdapter, StoreError};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// What a fake subscription watches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeSubscription {
    Size(ObserveTarget),
    Scroll,
    Resize,
}

/// In-memory platform recording every live subscription
#[derive(Debug, Default)]
pub struct FakePlatform {
    next_id: Cell<u64>,
    active: RefCell<BTreeMap<SubscriptionId, FakeSubscription>>,
    watched: RefCell<BTreeMap<SubscriptionId, Element>>,
    total_opened: Cell<u64>,
    viewport_width: Cell<f64>,
}

impl FakePlatform {
    pub fn new(viewport_width: f64) -> Rc<Self> {
        let platform = Self::default();
        platform.viewport_width.set(viewport_width);
        Rc::new(platform)
    }

    pub fn set_viewport_width(&self, width: f64) {
        self.viewport_width.set(width);
    }

    pub fn active_count(&self) -> usize {
        self.active.borrow().len()
    }

    pub fn total_opened(&self) -> u64 {
        self.total_opened.get()
    }

    pub fn observes(&self, sub: &FakeSubscription) -> bool {
        self.active.borrow().values().any(|s| s == sub)
    }

    pub fn observes_card(&self, id: &str) -> bool {
        self.observes(&FakeSubscription::Size(ObserveTarget::Card(StepId::from(id))))
    }

    /// Number of live size subscriptions on the card `id`
    pub fn card_subscriptions(&self, id: &str) -> usize {
        let target = FakeSubscription::Size(ObserveTarget::Card(StepId::from(id)));
        self.active.borrow().values().filter(|s| **s == target).count()
    }

    /// Whether a live size subscription watches exactly this element
    pub fn observes_element<E: ElementHandle + 'static>(&self, element: &Rc<E>) -> bool {
        let wanted = Rc::as_ptr(element).cast::<()>();
        self.watched
            .borrow()
            .values()
            .any(|el| Rc::as_ptr(el).cast::<()>() == wanted)
    }

    fn open(&self, sub: FakeSubscription) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.total_opened.set(self.total_opened.get() + 1);
        self.active.borrow_mut().insert(id, sub);
        id
    }
}

impl Platform for FakePlatform {
    fn observe_size(&self, target: &ObserveTarget, element: &Element) -> SubscriptionId {
        let id = self.open(FakeSubscription::Size(target.clone()));
        self.watched.borrow_mut().insert(id, Rc::clone(element));
        id
    }

    fn observe_scroll(&self) -> SubscriptionId {
        self.open(FakeSubscription::Scroll)
    }

    fn observe_resize(&self) -> SubscriptionId {
        self.open(FakeSubscription::Resize)
    }

    fn unobserve(&self, id: SubscriptionId) {
        self.active.borrow_mut().remove(&id);
        self.watched.borrow_mut().remove(&id);
    }

    fn matches_narrow_viewport(&self, max_width: f64) -> bool {
        self.viewport_width.get() <= max_width
    }
}

/// Element with a settable bounding box
#[derive(Debug, Default)]
pub struct FakeElement {
    rect: Cell<Rect>,
}

impl FakeElement {
    pub fn new(rect: Rect) -> Rc<Self> {
        Rc::new(Self {
            rect: Cell::new(rect),
        })
    }

    pub fn set(&self, rect: Rect) {
        self.rect.set(rect);
    }

    pub fn get(&self) -> Rect {
        self.rect.get()
    }
}

impl ElementHandle for FakeElement {
    fn bounding_box(&self) -> Rect {
        self.rect.get()
    }
}

/// Storage that can be switched into failing mode
#[derive(Debug, Default)]
pub struct FlakyStore {
    values: Mutex<HashMap<String, serde_json::Value>>,
    fail_reads: Mutex<bool>,
    fail_writes: Mutex<bool>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        *self.fail_reads.lock() = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }

    pub fn raw(&self, key: &str) -> Option<serde_json::Value> {
        self.values.lock().get(key).cloned()
    }

    pub fn put_raw(&self, key: &str, value: serde_json::Value) {
        self.values.lock().insert(key.to_string(), value);
    }
}

impl PersistenceAdapter for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        if *self.fail_reads.lock() {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        if *self.fail_writes.lock() {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                limit: 0,
            });
        }
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }
}

/// Steps with the given ids, titled after their id
pub fn steps(ids: &[&str]) -> Vec<Step> {
    ids.iter()
        .map(|id| Step::new(*id, format!("Step {id}"), format!("About {id}")))
        .collect()
}

/// Repository over [`steps`]
pub fn repository(ids: &[&str]) -> StepRepository {
    StepRepository::from_steps(steps(ids)).unwrap()
}

/// Repository `[a, b, c]`
pub fn abc_repository() -> StepRepository {
    repository(&["a", "b", "c"])
}

/// Card rectangle in a three-column layout of `container_width`
///
/// Left column for even rows, right column for odd rows, `row_height` tall
/// rows with a 40 unit gap.
pub fn grid_rect(index: usize, container_width: f64, row_height: f64) -> Rect {
    let column = container_width * 0.42;
    let x = if index % 2 == 0 {
        0.0
    } else {
        container_width - column
    };
    let y = index as f64 * (row_height + 40.0);
    Rect::new(x, y, column, row_height)
}
