//! Rendering platform abstraction
//!
//! The engine never talks to a browser directly. Rendered cards and the
//! container are [`ElementHandle`]s; size and scroll observation go through
//! [`Platform`]. Notifications travel the other way: the host calls
//! [`LayoutEngine::notify`](crate::LayoutEngine::notify) when a subscription
//! fires.

use crate::geometry::Rect;
use roadmap_model::StepId;
use std::fmt::{self, Debug, Display, Formatter};
use std::rc::Rc;

/// A rendered element whose box can be read
pub trait ElementHandle: Debug {
    /// Current bounding box in viewport coordinates
    fn bounding_box(&self) -> Rect;

    /// Inner width excluding borders and scrollbars
    ///
    /// Defaults to the bounding box width.
    fn client_width(&self) -> f64 {
        self.bounding_box().width
    }
}

/// Shared handle to a rendered element
pub type Element = Rc<dyn ElementHandle>;

/// What a size subscription watches
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObserveTarget {
    /// The shared container
    Container,
    /// One step card
    Card(StepId),
}

/// Opaque handle returned by the platform for one subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Observation services of the rendering surface
pub trait Platform {
    /// Start watching size changes of `element`, which renders `target`
    fn observe_size(&self, target: &ObserveTarget, element: &Element) -> SubscriptionId;

    /// Start watching page scroll
    fn observe_scroll(&self) -> SubscriptionId;

    /// Start watching window resize
    fn observe_resize(&self) -> SubscriptionId;

    /// Stop a subscription; unknown ids are ignored
    fn unobserve(&self, id: SubscriptionId);

    /// Whether the viewport is at most `max_width` wide
    fn matches_narrow_viewport(&self, max_width: f64) -> bool;
}

impl<P: Platform + ?Sized> Platform for Rc<P> {
    fn observe_size(&self, target: &ObserveTarget, element: &Element) -> SubscriptionId {
        (**self).observe_size(target, element)
    }

    fn observe_scroll(&self) -> SubscriptionId {
        (**self).observe_scroll()
    }

    fn observe_resize(&self) -> SubscriptionId {
        (**self).observe_resize()
    }

    fn unobserve(&self, id: SubscriptionId) {
        (**self).unobserve(id);
    }

    fn matches_narrow_viewport(&self, max_width: f64) -> bool {
        (**self).matches_narrow_viewport(max_width)
    }
}

/// Platform that observes nothing and reports a fixed viewport width
///
/// Suitable for one-shot measurements where the host drives every pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPlatform {
    viewport_width: f64,
}

impl StaticPlatform {
    /// Create with viewport width
    #[inline]
    #[must_use]
    pub const fn new(viewport_width: f64) -> Self {
        Self { viewport_width }
    }
}

impl Platform for StaticPlatform {
    fn observe_size(&self, _target: &ObserveTarget, _element: &Element) -> SubscriptionId {
        SubscriptionId(0)
    }

    fn observe_scroll(&self) -> SubscriptionId {
        SubscriptionId(0)
    }

    fn observe_resize(&self) -> SubscriptionId {
        SubscriptionId(0)
    }

    fn unobserve(&self, _id: SubscriptionId) {}

    fn matches_narrow_viewport(&self, max_width: f64) -> bool {
        self.viewport_width <= max_width
    }
}
