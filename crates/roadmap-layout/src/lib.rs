//! Roadmap Layout
//!
//! Measurement of rendered step cards and the connector curves that tie each
//! card to the shared vertical axis.
//!
//! # Core Concepts
//!
//! - [`LayoutEngine`]: Owns the element registry and the latest
//!   [`GeometrySnapshot`]; re-measures on layout-affecting triggers
//! - [`Platform`]: Size/scroll observation and viewport queries, injected so
//!   the engine runs without a real rendering surface
//! - [`build_connectors`]: Pure snapshot → [`ConnectorSet`] transformation
//!
//! # Architecture
//!
//! ```text
//! visible set ─┐
//!              ├─> LayoutEngine ──> Arc<GeometrySnapshot> ──> build_connectors ──> ConnectorSet
//! elements ────┘        ↑
//!                  Platform notifications (resize, scroll)
//! ```
//!
//! # Example
//!
//! ```rust
//! use roadmap_layout::{build_connectors, ConnectorStyle, LayoutEngine, StaticPlatform, Trigger};
//!
//! let mut engine = LayoutEngine::new(StaticPlatform::new(1280.0));
//! // nothing mounted yet: measuring is a no-op
//! let snapshot = engine.sync(&[], &Trigger::Mount);
//! let set = build_connectors(&snapshot, engine.visible(), &ConnectorStyle::default());
//! assert!(set.extent.is_none());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod connector;
mod engine;
mod geometry;
mod platform;
mod side;
mod snapshot;

pub use connector::{
    axis_extent, bend_magnitude, build_connectors, build_sequence_links, card_anchor, AxisExtent,
    Connector, ConnectorSet, ConnectorStyle, CubicPath, SequenceLink,
};
pub use engine::{EngineStats, LayoutEngine, Trigger};
pub use geometry::{Point, Rect};
pub use platform::{Element, ElementHandle, ObserveTarget, Platform, StaticPlatform, SubscriptionId};
pub use side::{Placement, Side};
pub use snapshot::GeometrySnapshot;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for layout work
    pub use crate::{
        build_connectors, ConnectorSet, ConnectorStyle, Element, ElementHandle, GeometrySnapshot,
        LayoutEngine, Placement, Platform, Point, Rect, Side, Trigger,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
