//! Roadmap Core
//!
//! The interactive roadmap session: search, expansion, hover, completion and
//! checklists on top of the layout engine, plus the presentation helpers that
//! turn a frame into something visible.
//!
//! # Core Concepts
//!
//! - [`Roadmap`]: Owns selection state, the [`LayoutEngine`](roadmap_layout::LayoutEngine)
//!   and both trackers; produces a [`RoadmapView`] per frame
//! - [`HeadlessLayout`]: Deterministic grid layout standing in for a browser
//! - [`SvgOverlay`]: Axis, markers and connectors as an SVG document
//! - [`RoadmapConfig`]: TOML-loadable settings
//!
//! # Example
//!
//! ```rust
//! use roadmap_core::{HeadlessLayout, Roadmap, RoadmapConfig};
//! use roadmap_layout::StaticPlatform;
//! use roadmap_model::StepRepository;
//! use roadmap_store::MemoryStore;
//! use std::rc::Rc;
//!
//! let config = RoadmapConfig::default();
//! let store = Rc::new(MemoryStore::new());
//! let mut roadmap = Roadmap::new(
//!     StepRepository::builtin(),
//!     StaticPlatform::new(1280.0),
//!     store,
//!     config.clone(),
//! );
//! let mut layout = HeadlessLayout::new(config.headless);
//! layout.attach(&mut roadmap);
//!
//! let view = roadmap.view();
//! assert_eq!(view.connectors.len(), view.cards.len());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod config;
mod error;
mod headless;
mod render;
mod session;
mod view;

pub use config::RoadmapConfig;
pub use error::ConfigError;
pub use headless::{HeadlessElement, HeadlessLayout, HeadlessMetrics};
pub use render::SvgOverlay;
pub use session::Roadmap;
pub use view::{CardView, ChecklistItemView, ChecklistView, LinkView, RoadmapView};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a roadmap session
    pub use crate::{HeadlessLayout, Roadmap, RoadmapConfig, RoadmapView, SvgOverlay};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
