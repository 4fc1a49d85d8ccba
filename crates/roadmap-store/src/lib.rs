//! Roadmap Store
//!
//! Device-local state: which steps are done and which checklist items are
//! ticked.
//!
//! # Core Concepts
//!
//! - [`PersistenceAdapter`]: Key → JSON value store scoped to one device
//! - [`CompletionTracker`]: Set of completed step ids, persisted on change
//! - [`ChecklistTracker`]: Per-step checklist flags, persisted on change
//!
//! Storage failures never surface to callers of the trackers: they are
//! logged through `tracing` and the in-memory state stays authoritative.
//!
//! # Example
//!
//! ```rust
//! use roadmap_model::StepId;
//! use roadmap_store::{CompletionTracker, MemoryStore, StorageKeys};
//!
//! let store = MemoryStore::new();
//! let mut done = CompletionTracker::load(&store, &StorageKeys::default());
//! done.toggle(&StepId::from("metrics"));
//! assert!(done.is_done("metrics"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod adapter;
mod checklist;
mod completion;
mod error;
mod keys;

pub use adapter::{FileStore, MemoryStore, PersistenceAdapter};
pub use checklist::{ChecklistState, ChecklistTracker};
pub use completion::{CompletionTracker, ProgressSummary};
pub use error::StoreError;
pub use keys::StorageKeys;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
