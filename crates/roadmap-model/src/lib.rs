//! Roadmap Model
//!
//! Immutable curriculum steps and the pure operations over them.
//!
//! # Core Concepts
//!
//! - [`Step`]: One curriculum item, validated at load time
//! - [`StepId`]: Stable identity of a step across renders
//! - [`StepRepository`]: Ordered, read-only sequence of steps
//! - [`filter`]: Case-insensitive substring search producing the visible set
//!
//! # Example
//!
//! ```rust
//! use roadmap_model::{filter, StepRepository};
//!
//! let repo = StepRepository::builtin();
//! let visible = filter(repo.steps(), "metrics");
//! assert!(visible.iter().all(|s| s.haystack().contains("metrics")));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod filter;
mod repository;
mod step;

pub use error::{RepositoryError, StepError};
pub use filter::{filter, filter_ids, normalize_query};
pub use repository::{RepositoryFormat, StepRepository};
pub use step::{Difficulty, Link, Step, StepId};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
