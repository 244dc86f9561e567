//! Pipeline entry points.
//!
//! - `Orchestrator`: walk the listing, hydrate and archive every conversation
//! - `run_extract`: extract messages from a saved thread page
//! - `run_inspect`: summarize an archive stream
//! - `run_validate`: check a configuration file

pub mod extract;
pub mod inspect;
pub mod traverse;
pub mod validate;

pub use extract::{ExtractOutcome, run_extract};
pub use inspect::{ArchiveStats, run_inspect};
pub use traverse::{DeletionHook, NoDeletion, Orchestrator, TraversalEnd, TraversalReport};
pub use validate::run_validate;
