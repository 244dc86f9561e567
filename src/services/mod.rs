//! Service layer for the archiver.
//!
//! This module contains the UI-facing logic for:
//! - Listing traversal (`PageWalker`)
//! - Thread expansion (`ThreadExpander`)
//! - Message extraction (`RecordExtractor`)

mod expander;
mod extractor;
mod walker;

pub use expander::{Expansion, ThreadExpander};
pub use extractor::RecordExtractor;
pub use walker::{Listing, ListingEnd, PageWalker};
