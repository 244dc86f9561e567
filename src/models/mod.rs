// src/models/mod.rs

//! Domain models for the archiver.
//!
//! Listing stubs, hydrated conversations, messages, and the configuration
//! that drives a traversal.

mod config;
mod conversation;
mod message;
mod selectors;

// Re-export all public types
pub use config::{ArchiveConfig, Config, KeyField, ListingConfig, TraversalConfig};
pub use conversation::{Conversation, ConversationStub};
pub use message::{Message, MessageDate, sort_chronologically};
pub use selectors::SiteSelectors;
