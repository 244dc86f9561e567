//! Archive persistence.
//!
//! Each archive type is one append-only stream of JSON lines. A stream is
//! paired with an in-memory dedup filter for the lifetime of one traversal, so
//! a record is written at most once per run per key:
//!
//! ```text
//! archive(record)
//!   ├── filter.test(key) == true  → skip
//!   └── otherwise                 → append line, flush, filter.add(key)
//! ```

pub mod archive;
pub mod filter;

use std::borrow::Cow;

use serde::Serialize;

use crate::models::{Conversation, KeyField, Message, MessageDate};
use crate::utils::date::format_timestamp;

// Re-export for convenience
pub use archive::{ArchiveOutcome, ArchiveSummary, ArchiveWriter, archive_path, read_archive};
pub use filter::{BloomDedup, DedupFilter};

/// A value that can be written to an archive stream.
pub trait ArchiveRecord: Serialize {
    /// The value identifying this record for deduplication.
    fn dedup_key(&self, field: KeyField) -> Cow<'_, str>;
}

impl ArchiveRecord for Conversation {
    fn dedup_key(&self, field: KeyField) -> Cow<'_, str> {
        match field {
            KeyField::Name => Cow::Borrowed(&self.name),
            KeyField::Url => Cow::Borrowed(&self.url),
        }
    }
}

impl ArchiveRecord for Message {
    /// Author, timestamp and body together. Messages carry no URL, so the
    /// configured field does not apply.
    fn dedup_key(&self, _field: KeyField) -> Cow<'_, str> {
        let date = match &self.date {
            Some(MessageDate::At(ts)) => format_timestamp(ts),
            Some(MessageDate::Text(text)) => text.clone(),
            None => String::new(),
        };
        Cow::Owned(format!("{}\u{1f}{}\u{1f}{}", self.name, date, self.content))
    }
}
