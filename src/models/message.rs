//! Message data structures.

use std::cmp::Ordering;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::date::{archive_format, from_epoch_millis, parse_timestamp};

/// A message timestamp: structured when the source exposed one, raw text otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageDate {
    At(#[serde(with = "archive_format")] NaiveDateTime),
    Text(String),
}

impl MessageDate {
    /// Interpret a side-channel timestamp value.
    ///
    /// Numbers are epoch milliseconds. Strings in the archive format are
    /// structured, anything else is kept verbatim.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .and_then(from_epoch_millis)
                .map(MessageDate::At),
            Value::String(s) => Some(Self::from_text(s)),
            _ => None,
        }
    }

    /// Interpret rendered timestamp text.
    pub fn from_text(text: &str) -> Self {
        match parse_timestamp(text) {
            Some(ts) => MessageDate::At(ts),
            None => MessageDate::Text(text.trim().to_string()),
        }
    }

    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            MessageDate::At(ts) => Some(*ts),
            MessageDate::Text(_) => None,
        }
    }
}

/// One message of a conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author display name
    pub name: String,

    /// Rendered body text
    pub content: String,

    #[serde(default)]
    pub date: Option<MessageDate>,
}

impl Message {
    pub fn new(name: impl Into<String>, content: impl Into<String>, date: Option<MessageDate>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            date,
        }
    }

    fn timestamp(&self) -> Option<NaiveDateTime> {
        self.date.as_ref().and_then(MessageDate::timestamp)
    }
}

/// Stable chronological sort. Messages without a structured timestamp go first.
pub fn sort_chronologically(messages: &mut [Message]) {
    messages.sort_by(|a, b| match (a.timestamp(), b.timestamp()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
