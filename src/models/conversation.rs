//! Conversation data structures.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::Message;
use crate::utils::date::archive_format;

/// A listing entry copied out of the page before it re-renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationStub {
    /// Absolute URL of the conversation detail view
    pub url: String,

    /// Display name shown in the listing
    pub name: String,

    /// Date label parsed from the listing, if it could be read
    #[serde(
        default,
        with = "archive_format::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<NaiveDateTime>,
}

impl ConversationStub {
    pub fn new(url: impl Into<String>, name: impl Into<String>, date: Option<NaiveDateTime>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            date,
        }
    }

    /// Year of the listing date.
    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }

    /// Attach a message thread, producing the archivable conversation.
    pub fn hydrate(self, messages: Vec<Message>) -> Conversation {
        Conversation {
            url: self.url,
            name: self.name,
            date: self.date,
            messages,
        }
    }
}

/// A stub together with its full message thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub url: String,

    pub name: String,

    #[serde(
        default,
        with = "archive_format::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<NaiveDateTime>,

    /// Messages in extraction order
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_hydrate_keeps_stub_fields() {
        let date = NaiveDate::from_ymd_opt(2019, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let stub = ConversationStub::new("https://m.example.com/messages/read/?tid=1", "Alice", Some(date));
        assert_eq!(stub.year(), Some(2019));

        let convo = stub.hydrate(vec![Message::new("Alice", "hi", None)]);
        assert_eq!(convo.name, "Alice");
        assert_eq!(convo.date, Some(date));
        assert_eq!(convo.messages.len(), 1);
    }

    #[test]
    fn test_undated_conversation_omits_date() {
        let convo = ConversationStub::new("u", "Bob", None).hydrate(Vec::new());
        let json = serde_json::to_value(&convo).unwrap();
        assert!(json.get("date").is_none());
        assert_eq!(json["messages"], serde_json::json!([]));
    }
}
