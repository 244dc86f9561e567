// src/services/extractor.rs

//! Message extraction from expanded thread markup.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Message, MessageDate, SiteSelectors};

/// Parses thread markup into messages, in document order.
///
/// Author and timestamp are read from the JSON metadata attribute attached to
/// each message node. Rendered text is locale dependent, so it is only used
/// for the body and as a fallback.
pub struct RecordExtractor {
    message_sel: Selector,
    author_fallback: Option<Selector>,
    date_fallback: Option<Selector>,
    meta_attr: String,
    author_key: String,
    timestamp_key: String,
}

impl RecordExtractor {
    /// Build an extractor, compiling every selector up front.
    pub fn new(selectors: &SiteSelectors) -> Result<Self> {
        Ok(Self {
            message_sel: Self::parse_selector(&selectors.message)?,
            author_fallback: selectors
                .message_author_fallback
                .as_deref()
                .map(Self::parse_selector)
                .transpose()?,
            date_fallback: selectors
                .message_date_fallback
                .as_deref()
                .map(Self::parse_selector)
                .transpose()?,
            meta_attr: selectors.message_meta_attr.clone(),
            author_key: selectors.author_key.clone(),
            timestamp_key: selectors.timestamp_key.clone(),
        })
    }

    /// Extract every message in `markup`.
    pub fn extract(&self, markup: &str) -> Vec<Message> {
        let document = Html::parse_document(markup);
        document
            .select(&self.message_sel)
            .map(|node| self.parse_message(&node))
            .collect()
    }

    fn parse_message(&self, node: &ElementRef) -> Message {
        let meta = node
            .value()
            .attr(&self.meta_attr)
            .and_then(|raw| match serde_json::from_str::<Value>(raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    log::debug!("Unreadable {} metadata: {}", self.meta_attr, e);
                    None
                }
            });

        let name = meta
            .as_ref()
            .and_then(|m| m.get(&self.author_key))
            .and_then(Self::author_from_json)
            .or_else(|| Self::fallback_text(node, self.author_fallback.as_ref()))
            .unwrap_or_default();

        let date = meta
            .as_ref()
            .and_then(|m| m.get(&self.timestamp_key))
            .and_then(MessageDate::from_json)
            .or_else(|| {
                Self::fallback_text(node, self.date_fallback.as_ref())
                    .map(|text| MessageDate::from_text(&text))
            });

        let content = node.text().collect::<String>().trim().to_string();

        Message {
            name,
            content,
            date,
        }
    }

    fn author_from_json(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn fallback_text(node: &ElementRef, sel: Option<&Selector>) -> Option<String> {
        let el = node.select(sel?).next()?;
        let text = crate::utils::normalize_whitespace(&el.text().collect::<String>());
        (!text.is_empty()).then_some(text)
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}
