// src/models/selectors.rs

//! Locators for the message listing and thread views.

use serde::{Deserialize, Serialize};

use crate::driver::Locator;

/// Everything the traversal needs to find on the rendered pages.
///
/// Driver-side lookups use [`Locator`]s. Message extraction runs on
/// serialized markup, so those selectors are plain CSS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSelectors {
    /// Container whose presence means the listing has rendered
    #[serde(default = "defaults::listing_container")]
    pub listing_container: Locator,

    /// Link-like elements scanned on every listing page
    #[serde(default = "defaults::listing_link")]
    pub listing_link: Locator,

    /// Conversation name, relative to a qualifying link
    #[serde(default = "defaults::stub_name")]
    pub stub_name: Locator,

    /// Conversation date label, relative to a qualifying link
    #[serde(default = "defaults::stub_date")]
    pub stub_date: Locator,

    /// "Next page" control
    #[serde(default = "defaults::next_page")]
    pub next_page: Locator,

    /// Link inside the next page control, relative to it
    #[serde(default = "defaults::next_page_link")]
    pub next_page_link: Locator,

    /// "Load older messages" control on a thread view
    #[serde(default = "defaults::load_older")]
    pub load_older: Locator,

    /// HTML attribute holding link targets (usually "href")
    #[serde(default = "defaults::link_attr")]
    pub link_attr: String,

    /// CSS selector for each message node in thread markup
    #[serde(default = "defaults::message")]
    pub message: String,

    /// Attribute carrying the message's JSON metadata
    #[serde(default = "defaults::message_meta_attr")]
    pub message_meta_attr: String,

    /// Metadata key for the author name
    #[serde(default = "defaults::author_key")]
    pub author_key: String,

    /// Metadata key for the timestamp
    #[serde(default = "defaults::timestamp_key")]
    pub timestamp_key: String,

    /// CSS selector for rendered author text when metadata lacks it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_author_fallback: Option<String>,

    /// CSS selector for rendered timestamp text when metadata lacks it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_date_fallback: Option<String>,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            listing_container: defaults::listing_container(),
            listing_link: defaults::listing_link(),
            stub_name: defaults::stub_name(),
            stub_date: defaults::stub_date(),
            next_page: defaults::next_page(),
            next_page_link: defaults::next_page_link(),
            load_older: defaults::load_older(),
            link_attr: defaults::link_attr(),
            message: defaults::message(),
            message_meta_attr: defaults::message_meta_attr(),
            author_key: defaults::author_key(),
            timestamp_key: defaults::timestamp_key(),
            message_author_fallback: None,
            message_date_fallback: None,
        }
    }
}

mod defaults {
    use crate::driver::Locator;

    pub fn listing_container() -> Locator {
        Locator::xpath(r#"//div[@id="threadlist_rows"]"#)
    }
    pub fn listing_link() -> Locator {
        Locator::xpath("//a")
    }
    pub fn stub_name() -> Locator {
        Locator::xpath("../../../div/div/header/h3")
    }
    pub fn stub_date() -> Locator {
        Locator::xpath("../../..//abbr")
    }
    pub fn next_page() -> Locator {
        Locator::id("see_older_threads")
    }
    pub fn next_page_link() -> Locator {
        Locator::xpath("a")
    }
    pub fn load_older() -> Locator {
        Locator::text("See Older Messages")
    }
    pub fn link_attr() -> String {
        "href".into()
    }
    pub fn message() -> String {
        "div.msg > div".into()
    }
    pub fn message_meta_attr() -> String {
        "data-store".into()
    }
    pub fn author_key() -> String {
        "author".into()
    }
    pub fn timestamp_key() -> String {
        "timestamp".into()
    }
}
