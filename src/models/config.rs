//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::SiteSelectors;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Archive stream and deduplication settings
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Where the listing starts and how to recognize conversations
    #[serde(default)]
    pub listing: ListingConfig,

    /// Page locators
    #[serde(default)]
    pub selectors: SiteSelectors,

    /// Per-run traversal behavior
    #[serde(default)]
    pub traversal: TraversalConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.archive.max_conversations == 0 {
            return Err(AppError::config(
                "archive.max_conversations must be > 0",
            ));
        }
        if !(self.archive.error_rate > 0.0 && self.archive.error_rate < 1.0) {
            return Err(AppError::config(
                "archive.error_rate must be between 0 and 1 (exclusive)",
            ));
        }
        if self.archive.archive_type.trim().is_empty() {
            return Err(AppError::config("archive.archive_type is empty"));
        }
        if self.listing.url.trim().is_empty() {
            return Err(AppError::config("listing.url is empty"));
        }
        url::Url::parse(&self.listing.url)?;
        regex::Regex::new(&self.listing.detail_pattern)?;
        if self.traversal.listing_timeout_secs == 0 {
            return Err(AppError::config(
                "traversal.listing_timeout_secs must be > 0",
            ));
        }
        if self.traversal.thread_timeout_secs == 0 {
            return Err(AppError::config(
                "traversal.thread_timeout_secs must be > 0",
            ));
        }
        scraper::Selector::parse(&self.selectors.message)
            .map_err(|e| AppError::selector(&self.selectors.message, format!("{e:?}")))?;
        Ok(())
    }
}

/// Which record field identifies "already archived".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyField {
    /// Display name. Distinct conversations sharing a name collapse into one entry.
    #[default]
    Name,
    /// Conversation URL
    Url,
}

/// Archive stream settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Directory the `.log` streams are written to
    #[serde(default = "defaults::archive_dir")]
    pub dir: PathBuf,

    /// Stream name for conversations
    #[serde(default = "defaults::archive_type")]
    pub archive_type: String,

    /// Expected number of distinct conversations (dedup filter capacity)
    #[serde(default = "defaults::max_conversations")]
    pub max_conversations: usize,

    /// Target false positive rate of the dedup filter
    #[serde(default = "defaults::error_rate")]
    pub error_rate: f64,

    /// Field used as the dedup key
    #[serde(default)]
    pub key: KeyField,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            dir: defaults::archive_dir(),
            archive_type: defaults::archive_type(),
            max_conversations: defaults::max_conversations(),
            error_rate: defaults::error_rate(),
            key: KeyField::default(),
        }
    }
}

/// Listing entry point settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// First page of the conversation listing
    #[serde(default = "defaults::listing_url")]
    pub url: String,

    /// Regex a link target must match to count as a conversation
    #[serde(default = "defaults::detail_pattern")]
    pub detail_pattern: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            url: defaults::listing_url(),
            detail_pattern: defaults::detail_pattern(),
        }
    }
}

/// Traversal behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraversalConfig {
    /// Only archive conversations dated in this year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Sort each thread by timestamp instead of keeping document order
    #[serde(default)]
    pub chronological: bool,

    /// How long to wait for the listing to render
    #[serde(default = "defaults::wait_timeout")]
    pub listing_timeout_secs: u64,

    /// How long to wait for a thread's "load older" control
    #[serde(default = "defaults::wait_timeout")]
    pub thread_timeout_secs: u64,

    /// Pause before retrying a click that hit a stale or covered element
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,
}

impl TraversalConfig {
    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }

    pub fn thread_timeout(&self) -> Duration {
        Duration::from_secs(self.thread_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            year: None,
            chronological: false,
            listing_timeout_secs: defaults::wait_timeout(),
            thread_timeout_secs: defaults::wait_timeout(),
            retry_delay_ms: defaults::retry_delay(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Archive defaults
    pub fn archive_dir() -> PathBuf {
        PathBuf::from(".")
    }
    pub fn archive_type() -> String {
        "conversations".into()
    }
    pub fn max_conversations() -> usize {
        10_000
    }
    pub fn error_rate() -> f64 {
        0.001
    }

    // Listing defaults
    pub fn listing_url() -> String {
        "https://mobile.facebook.com/messages/?pageNum=1&selectable&see_older_newer=1".into()
    }
    pub fn detail_pattern() -> String {
        "messages/read".into()
    }

    // Traversal defaults
    pub fn wait_timeout() -> u64 {
        20
    }
    pub fn retry_delay() -> u64 {
        250
    }
}
