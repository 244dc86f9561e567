//! Browser automation contract.
//!
//! The traversal never talks to a browser directly. Everything it needs from
//! the UI session goes through [`Driver`], so any automation backend (WebDriver,
//! CDP, a recorded fixture) can be plugged in.
//!
//! Element handles are only valid until the view re-renders. Callers must copy
//! whatever they need out of an element before navigating or clicking.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for driver calls.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// How to find an element. Interpretation is up to the driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locator {
    /// CSS selector
    Css(String),
    /// XPath expression, possibly relative to a scope element
    XPath(String),
    /// Element id
    Id(String),
    /// Any element whose own text contains the given string
    Text(String),
}

impl Locator {
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css={s}"),
            Locator::XPath(s) => write!(f, "xpath={s}"),
            Locator::Id(s) => write!(f, "id={s}"),
            Locator::Text(s) => write!(f, "text~={s}"),
        }
    }
}

/// Failures reported by a driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("element not found: {0}")]
    NotFound(String),

    #[error("stale element reference")]
    Stale,

    #[error("click intercepted: {0}")]
    Intercepted(String),

    #[error("timed out after {timeout:?} waiting for {locator}")]
    Timeout { locator: String, timeout: Duration },

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("driver failure: {0}")]
    Other(String),
}

impl DriverError {
    pub fn timeout(locator: &Locator, timeout: Duration) -> Self {
        Self::Timeout {
            locator: locator.to_string(),
            timeout,
        }
    }

    /// Errors a caller may retry or read as "feature absent".
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DriverError::NotFound(_)
                | DriverError::Stale
                | DriverError::Intercepted(_)
                | DriverError::Timeout { .. }
        )
    }
}

/// Capabilities the traversal consumes from a UI automation session.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Opaque live element handle.
    type Element: Send + Sync;

    /// Load a URL in the session.
    async fn navigate(&self, url: &str) -> DriverResult<()>;

    /// Block until an element matching `locator` exists or `timeout` elapses.
    async fn wait_until_present(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> DriverResult<Self::Element>;

    /// All elements currently matching `locator`, in document order.
    async fn find_all(&self, locator: &Locator) -> DriverResult<Vec<Self::Element>>;

    /// Read an attribute or property of an element.
    async fn get_attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> DriverResult<Option<String>>;

    /// Find the first element matching `locator` relative to `element`.
    async fn find_in_scope(
        &self,
        element: &Self::Element,
        locator: &Locator,
    ) -> DriverResult<Self::Element>;

    /// Click an element. `Stale` and `Intercepted` are retryable.
    async fn click(&self, element: &Self::Element) -> DriverResult<()>;

    /// Serialized markup of the current view.
    async fn current_markup(&self) -> DriverResult<String>;

    /// Rendered text of an element.
    async fn text(&self, element: &Self::Element) -> DriverResult<String> {
        Ok(self
            .get_attribute(element, "textContent")
            .await?
            .unwrap_or_default())
    }
}
