// src/services/expander.rs

//! Thread expansion service.
//!
//! Threads load lazily: only the newest messages are rendered and a
//! "load older" control prepends the previous batch. Expansion clicks that
//! control until it disappears.

use std::time::Duration;

use crate::driver::{Driver, Locator};
use crate::models::{SiteSelectors, TraversalConfig};

/// How expanding one thread ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    /// The control is gone: the whole thread is rendered
    Complete { clicks: usize },
    /// The thread never showed its initial control
    NotLoaded,
}

impl Expansion {
    pub fn is_complete(&self) -> bool {
        matches!(self, Expansion::Complete { .. })
    }
}

/// Drives "load older" expansion of a single thread view.
pub struct ThreadExpander {
    load_older: Locator,
    initial_timeout: Duration,
    retry_delay: Duration,
}

impl ThreadExpander {
    pub fn new(selectors: &SiteSelectors, traversal: &TraversalConfig) -> Self {
        Self {
            load_older: selectors.load_older.clone(),
            initial_timeout: traversal.thread_timeout(),
            retry_delay: traversal.retry_delay(),
        }
    }

    /// Expand the thread the driver is showing until no older history remains.
    pub async fn expand<D: Driver>(&self, driver: &D) -> Expansion {
        if let Err(e) = driver
            .wait_until_present(&self.load_older, self.initial_timeout)
            .await
        {
            log::warn!("Could not load more messages: {}", e);
            return Expansion::NotLoaded;
        }

        let mut clicks = 0;
        loop {
            let control = match driver.find_all(&self.load_older).await {
                Ok(found) => match found.into_iter().next() {
                    Some(control) => control,
                    None => break,
                },
                Err(e) => {
                    log::debug!("Load-older control not locatable ({}), assuming start of thread", e);
                    break;
                }
            };

            match driver.click(&control).await {
                Ok(()) => {
                    clicks += 1;
                    log::debug!("Expanded thread ({} so far)", clicks);
                }
                Err(e) if e.is_transient() => {
                    log::debug!("Load-older click failed ({}), retrying", e);
                    if !self.retry_delay.is_zero() {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
                Err(e) => {
                    log::warn!("Giving up on thread expansion after {} clicks: {}", clicks, e);
                    break;
                }
            }
        }

        Expansion::Complete { clicks }
    }
}
