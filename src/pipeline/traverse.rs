// src/pipeline/traverse.rs

//! Conversation traversal pipeline.
//!
//! ```text
//! enumerating ──► for each stub ──► filtering ──► hydrating ──► archiving ──► done
//!      │                               │ (year mismatch / undated: skip)
//!      └── listing never rendered ──► aborted
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::driver::Driver;
use crate::error::Result;
use crate::models::{Config, Conversation, ConversationStub, Message, sort_chronologically};
use crate::services::{Expansion, ListingEnd, PageWalker, RecordExtractor, ThreadExpander};
use crate::storage::{ArchiveOutcome, ArchiveWriter};

/// Destructive follow-up run once a conversation is safely archived.
///
/// Only called for conversations that were written. An error aborts the
/// traversal; records already written stay in the archive.
#[async_trait]
pub trait DeletionHook<D: Driver>: Send + Sync {
    async fn delete(&self, driver: &D, conversation: &Conversation) -> Result<()>;
}

/// Hook that leaves the source untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDeletion;

#[async_trait]
impl<D: Driver> DeletionHook<D> for NoDeletion {
    async fn delete(&self, _driver: &D, _conversation: &Conversation) -> Result<()> {
        Ok(())
    }
}

/// Terminal state of a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalEnd {
    /// Listing exhausted, every selected stub processed
    Done,
    /// Listing never rendered; nothing was archived
    Aborted,
}

/// Counters for one traversal.
#[derive(Debug, Clone)]
pub struct TraversalReport {
    pub end: TraversalEnd,
    pub pages: usize,
    pub stubs_found: usize,
    pub skipped: usize,
    pub hydration_failures: usize,
    pub archived: usize,
    pub duplicates: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl TraversalReport {
    fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            end: TraversalEnd::Done,
            pages: 0,
            stubs_found: 0,
            skipped: 0,
            hydration_failures: 0,
            archived: 0,
            duplicates: 0,
            start_time,
            end_time: start_time,
        }
    }
}

/// Composes walking, hydration and archival for one archive stream.
pub struct Orchestrator {
    config: Config,
    walker: PageWalker,
    expander: ThreadExpander,
    extractor: RecordExtractor,
}

impl Orchestrator {
    pub fn new(config: Config) -> Result<Self> {
        let walker = PageWalker::new(&config.selectors, &config.listing, &config.traversal)?;
        let expander = ThreadExpander::new(&config.selectors, &config.traversal);
        let extractor = RecordExtractor::new(&config.selectors)?;
        Ok(Self {
            config,
            walker,
            expander,
            extractor,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Archive every selected conversation without deleting anything.
    pub async fn run<D: Driver>(&self, driver: &D) -> Result<TraversalReport> {
        self.run_with_hook(driver, &NoDeletion).await
    }

    /// Archive every selected conversation, calling `hook` after each one.
    pub async fn run_with_hook<D: Driver, H: DeletionHook<D>>(
        &self,
        driver: &D,
        hook: &H,
    ) -> Result<TraversalReport> {
        let mut report = TraversalReport::new(Utc::now());
        let listing_url = &self.config.listing.url;

        // enumerating
        log::info!("Opening conversation listing {}", listing_url);
        let listing = match driver.navigate(listing_url).await {
            Ok(()) => self.walker.walk(driver, listing_url).await,
            Err(e) => {
                log::error!("Could not open conversation listing: {}", e);
                report.end = TraversalEnd::Aborted;
                report.end_time = Utc::now();
                return Ok(report);
            }
        };
        report.pages = listing.pages;
        report.stubs_found = listing.stubs.len();

        if listing.end == ListingEnd::NotRendered {
            report.end = TraversalEnd::Aborted;
            report.end_time = Utc::now();
            return Ok(report);
        }

        let mut writer =
            ArchiveWriter::open(&self.config.archive, &self.config.archive.archive_type).await?;

        for stub in listing.stubs {
            // filtering
            if !self.selected(&stub) {
                log::debug!("Skipping {} (outside year filter)", stub.name);
                report.skipped += 1;
                continue;
            }

            // hydrating
            let messages = match self.hydrate(driver, &stub).await {
                Some(messages) => messages,
                None => {
                    report.hydration_failures += 1;
                    Vec::new()
                }
            };
            let conversation = stub.hydrate(messages);

            // archiving
            match writer.archive(&conversation).await? {
                ArchiveOutcome::Written => {
                    report.archived += 1;
                    hook.delete(driver, &conversation).await?;
                }
                ArchiveOutcome::Duplicate => {
                    log::debug!("Not deleting {}: nothing was archived for it", conversation.url);
                    report.duplicates += 1;
                }
            }
        }

        let summary = writer.close().await?;
        report.end_time = Utc::now();

        log::info!(
            "Traversal complete: {} pages, {} conversations found, {} skipped, {} archived to {}, {} duplicates, {} failed to load",
            report.pages,
            report.stubs_found,
            report.skipped,
            report.archived,
            summary.path.display(),
            report.duplicates,
            report.hydration_failures
        );

        Ok(report)
    }

    /// Year filter: with a year set, only stubs dated in that year pass.
    fn selected(&self, stub: &ConversationStub) -> bool {
        match self.config.traversal.year {
            Some(year) => stub.year() == Some(year),
            None => true,
        }
    }

    /// Load a conversation's full thread. `None` when it could not be loaded.
    async fn hydrate<D: Driver>(&self, driver: &D, stub: &ConversationStub) -> Option<Vec<Message>> {
        log::info!("Loading conversation with {}", stub.name);

        if let Err(e) = driver.navigate(&stub.url).await {
            log::warn!("Could not open conversation {}: {}", stub.url, e);
            return None;
        }

        if let Expansion::NotLoaded = self.expander.expand(driver).await {
            log::warn!("Conversation with {} did not load, archiving without messages", stub.name);
            return None;
        }

        let markup = match driver.current_markup().await {
            Ok(markup) => markup,
            Err(e) => {
                log::warn!("Could not read conversation markup for {}: {}", stub.name, e);
                return None;
            }
        };

        let mut messages = self.extractor.extract(&markup);
        if self.config.traversal.chronological {
            sort_chronologically(&mut messages);
        }
        log::debug!("Extracted {} messages from {}", messages.len(), stub.name);
        Some(messages)
    }
}
