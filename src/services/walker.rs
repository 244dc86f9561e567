// src/services/walker.rs

//! Paginated listing walker.
//!
//! Element handles die whenever the listing navigates, so every page is
//! copied into owned [`ConversationStub`]s before the next one is requested.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use regex::Regex;

use crate::driver::{Driver, DriverResult, Locator};
use crate::error::Result;
use crate::models::{ConversationStub, ListingConfig, SiteSelectors, TraversalConfig};
use crate::utils::{self, date::parse_listing_date};

/// Why a walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingEnd {
    /// Ran out of pages
    Exhausted,
    /// The listing container never rendered
    NotRendered,
}

/// Every stub of a listing, in page then document order.
#[derive(Debug, Clone)]
pub struct Listing {
    pub stubs: Vec<ConversationStub>,
    pub pages: usize,
    pub end: ListingEnd,
}

impl Listing {
    fn not_rendered() -> Self {
        Self {
            stubs: Vec::new(),
            pages: 0,
            end: ListingEnd::NotRendered,
        }
    }
}

/// Walks a paginated conversation listing.
pub struct PageWalker {
    selectors: SiteSelectors,
    detail_pattern: Regex,
    timeout: Duration,
}

impl PageWalker {
    pub fn new(
        selectors: &SiteSelectors,
        listing: &ListingConfig,
        traversal: &TraversalConfig,
    ) -> Result<Self> {
        Ok(Self {
            selectors: selectors.clone(),
            detail_pattern: Regex::new(&listing.detail_pattern)?,
            timeout: traversal.listing_timeout(),
        })
    }

    /// Collect every stub, starting from the page the driver is on.
    ///
    /// `first_page` is the URL the driver was navigated to; relative links are
    /// resolved against the page they were found on.
    pub async fn walk<D: Driver>(&self, driver: &D, first_page: &str) -> Listing {
        if let Err(e) = driver
            .wait_until_present(&self.selectors.listing_container, self.timeout)
            .await
        {
            log::error!("No conversations: listing did not render ({})", e);
            return Listing::not_rendered();
        }

        let now = Local::now().naive_local();
        let mut stubs = Vec::new();
        let mut visited = HashSet::from([first_page.to_string()]);
        let mut page_url = first_page.to_string();
        let mut pages = 0;

        loop {
            pages += 1;
            let found = self.scan_page(driver, &page_url, now).await;
            log::info!("Listing page {}: {} conversations", pages, found.len());
            stubs.extend(found);

            let Some(next) = self.next_page_url(driver, &page_url).await else {
                break;
            };
            if !visited.insert(next.clone()) {
                log::warn!("Next page {} was already visited, stopping", next);
                break;
            }
            if let Err(e) = driver.navigate(&next).await {
                log::warn!("Could not open next listing page {}: {}", next, e);
                break;
            }
            page_url = next;
        }

        Listing {
            stubs,
            pages,
            end: ListingEnd::Exhausted,
        }
    }

    /// Copy every qualifying link on the current page into owned stubs.
    async fn scan_page<D: Driver>(
        &self,
        driver: &D,
        page_url: &str,
        now: NaiveDateTime,
    ) -> Vec<ConversationStub> {
        let links = match driver.find_all(&self.selectors.listing_link).await {
            Ok(links) => links,
            Err(e) => {
                log::warn!("Could not list links on {}: {}", page_url, e);
                return Vec::new();
            }
        };

        let mut stubs = Vec::new();
        for link in &links {
            let href = match driver.get_attribute(link, &self.selectors.link_attr).await {
                Ok(Some(href)) if self.detail_pattern.is_match(&href) => href,
                Ok(_) => continue,
                Err(e) => {
                    log::debug!("Skipping unreadable link: {}", e);
                    continue;
                }
            };

            let name = match self.scoped_text(driver, link, &self.selectors.stub_name).await {
                Ok(name) if !name.is_empty() => name,
                Ok(_) => {
                    log::warn!("Conversation link {} has an empty name, skipping", href);
                    continue;
                }
                Err(e) => {
                    log::warn!("No name for conversation link {}: {}", href, e);
                    continue;
                }
            };

            let date = match self.scoped_text(driver, link, &self.selectors.stub_date).await {
                Ok(text) => {
                    let parsed = parse_listing_date(&text, now);
                    if parsed.is_none() {
                        log::debug!("Unrecognized date label '{}' for {}", text, name);
                    }
                    parsed
                }
                Err(e) => {
                    log::debug!("No date label for {}: {}", name, e);
                    None
                }
            };

            stubs.push(ConversationStub::new(
                utils::resolve(page_url, &href),
                name,
                date,
            ));
        }
        stubs
    }

    /// Target of the "next page" control, if there is a usable one.
    async fn next_page_url<D: Driver>(&self, driver: &D, page_url: &str) -> Option<String> {
        match self.next_page_target(driver).await {
            Ok(Some(href)) if !href.trim().is_empty() => Some(utils::resolve(page_url, href.trim())),
            Ok(_) => {
                log::debug!("No next page after {}", page_url);
                None
            }
            Err(e) => {
                log::debug!("Next page control unavailable on {}: {}", page_url, e);
                None
            }
        }
    }

    async fn next_page_target<D: Driver>(&self, driver: &D) -> DriverResult<Option<String>> {
        let Some(control) = driver
            .find_all(&self.selectors.next_page)
            .await?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };
        let link = driver
            .find_in_scope(&control, &self.selectors.next_page_link)
            .await?;
        driver.get_attribute(&link, &self.selectors.link_attr).await
    }

    async fn scoped_text<D: Driver>(
        &self,
        driver: &D,
        scope: &D::Element,
        locator: &Locator,
    ) -> DriverResult<String> {
        let el = driver.find_in_scope(scope, locator).await?;
        let text = driver.text(&el).await?;
        Ok(utils::normalize_whitespace(&text))
    }
}
