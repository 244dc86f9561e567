//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use msgarchive::driver::{Driver, DriverError, DriverResult, Locator};
use msgarchive::models::{Config, SiteSelectors};

pub const LISTING_URL: &str = "https://m.example.com/messages/?pageNum=1";

/// Config pointing at the fake site and a scratch archive directory.
pub fn test_config(archive_dir: &Path) -> Config {
    let mut config = Config::default();
    config.listing.url = LISTING_URL.to_string();
    config.archive.dir = archive_dir.to_path_buf();
    config.archive.max_conversations = 1_000;
    config.traversal.listing_timeout_secs = 1;
    config.traversal.thread_timeout_secs = 1;
    config.traversal.retry_delay_ms = 0;
    config
}

pub fn detail_url(id: &str) -> String {
    format!("https://m.example.com/messages/read/?tid={id}")
}

pub fn page_url(n: usize) -> String {
    format!("https://m.example.com/messages/?pageNum={n}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Role {
    #[default]
    Plain,
    LoadOlder,
}

/// A scripted element: attributes, text, and what lives "around" it.
#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    attrs: HashMap<String, String>,
    text: String,
    scoped: HashMap<Locator, FakeElement>,
    role: Role,
}

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn scoped(mut self, locator: Locator, element: FakeElement) -> Self {
        self.scoped.insert(locator, element);
        self
    }
}

/// A listing link with its name and optional date label.
pub fn conversation_link(id: &str, name: &str, date: Option<&str>) -> FakeElement {
    let sel = SiteSelectors::default();
    let mut link = FakeElement::new()
        .attr("href", &detail_url(id))
        .scoped(sel.stub_name, FakeElement::new().text(name));
    if let Some(date) = date {
        link = link.scoped(sel.stub_date, FakeElement::new().text(date));
    }
    link
}

/// A link that is not a conversation.
pub fn other_link(href: &str) -> FakeElement {
    FakeElement::new().attr("href", href).text("elsewhere")
}

/// A "next page" control pointing at `href`.
pub fn next_control(href: &str) -> FakeElement {
    FakeElement::new().scoped(
        SiteSelectors::default().next_page_link,
        FakeElement::new().attr("href", href),
    )
}

#[derive(Debug, Clone)]
struct Thread {
    remaining: usize,
    intercepts: usize,
}

/// One scripted page.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    elements: HashMap<Locator, Vec<FakeElement>>,
    markup: String,
    thread: Option<Thread>,
}

impl FakePage {
    /// A rendered listing page.
    pub fn listing(links: Vec<FakeElement>, next: Option<FakeElement>) -> Self {
        let sel = SiteSelectors::default();
        let mut elements = HashMap::new();
        elements.insert(sel.listing_container, vec![FakeElement::new()]);
        elements.insert(sel.listing_link, links);
        if let Some(next) = next {
            elements.insert(sel.next_page, vec![next]);
        }
        Self {
            elements,
            ..Self::default()
        }
    }

    /// A listing page whose container never renders.
    pub fn blank() -> Self {
        Self::default()
    }

    /// A thread that needs `clicks` expansions before its control disappears.
    pub fn thread(clicks: usize, markup: &str) -> Self {
        Self {
            markup: markup.to_string(),
            thread: Some(Thread {
                remaining: clicks,
                intercepts: 0,
            }),
            ..Self::default()
        }
    }

    /// A thread view that never shows its load control.
    pub fn unloadable(markup: &str) -> Self {
        Self {
            markup: markup.to_string(),
            ..Self::default()
        }
    }

    /// Make the next `n` expansion clicks fail as intercepted.
    pub fn intercepting(mut self, n: usize) -> Self {
        if let Some(thread) = self.thread.as_mut() {
            thread.intercepts = n;
        }
        self
    }
}

/// Live handle; invalid once the view re-renders.
pub struct FakeHandle {
    generation: u64,
    element: FakeElement,
}

#[derive(Default)]
struct State {
    pages: HashMap<String, FakePage>,
    current: Option<String>,
    generation: u64,
    clicks: usize,
    failed_clicks: usize,
    navigations: Vec<String>,
}

/// In-memory driver over scripted pages.
pub struct FakeDriver {
    state: Mutex<State>,
    load_older: Locator,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            load_older: SiteSelectors::default().load_older,
        }
    }

    pub fn page(self, url: &str, page: FakePage) -> Self {
        self.state
            .lock()
            .unwrap()
            .pages
            .insert(url.to_string(), page);
        self
    }

    /// Successful expansion clicks so far.
    pub fn clicks(&self) -> usize {
        self.state.lock().unwrap().clicks
    }

    pub fn failed_clicks(&self) -> usize {
        self.state.lock().unwrap().failed_clicks
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    fn handle(generation: u64, element: FakeElement) -> FakeHandle {
        FakeHandle {
            generation,
            element,
        }
    }

    fn check(state: &State, handle: &FakeHandle) -> DriverResult<()> {
        if handle.generation == state.generation {
            Ok(())
        } else {
            Err(DriverError::Stale)
        }
    }

    fn lookup(&self, state: &State, locator: &Locator) -> Vec<FakeHandle> {
        let Some(page) = state.current.as_ref().and_then(|url| state.pages.get(url)) else {
            return Vec::new();
        };

        if *locator == self.load_older {
            return match &page.thread {
                Some(thread) if thread.remaining > 0 => {
                    let control = FakeElement {
                        role: Role::LoadOlder,
                        text: "See Older Messages".into(),
                        ..FakeElement::default()
                    };
                    vec![Self::handle(state.generation, control)]
                }
                _ => Vec::new(),
            };
        }

        page.elements
            .get(locator)
            .map(|els| {
                els.iter()
                    .cloned()
                    .map(|el| Self::handle(state.generation, el))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Driver for FakeDriver {
    type Element = FakeHandle;

    async fn navigate(&self, url: &str) -> DriverResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.pages.contains_key(url) {
            return Err(DriverError::Navigation {
                url: url.to_string(),
                message: "404".into(),
            });
        }
        state.current = Some(url.to_string());
        state.generation += 1;
        state.navigations.push(url.to_string());
        Ok(())
    }

    async fn wait_until_present(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> DriverResult<FakeHandle> {
        let state = self.state.lock().unwrap();
        self.lookup(&state, locator)
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::timeout(locator, timeout))
    }

    async fn find_all(&self, locator: &Locator) -> DriverResult<Vec<FakeHandle>> {
        let state = self.state.lock().unwrap();
        Ok(self.lookup(&state, locator))
    }

    async fn get_attribute(&self, element: &FakeHandle, name: &str) -> DriverResult<Option<String>> {
        let state = self.state.lock().unwrap();
        Self::check(&state, element)?;
        if name == "textContent" {
            return Ok(Some(element.element.text.clone()));
        }
        Ok(element.element.attrs.get(name).cloned())
    }

    async fn find_in_scope(&self, element: &FakeHandle, locator: &Locator) -> DriverResult<FakeHandle> {
        let state = self.state.lock().unwrap();
        Self::check(&state, element)?;
        element
            .element
            .scoped
            .get(locator)
            .cloned()
            .map(|el| Self::handle(state.generation, el))
            .ok_or_else(|| DriverError::NotFound(locator.to_string()))
    }

    async fn click(&self, element: &FakeHandle) -> DriverResult<()> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        Self::check(state, element)?;
        if element.element.role != Role::LoadOlder {
            return Ok(());
        }

        let Some(url) = state.current.clone() else {
            return Err(DriverError::Other("no page".into()));
        };
        let thread = state
            .pages
            .get_mut(&url)
            .and_then(|page| page.thread.as_mut())
            .ok_or_else(|| DriverError::Other("not a thread".into()))?;

        if thread.intercepts > 0 {
            thread.intercepts -= 1;
            state.failed_clicks += 1;
            return Err(DriverError::Intercepted("overlay".into()));
        }

        thread.remaining -= 1;
        state.clicks += 1;
        // older messages were prepended; every handle is now stale
        state.generation += 1;
        Ok(())
    }

    async fn current_markup(&self) -> DriverResult<String> {
        let state = self.state.lock().unwrap();
        state
            .current
            .as_ref()
            .and_then(|url| state.pages.get(url))
            .map(|page| page.markup.clone())
            .ok_or_else(|| DriverError::Other("no page".into()))
    }
}

/// Thread markup with one message per `(author, millis, body)`.
pub fn thread_markup(messages: &[(&str, i64, &str)]) -> String {
    let body: String = messages
        .iter()
        .map(|(author, ts, text)| {
            format!(
                r#"<div data-store='{{"author":"{author}","timestamp":{ts}}}'>{text}</div>"#
            )
        })
        .collect();
    format!(r#"<html><body><div class="msg">{body}</div></body></html>"#)
}
