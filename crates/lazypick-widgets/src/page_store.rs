//! Accumulated, deduplicated options loaded page by page.
//!
//! [`PageStore`] owns the option collection, the cursor for the next page,
//! and the loading flag. Loads are commands: [`PageStore::load_page`] sets
//! `loading` and calls the source *before* returning, and the response comes
//! back later as a [`Message`] handed to [`PageStore::update`]. Because the
//! flag is already set when the command leaves the store, any
//! [`load_next`](PageStore::load_next) handled before the response arrives
//! sees a load in flight and does nothing.
//!
//! Fetch failures end here. They are logged and remembered for
//! [`retry`](PageStore::retry); callers never see them as errors.

use crate::option::{OptionId, Page, SelectOption};
use crate::source::{FetchError, PageSource};
use lazypick_core::Command;
use std::collections::HashSet;
use std::sync::Arc;

/// Messages produced by the store's own load commands.
#[derive(Debug)]
pub enum Message {
    /// A fetch finished, successfully or not.
    PageLoaded {
        generation: u64,
        url: String,
        append: bool,
        result: Result<Page, FetchError>,
    },
}

/// What [`PageStore::update`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page was merged; `added` options were new.
    Merged { added: usize },
    /// The fetch failed; nothing changed except the loading flag.
    Failed,
    /// The response belonged to a load issued before a reset or disposal.
    Discarded,
}

/// The request behind the most recent failed load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedLoad {
    pub url: String,
    pub append: bool,
    pub reason: String,
}

pub struct PageStore {
    source: Arc<dyn PageSource>,
    initial_url: String,
    items: Vec<SelectOption>,
    next: Option<String>,
    loading: bool,
    failure: Option<FailedLoad>,
    generation: u64,
    disposed: bool,
}

impl PageStore {
    pub fn new(source: Arc<dyn PageSource>, initial_url: impl Into<String>) -> Self {
        Self {
            source,
            initial_url: initial_url.into(),
            items: Vec::new(),
            next: None,
            loading: false,
            failure: None,
            generation: 0,
            disposed: false,
        }
    }

    /// Issue the first load against the initial URL, replacing whatever is
    /// held. Responses to loads issued earlier are discarded when they land.
    pub fn start(&mut self) -> Command<Message> {
        self.generation += 1;
        self.failure = None;
        let url = self.initial_url.clone();
        self.load_page(url, false)
    }

    /// Fetch `url` and merge it: behind the current options when `append`,
    /// in place of them otherwise.
    pub fn load_page(&mut self, url: impl Into<String>, append: bool) -> Command<Message> {
        if self.disposed {
            return Command::none();
        }
        let url = url.into();
        self.loading = true;
        let generation = self.generation;
        tracing::debug!(%url, append, generation, "loading page");
        let fetch = self.source.fetch(&url);
        Command::perform(fetch, move |result| Message::PageLoaded {
            generation,
            url,
            append,
            result,
        })
    }

    /// Load the page after the last one, unless a load is in flight or there
    /// is no further page.
    pub fn load_next(&mut self) -> Command<Message> {
        if self.loading || self.disposed {
            tracing::trace!("load_next ignored: load in flight");
            return Command::none();
        }
        match self.next.clone() {
            Some(url) => self.load_page(url, true),
            None => Command::none(),
        }
    }

    /// Re-issue the request that failed last. No-op while loading or when
    /// nothing has failed.
    pub fn retry(&mut self) -> Command<Message> {
        if self.loading || self.disposed {
            return Command::none();
        }
        match self.failure.take() {
            Some(failed) => {
                tracing::info!(url = %failed.url, "retrying page load");
                self.load_page(failed.url, failed.append)
            }
            None => Command::none(),
        }
    }

    /// Stop accepting responses. Loads still in flight are discarded when
    /// they land and further loads are no-ops. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        tracing::debug!(in_flight = self.loading, "disposing page store");
        self.disposed = true;
        self.generation += 1;
        self.loading = false;
    }

    pub fn update(&mut self, msg: Message) -> LoadOutcome {
        match msg {
            Message::PageLoaded {
                generation,
                url,
                append,
                result,
            } => {
                if self.disposed || generation != self.generation {
                    tracing::debug!(%url, "discarding response from a stale load");
                    return LoadOutcome::Discarded;
                }
                self.loading = false;
                match result {
                    Ok(page) => {
                        let received = page.options.len();
                        let before = if append { self.items.len() } else { 0 };
                        self.merge(page.options, append);
                        let added = self.items.len() - before;
                        if added < received {
                            tracing::debug!(duplicates = received - added, %url, "dropped duplicate ids");
                        }
                        self.next = page.next;
                        self.failure = None;
                        tracing::info!(%url, added, total = self.items.len(), more = self.next.is_some(), "page merged");
                        LoadOutcome::Merged { added }
                    }
                    Err(err) => {
                        tracing::warn!(%url, %err, "page load failed");
                        self.failure = Some(FailedLoad {
                            url,
                            append,
                            reason: err.to_string(),
                        });
                        LoadOutcome::Failed
                    }
                }
            }
        }
    }

    // First occurrence of an id wins, left to right over the merged sequence.
    fn merge(&mut self, incoming: Vec<SelectOption>, append: bool) {
        let mut merged = if append {
            std::mem::take(&mut self.items)
        } else {
            Vec::with_capacity(incoming.len())
        };
        merged.extend(incoming);
        let mut seen = HashSet::with_capacity(merged.len());
        merged.retain(|option| seen.insert(option.id.clone()));
        self.items = merged;
    }

    pub fn items(&self) -> &[SelectOption] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &OptionId) -> Option<&SelectOption> {
        self.items.iter().find(|option| &option.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Cursor for the next page, if there is one.
    pub fn next_page(&self) -> Option<&str> {
        self.next.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }

    pub fn last_error(&self) -> Option<&FailedLoad> {
        self.failure.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
