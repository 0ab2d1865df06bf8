//! Scripted page source shared by the widget tests.

use crate::option::{Page, SelectOption};
use crate::source::{FetchError, PageSource};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Answers each URL with the responses queued for it, in order, and records
/// every call. Unscripted URLs fail with a transport error.
#[derive(Default)]
pub(crate) struct ScriptedSource {
    responses: Mutex<HashMap<String, VecDeque<Result<Page, FetchError>>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn page(&self, url: &str, options: Vec<SelectOption>, next: Option<&str>) {
        self.respond(url, Ok(Page::new(options, next.map(str::to_string))));
    }

    pub fn fail(&self, url: &str, err: FetchError) {
        self.respond(url, Err(err));
    }

    fn respond(&self, url: &str, response: Result<Page, FetchError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl PageSource for ScriptedSource {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Page, FetchError>> {
        self.calls.lock().unwrap().push(url.to_string());
        let response = self
            .responses
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(FetchError::Transport(format!("no response scripted for {url}"))));
        futures::future::ready(response).boxed()
    }
}

/// Options with ids `ids` named "Character <id>".
pub(crate) fn characters(ids: std::ops::Range<i64>) -> Vec<SelectOption> {
    ids.map(|i| SelectOption::new(i, format!("Character {i}")).with_episode_count(i as usize))
        .collect()
}

pub(crate) fn named(entries: &[(i64, &str)]) -> Vec<SelectOption> {
    entries
        .iter()
        .map(|&(id, name)| SelectOption::new(id, name))
        .collect()
}
