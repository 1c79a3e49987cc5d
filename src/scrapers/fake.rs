//! Scripted in-memory provider for tests.

use crate::error::{Result, ScrapeError};
use crate::models::{DateWindow, RawResult};
use crate::scrapers::{SearchProvider, SearchSession};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// What a scripted page returns.
#[derive(Debug, Clone)]
pub enum ScriptedPage {
    Results(Vec<RawResult>),
    Fail(String),
}

/// Provider whose pages are scripted per (query, window label).
#[derive(Debug, Default, Clone)]
pub struct FakeProvider {
    scripts: HashMap<(String, String), Vec<ScriptedPage>>,
    /// Every `(query, label, page)` requested, in order.
    pub calls: Arc<Mutex<Vec<(String, String, u32)>>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(mut self, query: &str, label: &str, pages: Vec<ScriptedPage>) -> Self {
        self.scripts
            .insert((query.to_string(), label.to_string()), pages);
        self
    }

    pub fn calls(&self) -> Vec<(String, String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

impl SearchProvider for FakeProvider {
    type Session = FakeSession;

    fn open(&self, query: &str, window: &DateWindow) -> FakeSession {
        FakeSession {
            query: query.to_string(),
            label: window.label.clone(),
            pages: self
                .scripts
                .get(&(query.to_string(), window.label.clone()))
                .cloned()
                .unwrap_or_default(),
            calls: Arc::clone(&self.calls),
        }
    }
}

#[derive(Debug)]
pub struct FakeSession {
    query: String,
    label: String,
    pages: Vec<ScriptedPage>,
    calls: Arc<Mutex<Vec<(String, String, u32)>>>,
}

impl SearchSession for FakeSession {
    async fn page(&mut self, page: u32) -> Result<Vec<RawResult>> {
        self.calls
            .lock()
            .unwrap()
            .push((self.query.clone(), self.label.clone(), page));
        match self.pages.get(page as usize - 1) {
            Some(ScriptedPage::Results(results)) => Ok(results.clone()),
            Some(ScriptedPage::Fail(message)) => Err(ScrapeError::ProviderPage {
                page,
                message: message.clone(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

/// A raw result with only the fields most tests care about.
pub fn raw(link: &str, title: &str, date: &str) -> RawResult {
    RawResult {
        title: title.to_string(),
        media: "Test Outlet".to_string(),
        date: date.to_string(),
        datetime: None,
        desc: String::new(),
        link: link.to_string(),
    }
}
