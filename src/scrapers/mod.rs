//! Search providers the window fetcher can page through.
//!
//! A provider is opened once per (query, window) pair and hands back a
//! session; the session owns whatever per-search state the provider needs
//! and is dropped when the window is done. Nothing is shared between
//! sessions beyond the provider's HTTP client.
//!
//! | Provider | Module | Method |
//! |----------|--------|--------|
//! | Google News | [`google_news`] | HTML scraping of `tbm=nws` result pages |

pub mod google_news;

#[cfg(test)]
pub(crate) mod fake;

use crate::error::Result;
use crate::models::{DateWindow, RawResult};

/// Capability to start a date-bounded search.
pub trait SearchProvider {
    type Session: SearchSession;

    /// Start a search for `query` restricted to `window`.
    fn open(&self, query: &str, window: &DateWindow) -> Self::Session;
}

/// A single (query, window) search, paged from 1.
pub trait SearchSession {
    /// Fetch result page `page` (1-based). An empty vector means the
    /// provider has nothing more for this search.
    async fn page(&mut self, page: u32) -> Result<Vec<RawResult>>;
}
