//! Window fetcher: pages through one (query, window) search.
//!
//! Pages are requested in order, `1..=max_pages`, with a pacing pause
//! between consecutive requests. An empty page ends the window. A failing
//! page also ends the window, but quietly: the error is logged and recorded
//! in the [`FetchReport`] and whatever was gathered so far is kept.

use crate::models::{DateWindow, RawResult};
use crate::pacing::Pacing;
use crate::scrapers::{SearchProvider, SearchSession};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Default page limit per window.
pub const DEFAULT_MAX_PAGES: u32 = 5;

/// Why paging stopped for a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The provider returned an empty page.
    Exhausted,
    /// `max_pages` pages were fetched.
    PageLimit,
    /// A page request failed; treated as the end of results.
    PageError(String),
}

/// Results of paging through one window.
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// Flattened results in provider order. May contain duplicate links.
    pub results: Vec<RawResult>,
    pub pages_requested: u32,
    pub stopped_by: StopReason,
}

/// Fetch up to `max_pages` pages of results for `query` within `window`.
///
/// A fresh provider session is opened for the window and dropped on return.
///
/// # Arguments
///
/// * `provider` - Search provider to open the session on
/// * `query` - Query text, passed through unchanged
/// * `window` - Date bounds of the search
/// * `max_pages` - Page limit; pages are numbered from 1
/// * `pacing` - Pause range applied before every page after the first
///
/// # Returns
///
/// A [`FetchReport`] with every result in provider order and the reason
/// paging stopped. This never fails: a page error ends paging and is
/// recorded as [`StopReason::PageError`].
#[instrument(level = "info", skip(provider, window, pacing), fields(window = %window.label, span_days = window.span_days()))]
pub async fn fetch_window<P: SearchProvider>(
    provider: &P,
    query: &str,
    window: &DateWindow,
    max_pages: u32,
    pacing: &Pacing,
) -> FetchReport {
    let t0 = Instant::now();
    let mut session = provider.open(query, window);
    let mut results = Vec::new();
    let mut pages_requested = 0;
    let mut stopped_by = StopReason::PageLimit;

    for page in 1..=max_pages {
        if page > 1 {
            pacing.pause().await;
        }
        pages_requested = page;

        match session.page(page).await {
            Ok(batch) if batch.is_empty() => {
                debug!(page, "Provider returned an empty page");
                stopped_by = StopReason::Exhausted;
                break;
            }
            Ok(batch) => {
                debug!(page, count = batch.len(), "Fetched page");
                results.extend(batch);
            }
            Err(e) => {
                warn!(page, error = %e, "Page fetch failed; treating as end of results");
                stopped_by = StopReason::PageError(e.to_string());
                break;
            }
        }
    }

    info!(
        count = results.len(),
        pages_requested,
        stopped_by = ?stopped_by,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Fetched window"
    );

    FetchReport {
        results,
        pages_requested,
        stopped_by,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::fake::{FakeProvider, ScriptedPage, raw};
    use chrono::NaiveDate;
    use std::time::Duration as StdDuration;

    fn window() -> DateWindow {
        DateWindow::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 29).unwrap(),
        )
    }

    fn fast_pacing() -> Pacing {
        Pacing::new(StdDuration::from_millis(1), StdDuration::from_millis(2)).unwrap()
    }

    fn page(links: &[&str]) -> ScriptedPage {
        ScriptedPage::Results(links.iter().map(|l| raw(l, "t", "Jan 5, 2024")).collect())
    }

    #[tokio::test]
    async fn test_stops_on_empty_page() {
        let w = window();
        let provider = FakeProvider::new().script(
            "q",
            &w.label,
            vec![page(&["a", "b"]), page(&["b", "c"]), ScriptedPage::Results(vec![])],
        );

        let report = fetch_window(&provider, "q", &w, 5, &fast_pacing()).await;

        let links: Vec<_> = report.results.iter().map(|r| r.link.as_str()).collect();
        assert_eq!(links, ["a", "b", "b", "c"]);
        assert_eq!(report.pages_requested, 3);
        assert_eq!(report.stopped_by, StopReason::Exhausted);
        assert_eq!(provider.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_respects_page_limit() {
        let w = window();
        let pages = (0..10)
            .map(|i| {
                let link = format!("u{i}");
                page(&[link.as_str()])
            })
            .collect();
        let provider = FakeProvider::new().script("q", &w.label, pages);

        let report = fetch_window(&provider, "q", &w, 3, &fast_pacing()).await;

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.stopped_by, StopReason::PageLimit);
        let requested: Vec<u32> = provider.calls().iter().map(|c| c.2).collect();
        assert_eq!(requested, [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_page_error_keeps_earlier_results() {
        let w = window();
        let provider = FakeProvider::new().script(
            "q",
            &w.label,
            vec![
                page(&["a"]),
                ScriptedPage::Fail("HTTP 429 Too Many Requests".to_string()),
                page(&["never"]),
            ],
        );

        let report = fetch_window(&provider, "q", &w, 5, &fast_pacing()).await;

        assert_eq!(report.results.len(), 1);
        assert!(matches!(report.stopped_by, StopReason::PageError(ref m) if m.contains("429")));
        assert_eq!(provider.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_failing_first_page_yields_nothing() {
        let w = window();
        let provider = FakeProvider::new().script(
            "q",
            &w.label,
            vec![ScriptedPage::Fail("connection reset".to_string())],
        );

        let report = fetch_window(&provider, "q", &w, 5, &fast_pacing()).await;

        assert!(report.results.is_empty());
        assert_eq!(report.pages_requested, 1);
    }

    #[tokio::test]
    async fn test_pauses_between_pages() {
        let w = window();
        let provider = FakeProvider::new().script("q", &w.label, vec![page(&["a"]), page(&["b"]), page(&["c"])]);
        let pacing = Pacing::new(StdDuration::from_millis(20), StdDuration::from_millis(20)).unwrap();

        let t0 = Instant::now();
        let report = fetch_window(&provider, "q", &w, 3, &pacing).await;

        assert_eq!(report.results.len(), 3);
        assert!(t0.elapsed() >= StdDuration::from_millis(40));
    }
}
