//! Google News result-page scraper.
//!
//! Each session issues `tbm=nws` searches restricted to its window with
//! Google's custom date range (`cdr:1,cd_min,cd_max`) and walks the result
//! pages ten at a time.
//!
//! # Date Handling
//!
//! Google shows recent articles with relative dates ("3 hours ago"). Like the
//! upstream scraping libraries, the provider resolves these against the
//! moment the page was fetched and reports the result in `datetime`; it is up
//! to the normalizer to decide whether that value can be trusted.

use crate::error::{Result, ScrapeError};
use crate::models::{DateWindow, RawResult};
use crate::planner::INPUT_DATE_FORMAT;
use crate::scrapers::{SearchProvider, SearchSession};
use crate::utils::{parse_calendar_datetime, truncate_for_log};
use chrono::{Duration, Local, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration as StdDuration;
use tracing::{debug, info, instrument};
use url::Url;

const SEARCH_URL: &str = "https://www.google.com/search";
const RESULTS_PER_PAGE: u32 = 10;
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

static CARD: Lazy<Selector> = Lazy::new(|| Selector::parse("div.SoaBEf").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("div[role=\"heading\"]").unwrap());
static OUTLET: Lazy<Selector> = Lazy::new(|| Selector::parse(".MgUUmf").unwrap());
static SNIPPET: Lazy<Selector> = Lazy::new(|| Selector::parse(".GI74Re").unwrap());
static DATE: Lazy<Selector> = Lazy::new(|| Selector::parse(".OSrXXb").unwrap());

static RELATIVE_AGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(min|mins|minute|minutes|hour|hours|day|days|week|weeks|month|months|year|years)\s+ago")
        .unwrap()
});

/// Google News search provider.
#[derive(Debug, Clone)]
pub struct GoogleNewsProvider {
    client: Client,
    lang: String,
}

impl GoogleNewsProvider {
    /// Build a provider that searches in `lang` (e.g. `"en"`).
    pub fn new(lang: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(StdDuration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            lang: lang.to_string(),
        })
    }
}

impl SearchProvider for GoogleNewsProvider {
    type Session = GoogleNewsSession;

    fn open(&self, query: &str, window: &DateWindow) -> GoogleNewsSession {
        GoogleNewsSession {
            client: self.client.clone(),
            lang: self.lang.clone(),
            query: query.to_string(),
            window: window.clone(),
        }
    }
}

/// One Google News search bounded to a single window.
#[derive(Debug)]
pub struct GoogleNewsSession {
    client: Client,
    lang: String,
    query: String,
    window: DateWindow,
}

impl GoogleNewsSession {
    /// Result-page URL for `page` (1-based).
    pub fn page_url(&self, page: u32) -> Result<Url> {
        let tbs = format!(
            "lr:lang_1{lang},cdr:1,cd_min:{start},cd_max:{end},sbd:1",
            lang = self.lang,
            start = self.window.start.format(INPUT_DATE_FORMAT),
            end = self.window.end.format(INPUT_DATE_FORMAT),
        );
        let offset = page
            .saturating_sub(1)
            .checked_mul(RESULTS_PER_PAGE)
            .ok_or_else(|| ScrapeError::ProviderPage {
                page,
                message: "result offset out of range".to_string(),
            })?;
        let url = format!(
            "{SEARCH_URL}?q={q}&lr=lang_{lang}&tbs={tbs}&tbm=nws&start={offset}",
            q = urlencoding::encode(&self.query),
            lang = self.lang,
            tbs = urlencoding::encode(&tbs),
        );
        Url::parse(&url).map_err(|e| ScrapeError::Config(e.to_string()))
    }
}

impl SearchSession for GoogleNewsSession {
    #[instrument(level = "info", skip(self), fields(query = %self.query, window = %self.window.label))]
    async fn page(&mut self, page: u32) -> Result<Vec<RawResult>> {
        let url = self.page_url(page)?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::ProviderPage {
                page,
                message: format!("HTTP {status}"),
            });
        }

        let body = response.text().await?;
        let results = parse_results_page(&body, Local::now().naive_local());
        info!(count = results.len(), bytes = body.len(), "Parsed Google News page");
        if results.is_empty() {
            debug!(body = %truncate_for_log(&body, 300), "Page had no result cards");
        }
        Ok(results)
    }
}

/// Extract result cards from a Google News search page.
///
/// `scraped_at` anchors relative dates.
pub fn parse_results_page(html: &str, scraped_at: NaiveDateTime) -> Vec<RawResult> {
    let document = Html::parse_document(html);
    document
        .select(&CARD)
        .filter_map(|card| parse_card(card, scraped_at))
        .collect()
}

fn parse_card(card: ElementRef<'_>, scraped_at: NaiveDateTime) -> Option<RawResult> {
    let href = card.select(&LINK).next()?.value().attr("href")?;
    let date = first_text(card, &DATE);
    Some(RawResult {
        title: first_text(card, &HEADING),
        media: first_text(card, &OUTLET),
        datetime: resolve_datetime(&date, scraped_at),
        date,
        desc: first_text(card, &SNIPPET),
        link: unwrap_redirect(href),
    })
}

fn first_text(card: ElementRef<'_>, selector: &Selector) -> String {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

/// Turn Google's `/url?q=...` redirect links into the target URL.
pub fn unwrap_redirect(href: &str) -> String {
    if !href.starts_with("/url?") {
        return href.to_string();
    }
    let Ok(base) = Url::parse(SEARCH_URL) else {
        return href.to_string();
    };
    base.join(href)
        .ok()
        .and_then(|u| {
            u.query_pairs()
                .find(|(k, v)| (k == "q" || k == "url") && !v.is_empty())
                .map(|(_, v)| v.into_owned())
        })
        .unwrap_or_else(|| href.to_string())
}

/// Resolve a displayed date the way the provider understands it.
///
/// Relative ages are subtracted from `scraped_at`; absolute dates are parsed
/// as calendar dates at midnight.
pub fn resolve_datetime(date: &str, scraped_at: NaiveDateTime) -> Option<NaiveDateTime> {
    let lowered = date.trim().to_lowercase();
    if lowered == "today" {
        return Some(scraped_at);
    }
    if lowered == "yesterday" {
        return Some(scraped_at - Duration::days(1));
    }
    if let Some(caps) = RELATIVE_AGE.captures(&lowered) {
        let amount: i64 = caps[1].parse().ok().filter(|n| *n < 100_000)?;
        let age = match &caps[2] {
            "min" | "mins" | "minute" | "minutes" => Duration::minutes(amount),
            "hour" | "hours" => Duration::hours(amount),
            "day" | "days" => Duration::days(amount),
            "week" | "weeks" => Duration::weeks(amount),
            "month" | "months" => Duration::days(30 * amount),
            _ => Duration::days(365 * amount),
        };
        return scraped_at.checked_sub_signed(age);
    }
    parse_calendar_datetime(date)
}
