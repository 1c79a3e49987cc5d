//! Splits a requested date range into bounded windows.
//!
//! Search providers silently truncate result depth when a query spans a wide
//! date range, so every provider query is limited to one window of at most
//! `chunk_days` days.

use crate::error::{Result, ScrapeError};
use crate::models::DateWindow;
use chrono::{Days, NaiveDate};

/// Default window size in days.
pub const DEFAULT_CHUNK_DAYS: u32 = 180;

/// Textual date format used on the command line and by the provider.
pub const INPUT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Parse a `MM/DD/YYYY` date as typed by the user.
pub fn parse_input_date(text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, INPUT_DATE_FORMAT)
        .map_err(|_| ScrapeError::InvalidDate(trimmed.to_string()))
}

/// Plan the ordered, contiguous windows covering `start..=end`.
///
/// Each window spans at most `chunk_days` days (`end - start`), the next
/// window starts the day after the previous one ends, and the final window
/// ends exactly on `end`. Equal dates yield a single zero-length window.
///
/// # Arguments
///
/// * `start` - First day to cover
/// * `end` - Last day to cover, inclusive
/// * `chunk_days` - Maximum `end - start` of a single window; `0` gives one-day windows
///
/// # Returns
///
/// The windows in chronological order, each labelled `YYYY-MM_YYYY-MM`.
///
/// # Errors
///
/// [`ScrapeError::InvalidRange`] when `start > end`.
///
/// # Examples
///
/// ```ignore
/// let d = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
/// let windows = plan(d(1, 1), d(12, 31), 180)?;
/// assert_eq!(windows.len(), 3);
/// assert_eq!(windows[0].end, d(6, 29));
/// assert_eq!(windows[2].label, "2024-12_2024-12");
/// ```
pub fn plan(start: NaiveDate, end: NaiveDate, chunk_days: u32) -> Result<Vec<DateWindow>> {
    if start > end {
        return Err(ScrapeError::InvalidRange { start, end });
    }

    let mut windows = Vec::new();
    let mut cursor = start;
    loop {
        let window_end = cursor
            .checked_add_days(Days::new(u64::from(chunk_days)))
            .map_or(end, |d| d.min(end));
        windows.push(DateWindow::new(cursor, window_end));

        match window_end.succ_opt() {
            Some(next) if next <= end => cursor = next,
            _ => break,
        }
    }

    tracing::debug!(%start, %end, chunk_days, windows = windows.len(), "Planned date windows");
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(text: &str) -> NaiveDate {
        parse_input_date(text).unwrap()
    }

    fn assert_contiguous(windows: &[DateWindow], start: NaiveDate, end: NaiveDate) {
        assert_eq!(windows.first().unwrap().start, start);
        assert_eq!(windows.last().unwrap().end, end);
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end.succ_opt().unwrap(), pair[1].start);
        }
        for w in windows {
            assert!(w.start <= w.end);
        }
    }

    #[test]
    fn test_parse_input_date() {
        assert_eq!(
            parse_input_date(" 10/07/2023 ").unwrap(),
            NaiveDate::from_ymd_opt(2023, 10, 7).unwrap()
        );
        assert!(matches!(
            parse_input_date("2023-10-07"),
            Err(ScrapeError::InvalidDate(s)) if s == "2023-10-07"
        ));
        assert!(parse_input_date("13/01/2024").is_err());
    }

    #[test]
    fn test_single_day_range() {
        let day = d("01/01/2024");
        let windows = plan(day, day, DEFAULT_CHUNK_DAYS).unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].start, day);
        assert_eq!(windows[0].end, day);
        assert_eq!(windows[0].label, "2024-01_2024-01");
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let err = plan(d("02/01/2024"), d("01/01/2024"), DEFAULT_CHUNK_DAYS).unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidRange { .. }));
    }

    #[test]
    fn test_full_leap_year() {
        let (start, end) = (d("01/01/2024"), d("12/31/2024"));
        let windows = plan(start, end, 180).unwrap();
        assert_contiguous(&windows, start, end);

        assert_eq!(windows[0].end, d("06/29/2024"));
        assert_eq!(windows[1].start, d("06/30/2024"));
        assert_eq!(windows[1].end, d("12/27/2024"));
        assert_eq!(windows[2].start, d("12/28/2024"));
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].label, "2024-01_2024-06");
    }

    #[test]
    fn test_windows_never_exceed_chunk_size() {
        let (start, end) = (d("10/07/2023"), d("01/01/2026"));
        for chunk_days in [1, 7, 30, 90, 180, 365, 2000] {
            let windows = plan(start, end, chunk_days).unwrap();
            assert_contiguous(&windows, start, end);
            for w in &windows {
                assert!(w.span_days() <= i64::from(chunk_days));
            }
            // Every window but the last is full length.
            for w in &windows[..windows.len() - 1] {
                assert_eq!(w.span_days(), i64::from(chunk_days));
            }
        }
    }

    #[test]
    fn test_zero_chunk_days_yields_single_day_windows() {
        let windows = plan(d("03/01/2024"), d("03/03/2024"), 0).unwrap();
        assert_eq!(windows.len(), 3);
        assert!(windows.iter().all(|w| w.start == w.end));
    }

    #[test]
    fn test_plan_ends_at_calendar_limit() {
        let end = NaiveDate::MAX;
        let start = end - Days::new(10);
        let windows = plan(start, end, 180).unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].end, end);
    }
}
