//! Reading statistics: yearly totals, year-over-year deltas and per-month series.
//!
//! Stored records keep dates and page counts as text. They are coerced into
//! [`ReadingEntry`] first; records that do not coerce are reported as
//! [`SkippedRecord`]s and take no part in any number.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use super::models::BookRecord;
use crate::utils::parse_loose_date;

/// A record with the fields the statistics need, already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingEntry {
    pub key: String,
    pub title: String,
    pub start: Option<NaiveDate>,
    pub end: NaiveDate,
    pub pages: u32,
}

/// A record left out of the statistics, with the field that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("'{title}' has an unreadable {field}: '{value}'")]
pub struct SkippedRecord {
    pub key: String,
    pub title: String,
    pub field: &'static str,
    pub value: String,
}

impl TryFrom<&BookRecord> for ReadingEntry {
    type Error = SkippedRecord;

    fn try_from(record: &BookRecord) -> Result<Self, Self::Error> {
        let skipped = |field: &'static str, value: &str| SkippedRecord {
            key: record.key.clone(),
            title: record.title.clone(),
            field,
            value: value.to_string(),
        };

        let end = parse_loose_date(&record.end_date).ok_or_else(|| skipped("end date", &record.end_date))?;
        let pages = record
            .pages
            .trim()
            .parse::<u32>()
            .map_err(|_| skipped("page count", &record.pages))?;

        Ok(Self {
            key: record.key.clone(),
            title: record.title.clone(),
            start: parse_loose_date(&record.start_date),
            end,
            pages,
        })
    }
}

/// Split records into parsed entries and the ones that had to be skipped.
pub fn coerce(records: &[BookRecord]) -> (Vec<ReadingEntry>, Vec<SkippedRecord>) {
    let mut entries = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();

    for record in records {
        match ReadingEntry::try_from(record) {
            Ok(entry) => entries.push(entry),
            Err(skip) => {
                tracing::warn!(key = %skip.key, field = skip.field, value = %skip.value, "record skipped in statistics");
                skipped.push(skip);
            }
        }
    }

    (entries, skipped)
}

/// The metrics row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub books_this_year: u64,
    pub pages_this_year: u64,
    pub books_same_period_last_year: u64,
    pub pages_same_period_last_year: u64,
    pub books_delta: i64,
    pub pages_delta: i64,
    /// `None` when there are no entries.
    pub average_books_per_month: Option<f64>,
    /// `None` when there are no entries.
    pub average_pages_per_book: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    /// `YYYY-MM`
    pub month: String,
    pub books: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineBar {
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingStats {
    pub today: NaiveDate,
    pub summary: Summary,
    /// Months with at least one finished book, oldest first.
    pub monthly: Vec<MonthBucket>,
    /// Entries with a start date, ordered by start date.
    pub timeline: Vec<TimelineBar>,
}

/// January 1st of last year through the same day last year, both inclusive.
///
/// Feb 29 maps to Feb 28 of the previous year.
pub fn same_period_last_year(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let end = today
        .checked_sub_months(Months::new(12))
        .unwrap_or(NaiveDate::MIN);
    let start = NaiveDate::from_ymd_opt(end.year(), 1, 1).unwrap_or(end);
    (start, end)
}

pub fn aggregate(entries: &[ReadingEntry], today: NaiveDate) -> ReadingStats {
    let (window_start, window_end) = same_period_last_year(today);

    let mut books_this_year = 0u64;
    let mut pages_this_year = 0u64;
    let mut books_last_year = 0u64;
    let mut pages_last_year = 0u64;
    let mut total_pages = 0u64;
    let mut months: BTreeMap<(i32, u32), (u64, u64)> = BTreeMap::new();

    for entry in entries {
        let pages = u64::from(entry.pages);
        total_pages += pages;

        if entry.end.year() == today.year() {
            books_this_year += 1;
            pages_this_year += pages;
        }
        if entry.end >= window_start && entry.end <= window_end {
            books_last_year += 1;
            pages_last_year += pages;
        }

        let bucket = months.entry((entry.end.year(), entry.end.month())).or_default();
        bucket.0 += 1;
        bucket.1 += pages;
    }

    let average_books_per_month = match (months.keys().next(), months.keys().next_back()) {
        (Some(&first), Some(&last)) => {
            let span = month_span(first, last);
            Some(entries.len() as f64 / span as f64)
        }
        _ => None,
    };
    let average_pages_per_book =
        (!entries.is_empty()).then(|| total_pages as f64 / entries.len() as f64);

    let monthly = months
        .into_iter()
        .map(|((year, month), (books, pages))| MonthBucket {
            month: format!("{year:04}-{month:02}"),
            books,
            pages,
        })
        .collect();

    let mut timeline: Vec<TimelineBar> = entries
        .iter()
        .filter_map(|entry| {
            entry.start.map(|start| TimelineBar {
                title: entry.title.clone(),
                start,
                end: entry.end,
            })
        })
        .collect();
    timeline.sort_by_key(|bar| bar.start);

    ReadingStats {
        today,
        summary: Summary {
            books_this_year,
            pages_this_year,
            books_same_period_last_year: books_last_year,
            pages_same_period_last_year: pages_last_year,
            books_delta: books_this_year as i64 - books_last_year as i64,
            pages_delta: pages_this_year as i64 - pages_last_year as i64,
            average_books_per_month,
            average_pages_per_book,
        },
        monthly,
        timeline,
    }
}

/// Number of calendar months from `first` to `last`, both included.
fn month_span(first: (i32, u32), last: (i32, u32)) -> i64 {
    let (fy, fm) = first;
    let (ly, lm) = last;
    i64::from(ly - fy) * 12 + i64::from(lm) - i64::from(fm) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(title: &str, end: NaiveDate, pages: u32) -> ReadingEntry {
        ReadingEntry {
            key: title.to_lowercase(),
            title: title.to_string(),
            start: None,
            end,
            pages,
        }
    }

    fn record(key: &str, end_date: &str, pages: &str) -> BookRecord {
        BookRecord {
            key: key.to_string(),
            title: format!("Boek {key}"),
            author: "A".to_string(),
            rating: None,
            language: String::new(),
            start_date: "2024-01-01".to_string(),
            end_date: end_date.to_string(),
            genre: String::new(),
            release_date: String::new(),
            pages: pages.to_string(),
            cover_url: None,
        }
    }

    #[test]
    fn totals_for_current_year() {
        let today = date(2026, 10, 16);
        let entries = vec![
            entry("A", date(2026, 1, 3), 200),
            entry("B", date(2026, 6, 30), 315),
            entry("C", date(2026, 10, 16), 1),
        ];

        let stats = aggregate(&entries, today);
        assert_eq!(stats.summary.books_this_year, 3);
        assert_eq!(stats.summary.pages_this_year, 516);
    }

    #[test]
    fn year_over_year_boundary_is_inclusive() {
        let today = date(2026, 10, 16);
        let entries = vec![
            entry("Today", today, 300),
            entry("Year ago", date(2025, 10, 16), 120),
            entry("Year ago plus a day", date(2025, 10, 17), 999),
        ];

        let stats = aggregate(&entries, today);
        assert_eq!(stats.summary.books_same_period_last_year, 1);
        assert_eq!(stats.summary.pages_same_period_last_year, 120);
        assert_eq!(stats.summary.books_delta, 0);
        assert_eq!(stats.summary.pages_delta, 180);
    }

    #[test]
    fn same_period_starts_on_january_first() {
        assert_eq!(
            same_period_last_year(date(2026, 10, 16)),
            (date(2025, 1, 1), date(2025, 10, 16))
        );
        assert_eq!(
            same_period_last_year(date(2024, 2, 29)),
            (date(2023, 1, 1), date(2023, 2, 28))
        );
    }

    #[test]
    fn negative_delta_when_behind_last_year() {
        let today = date(2026, 3, 1);
        let entries = vec![
            entry("Last year 1", date(2025, 1, 10), 100),
            entry("Last year 2", date(2025, 2, 10), 100),
        ];
        let stats = aggregate(&entries, today);
        assert_eq!(stats.summary.books_delta, -2);
        assert_eq!(stats.summary.pages_delta, -200);
    }

    #[test]
    fn monthly_buckets_skip_empty_months() {
        let entries = vec![
            entry("A", date(2025, 1, 3), 100),
            entry("B", date(2025, 1, 28), 50),
            entry("C", date(2025, 4, 2), 300),
        ];

        let stats = aggregate(&entries, date(2025, 5, 1));
        assert_eq!(
            stats.monthly,
            vec![
                MonthBucket { month: "2025-01".into(), books: 2, pages: 150 },
                MonthBucket { month: "2025-04".into(), books: 1, pages: 300 },
            ]
        );
    }

    #[test]
    fn averages_span_first_to_last_month() {
        let entries = vec![
            entry("A", date(2025, 1, 3), 100),
            entry("B", date(2025, 1, 28), 50),
            entry("C", date(2025, 4, 2), 300),
        ];

        let stats = aggregate(&entries, date(2025, 5, 1));
        // January through April is four months.
        assert_eq!(stats.summary.average_books_per_month, Some(0.75));
        assert_eq!(stats.summary.average_pages_per_book, Some(150.0));
    }

    #[test]
    fn empty_input_has_no_averages() {
        let stats = aggregate(&[], date(2025, 5, 1));
        assert_eq!(stats.summary.books_this_year, 0);
        assert_eq!(stats.summary.average_books_per_month, None);
        assert_eq!(stats.summary.average_pages_per_book, None);
        assert!(stats.monthly.is_empty());
        assert!(stats.timeline.is_empty());
    }

    #[test]
    fn timeline_is_sorted_by_start_and_skips_missing_starts() {
        let mut late = entry("Late", date(2025, 3, 1), 10);
        late.start = Some(date(2025, 2, 1));
        let mut early = entry("Early", date(2025, 3, 5), 10);
        early.start = Some(date(2025, 1, 1));
        let undated = entry("Undated", date(2025, 3, 9), 10);

        let stats = aggregate(&[late, undated, early], date(2025, 5, 1));
        let titles: Vec<&str> = stats.timeline.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Early", "Late"]);
    }

    #[test]
    fn month_span_crosses_years() {
        assert_eq!(month_span((2024, 11), (2025, 2)), 4);
        assert_eq!(month_span((2025, 6), (2025, 6)), 1);
    }

    #[test]
    fn coerce_skips_unparseable_records() {
        let records = vec![
            record("ok", "2025-02-01", " 320 "),
            record("bad-pages", "2025-02-01", "ongeveer 300"),
            record("bad-date", "gisteren", "100"),
            record("placeholder-date", "18-11-2000", "100"),
        ];

        let (entries, skipped) = coerce(&records);
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["ok", "placeholder-date"]);
        assert_eq!(entries[0].pages, 320);

        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].key, "bad-pages");
        assert_eq!(skipped[0].field, "page count");
        assert_eq!(skipped[1].field, "end date");
        assert_eq!(skipped[1].value, "gisteren");
    }
}
