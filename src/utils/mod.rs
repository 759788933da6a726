//! Project-specific utilities live here.

use chrono::NaiveDate;

/// Parse the date formats found in stored records: `2023-05-01`, `01-05-2023`,
/// and timestamps that start with an ISO date.
pub fn parse_loose_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%d-%m-%Y") {
        return Some(date);
    }
    text.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}
