//! Shared value-cleaning rules for extracted and imported fields.
//!
//! Lab reports and spreadsheet exports disagree on number and date formats,
//! so every path that turns captured text into a typed value goes through
//! these helpers. A value that cannot be coerced degrades to `None` — a
//! parse-but-invalid field is an empty field, never an error.

use chrono::NaiveDate;

/// Date formats accepted across reports and spreadsheet exports, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Parse a numeric field, stripping thousands separators ("1,200" → 1200.0).
///
/// Returns `None` for empty input, non-numeric text, and non-finite values.
pub fn clean_number(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a date field in any of the accepted formats.
///
/// A trailing time component ("2023-01-01 12:00:00") is ignored.
pub fn clean_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let date_part = trimmed.split_whitespace().next().unwrap_or(trimmed);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Normalize a free-text field: trimmed, `None` when empty.
pub fn clean_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
