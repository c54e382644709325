//! German-locale parsing and formatting.
//!
//! Amounts use `.` as thousands separator and `,` as decimal separator;
//! dates are day-first.

use chrono::NaiveDate;

/// Accepted day-first date formats, tried in order.
const DATE_FORMATS: &[&str] = &["%d.%m.%Y", "%d.%m.%y", "%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

/// Affirmative markers for yes/no flag cells.
const AFFIRMATIVE: &[&str] = &["ja", "yes", "y"];

/// Parse a German-formatted amount (`"1.234,56"` becomes 1234.56).
///
/// Thousands dots are stripped, the decimal comma becomes a dot. Returns
/// `None` for empty or unparsable input; the caller decides the default
/// (the pipeline coerces to 0.0 and counts the coercion).
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace('.', "").replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Parse a calendar date with day-before-month ordering.
///
/// `"05.03.2024"` is March 5, not May 3. Empty or unparsable input yields
/// `None`; a missing date never satisfies a cutoff comparison downstream.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// True iff the trimmed, lowercased cell is one of the accepted affirmative
/// markers. Anything else, including an absent cell, is false.
pub fn is_affirmative(raw: &str) -> bool {
    AFFIRMATIVE.contains(&raw.trim().to_lowercase().as_str())
}

/// Format an amount German-style with two decimals (`1234.5` becomes
/// `"1.234,50"`).
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let int_grouped: String = grouped.chars().rev().collect();

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{int_grouped},{dec_part}")
}

/// Format a date as `dd.mm.yyyy`; a missing date renders as empty string.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_default()
}
