// src/extract/utils.rs

use once_cell::sync::Lazy;
use regex::Regex;

static THOUSANDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}(\.\d{3})+$").expect("thousands pattern should compile"));

/// Collapse every whitespace run into one space and trim the ends.
pub fn clean_text(raw: &str) -> String {
    raw.split(char::is_whitespace)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a bed count cell. `None` for empty, non-numeric or negative text.
/// Dot thousands separators (`1.234`) are accepted.
pub fn parse_count(raw: &str) -> Option<u32> {
    let cleaned = clean_text(raw);
    let digits = if THOUSANDS.is_match(&cleaned) {
        cleaned.replace('.', "")
    } else {
        cleaned
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
