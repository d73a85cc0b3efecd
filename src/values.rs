use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Error;
use crate::types::Result;

/// Cell values the source export uses for a missing value (case-insensitive)
pub const NULL_TOKENS: &[&str] = &["NULL", "NA", "N/A"];

// Date formats we accept, each with the exact textual shape it must have.
// chrono alone is lenient about digit counts (`%Y` happily reads "23").
static DATE_SHAPES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        // US format: 3/14/2023 or 03/14/2023
        ("%m/%d/%Y", Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").unwrap()),
        // ISO format: 2023-03-14
        ("%Y-%m-%d", Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap()),
        // European format: 14-03-2023
        ("%d-%m-%Y", Regex::new(r"^\d{1,2}-\d{1,2}-\d{4}$").unwrap()),
        // ISO with dots: 2023.03.14
        ("%Y.%m.%d", Regex::new(r"^\d{4}\.\d{2}\.\d{2}$").unwrap()),
    ]
});

/// Check if a value is one of the null tokens
pub fn is_null_token(value: &str) -> bool {
    let trimmed = value.trim();
    NULL_TOKENS.iter().any(|t| trimmed.eq_ignore_ascii_case(t))
}

/// Parse a text cell. Empty cells are null unless `keep_empty` is set.
pub fn parse_text(value: &str, keep_empty: bool) -> Option<String> {
    if is_null_token(value) {
        return None;
    }
    if value.is_empty() && !keep_empty {
        return None;
    }
    Some(value.to_string())
}

/// Parse an integer cell. Exports sometimes render integers as `337.0`,
/// which is accepted as long as the fraction is zero.
pub fn parse_integer(value: &str) -> std::result::Result<Option<i64>, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || is_null_token(trimmed) {
        return Ok(None);
    }

    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(Some(n));
    }

    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Ok(Some(f as i64))
        }
        _ => Err(format!("not an integer: {:?}", value)),
    }
}

/// Formats `DateParser` can be configured with
pub fn supported_date_formats() -> Vec<&'static str> {
    DATE_SHAPES.iter().map(|(format, _)| *format).collect()
}

/// Strict parser for one date format
#[derive(Debug, Clone)]
pub struct DateParser {
    format: &'static str,
    shape: &'static Regex,
}

impl DateParser {
    pub fn new(format: &str) -> Result<Self> {
        DATE_SHAPES
            .iter()
            .find(|(f, _)| *f == format)
            .map(|(f, shape)| Self { format: *f, shape })
            .ok_or_else(|| {
                Error::Config(format!(
                    "unsupported date format {:?}; expected one of {}",
                    format,
                    supported_date_formats().join(", ")
                ))
            })
    }

    pub fn format(&self) -> &str {
        self.format
    }

    /// Parse a date, returning `None` when the text does not have the
    /// configured shape or names an impossible calendar day
    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let trimmed = raw.trim();
        if !self.shape.is_match(trimmed) {
            return None;
        }
        NaiveDate::parse_from_str(trimmed, self.format).ok()
    }
}
