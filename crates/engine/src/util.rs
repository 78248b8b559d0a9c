//! Internal helpers for parsing and validation.
//!
//! These utilities are **not** part of the public API.

use chrono::NaiveDate;

use crate::{EngineError, ResultEngine};

/// Display value for a product, broker, operator or site that no longer exists.
pub(crate) const UNKNOWN: &str = "Unknown";

/// Display value for a prepayment without an intended product.
pub(crate) const NOT_SPECIFIED: &str = "Not Specified";

/// Parse a signed decimal string into an integer scaled by `10^decimals`.
///
/// Accepts `.` or `,` as separator and an optional leading sign; rejects
/// more fractional digits than `decimals`.
pub(crate) fn parse_fixed_point(input: &str, decimals: u32) -> Result<i64, &'static str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("empty value");
    }

    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(stripped) => (true, stripped),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let rest = rest.trim().replace(',', ".");
    let mut parts = rest.split('.');
    let whole = parts.next().unwrap_or_default();
    let frac = parts.next().unwrap_or_default();
    if parts.next().is_some() {
        return Err("invalid value");
    }
    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return Err("invalid value");
    }
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err("invalid value");
    }
    if frac.len() > decimals as usize {
        return Err("too many decimals");
    }

    let scale = 10i64.pow(decimals);
    let whole: i64 = whole.parse().map_err(|_| "invalid value")?;
    let frac: i64 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{frac:0<width$}", width = decimals as usize);
        padded.parse().map_err(|_| "invalid value")?
    };

    let total = whole
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac))
        .ok_or("value too large")?;
    Ok(if negative { -total } else { total })
}

/// Case-insensitive substring test used by the fee rules.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// The calendar day before `date`, if representable.
pub(crate) fn previous_day(date: NaiveDate) -> Option<NaiveDate> {
    date.pred_opt()
}

pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
