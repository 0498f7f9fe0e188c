//! Semantic input checks run after decoding and before any request.

use chrono::NaiveDate;

use crate::error::ToolError;

/// Date format accepted by every date field
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Semantic checks beyond what the input's shape already guarantees.
pub trait Validate {
    /// Returns the first problem found.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Validation`] naming the offending field.
    fn validate(&self) -> Result<(), ToolError> {
        Ok(())
    }
}

/// Rejects empty or whitespace-only strings.
pub fn non_empty(field: &str, value: &str) -> Result<(), ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::invalid(field, "must not be empty"));
    }
    Ok(())
}

/// Rejects zero ids.
pub fn positive(field: &str, value: u64) -> Result<(), ToolError> {
    if value == 0 {
        return Err(ToolError::invalid(field, "must be a positive integer"));
    }
    Ok(())
}

/// Minimal e-mail shape check: one `@`, a non-empty local part, a dotted domain.
pub fn email(field: &str, value: &str) -> Result<(), ToolError> {
    let ok = value.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    }) && !value.chars().any(char::is_whitespace);
    if ok {
        Ok(())
    } else {
        Err(ToolError::invalid(field, "must be a valid e-mail address"))
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn date(field: &str, value: &str) -> Result<NaiveDate, ToolError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| ToolError::invalid(field, format!("must be a YYYY-MM-DD date, got `{value}`")))
}

/// Checks optional start/end dates and that start is not after end.
pub fn date_range(start: Option<&str>, end: Option<&str>) -> Result<(), ToolError> {
    let start = start.map(|s| date("start_date", s)).transpose()?;
    let end = end.map(|e| date("end_date", e)).transpose()?;
    if let (Some(s), Some(e)) = (start, end)
        && s > e
    {
        return Err(ToolError::invalid("end_date", "must not be before start_date"));
    }
    Ok(())
}

/// Checks that a URL is absolute http(s).
pub fn http_url(field: &str, value: &str) -> Result<(), ToolError> {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !value.chars().any(char::is_whitespace) => Ok(()),
        _ => Err(ToolError::invalid(field, "must be an absolute http(s) URL")),
    }
}
