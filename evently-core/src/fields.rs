//! Parsing of loosely typed form values into event fields.
//!
//! Multipart and query values arrive as text. An empty value counts as
//! absent, anything else has to parse.

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::{Date, Month, OffsetDateTime};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("invalid number for `{field}`: {value}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("invalid date for `{field}`: {value}")]
    InvalidDate { field: &'static str, value: String },
}

/// Parse an optional numeric field. Non-finite values are rejected.
pub fn parse_number(field: &'static str, raw: Option<&str>) -> Result<Option<f64>, FieldError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(FieldError::InvalidNumber {
            field,
            value: raw.to_owned(),
        }),
    }
}

/// Parse an optional calendar timestamp.
///
/// Accepts RFC 3339, a bare `YYYY-MM-DD` (midnight UTC) or integer
/// milliseconds since the Unix epoch.
pub fn parse_date(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<OffsetDateTime>, FieldError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let invalid = || FieldError::InvalidDate {
        field,
        value: raw.to_owned(),
    };

    if let Ok(timestamp) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(Some(timestamp));
    }
    if let Some(date) = parse_calendar_date(raw) {
        return Ok(Some(date.midnight().assume_utc()));
    }
    if let Ok(millis) = raw.parse::<i64>() {
        return OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
            .map(Some)
            .map_err(|_| invalid());
    }
    Err(invalid())
}

fn parse_calendar_date(raw: &str) -> Option<Date> {
    let mut parts = raw.splitn(3, '-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if year.len() != 4 || month.len() != 2 || day.len() != 2 {
        return None;
    }
    let month = Month::try_from(month.parse::<u8>().ok()?).ok()?;
    Date::from_calendar_date(year.parse().ok()?, month, day.parse().ok()?).ok()
}
