//! Pure field validators.
//!
//! Each helper checks one field-level constraint and yields a
//! [`ValidationError`] naming the field on failure. They perform no I/O and
//! never consult storage; domain operations call them before opening a unit
//! of work and short-circuit on the first failure with `?`.

use std::fmt::Display;

use chrono::{NaiveDate, NaiveTime};
use validator::ValidateEmail;

use crate::error::ValidationError;

/// Trim `value` and require the result to be non-empty. Returns the trimmed
/// string so callers store the normalized form.
pub fn non_empty(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Normalize an optional text field: trims, and maps a blank value to `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Trim and require a syntactically valid email address.
pub fn email(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = non_empty(field, value)?;
    if !trimmed.validate_email() {
        return Err(ValidationError::new(field, "is not a valid email address"));
    }
    Ok(trimmed)
}

/// Require the trimmed value to be at least `min` characters long.
pub fn min_len(field: &'static str, value: &str, min: usize) -> Result<String, ValidationError> {
    let trimmed = non_empty(field, value)?;
    if trimmed.chars().count() < min {
        return Err(ValidationError::new(
            field,
            format!("must be at least {min} characters"),
        ));
    }
    Ok(trimmed)
}

/// Inclusive range check for ordered values.
pub fn in_range<T>(field: &'static str, value: T, lo: T, hi: T) -> Result<T, ValidationError>
where
    T: PartialOrd + Display + Copy,
{
    if value < lo || value > hi {
        return Err(ValidationError::new(
            field,
            format!("must be between {lo} and {hi}"),
        ));
    }
    Ok(value)
}

/// Require a strictly positive integer.
pub fn positive_i32(field: &'static str, value: i32) -> Result<i32, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::new(field, "must be positive"));
    }
    Ok(value)
}

/// Require a strictly positive amount.
pub fn positive_f64(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::new(field, "must be positive"));
    }
    Ok(value)
}

/// Require a non-negative count.
pub fn non_negative_i32(field: &'static str, value: i32) -> Result<i32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::new(field, "cannot be negative"));
    }
    Ok(value)
}

/// Sanity bounds for a calendar year, e.g. a book's publication year.
pub fn year_in_range(
    field: &'static str,
    year: i32,
    current_year: i32,
) -> Result<i32, ValidationError> {
    if year < 1000 || year > current_year {
        return Err(ValidationError::new(field, "is not a plausible year"));
    }
    Ok(year)
}

/// Require `date <= today`.
pub fn not_in_future(
    field: &'static str,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<NaiveDate, ValidationError> {
    if date > today {
        return Err(ValidationError::new(field, "cannot be in the future"));
    }
    Ok(date)
}

/// Require `date >= min`, where `min_field` names the field being compared
/// against (e.g. a due date that may not precede its borrow date).
pub fn on_or_after(
    field: &'static str,
    date: NaiveDate,
    min: NaiveDate,
    min_field: &str,
) -> Result<NaiveDate, ValidationError> {
    if date < min {
        return Err(ValidationError::new(
            field,
            format!("cannot be before {min_field}"),
        ));
    }
    Ok(date)
}

/// Require `start < end` for a time-of-day pair.
pub fn starts_before(
    field: &'static str,
    start: NaiveTime,
    end: NaiveTime,
) -> Result<(), ValidationError> {
    if start >= end {
        return Err(ValidationError::new(field, "start must be before end"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn non_empty_trims_and_accepts() {
        assert_eq!(non_empty("name", "  Ada  ").unwrap(), "Ada");
    }

    #[test]
    fn non_empty_rejects_whitespace_only() {
        let err = non_empty("name", "   ").unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.reason, "cannot be empty");
    }

    #[test]
    fn optional_text_maps_blank_to_none() {
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(None), None);
        assert_eq!(optional_text(Some(" CS ")), Some("CS".to_string()));
    }

    #[test]
    fn email_accepts_valid_and_rejects_invalid() {
        assert_eq!(email("email", " ada@example.com ").unwrap(), "ada@example.com");
        assert!(email("email", "not-an-email").is_err());
    }

    #[test]
    fn min_len_counts_characters() {
        assert!(min_len("password", "secret", 6).is_ok());
        assert!(min_len("password", "short", 6).is_err());
    }

    #[test]
    fn in_range_is_inclusive() {
        assert!(in_range("semester", 1, 1, 8).is_ok());
        assert!(in_range("semester", 8, 1, 8).is_ok());
        assert!(in_range("semester", 0, 1, 8).is_err());
        assert!(in_range("semester", 9, 1, 8).is_err());
        assert!(in_range("marks", 100, 0, 100).is_ok());
    }

    #[test]
    fn positive_amount_rejects_zero_and_nan() {
        assert!(positive_f64("amount", 150.0).is_ok());
        assert!(positive_f64("amount", 0.0).is_err());
        assert!(positive_f64("amount", -3.0).is_err());
        assert!(positive_f64("amount", f64::NAN).is_err());
    }

    #[test]
    fn year_bounds() {
        assert!(year_in_range("publication_year", 1999, 2026).is_ok());
        assert!(year_in_range("publication_year", 999, 2026).is_err());
        assert!(year_in_range("publication_year", 2027, 2026).is_err());
    }

    #[test]
    fn date_relations() {
        let today = date(2026, 8, 25);
        assert!(not_in_future("borrow_date", today, today).is_ok());
        assert!(not_in_future("borrow_date", date(2026, 8, 26), today).is_err());
        assert!(on_or_after("due_date", date(2026, 9, 1), today, "borrow_date").is_ok());
        assert!(on_or_after("due_date", date(2026, 8, 1), today, "borrow_date").is_err());
    }

    #[test]
    fn time_ordering() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        assert!(starts_before("start_time", nine, ten).is_ok());
        assert!(starts_before("start_time", ten, nine).is_err());
        assert!(starts_before("start_time", nine, nine).is_err());
    }
}
