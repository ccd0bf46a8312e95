use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{DateRange, Period, PeriodPayload};

/// Earliest year accepted in a period
pub const MIN_YEAR: i32 = 1;

/// Latest year accepted in a period (four-digit calendar years only)
pub const MAX_YEAR: i32 = 9999;

/// Malformed period supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid month '{0}': expected an integer between 1 and 12")]
    InvalidMonth(String),

    #[error("Invalid year '{0}': expected an integer between 1 and 9999")]
    InvalidYear(String),
}

/// Parse the wire representation of a period
pub fn parse_period(payload: &PeriodPayload) -> Result<Period, ValidationError> {
    let month = payload
        .month
        .trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidMonth(payload.month.clone()))?;
    let year = payload
        .year
        .trim()
        .parse::<i32>()
        .map_err(|_| ValidationError::InvalidYear(payload.year.clone()))?;

    let period = Period::new(month, year);
    validate_period(&period)?;
    Ok(period)
}

/// Check that month and year describe a representable calendar month
pub fn validate_period(period: &Period) -> Result<(), ValidationError> {
    if !(1..=12).contains(&period.month) {
        return Err(ValidationError::InvalidMonth(period.month.to_string()));
    }
    if !(MIN_YEAR..=MAX_YEAR).contains(&period.year) {
        return Err(ValidationError::InvalidYear(period.year.to_string()));
    }
    Ok(())
}

/// Compute the half-open range covering the whole month
///
/// `end` is the first day of the following month, rolling into January of
/// the next year for December, so timestamps on the last day of the month
/// are always inside the range regardless of their time component.
pub fn month_range(period: &Period) -> Result<DateRange, ValidationError> {
    validate_period(period)?;

    let (next_year, next_month) = if period.month == 12 {
        (period.year + 1, 1)
    } else {
        (period.year, period.month + 1)
    };

    let start = first_day(period.year, period.month)
        .ok_or_else(|| ValidationError::InvalidYear(period.year.to_string()))?;
    let end = first_day(next_year, next_month)
        .ok_or_else(|| ValidationError::InvalidYear(period.year.to_string()))?;

    Ok(DateRange { start, end })
}

fn first_day(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn payload(month: &str, year: &str) -> PeriodPayload {
        PeriodPayload {
            month: month.to_string(),
            year: year.to_string(),
        }
    }

    #[test]
    fn test_mid_year_range() {
        let range = month_range(&Period::new(6, 2024)).unwrap();
        assert_eq!(range.start, date(2024, 6, 1));
        assert_eq!(range.end, date(2024, 7, 1));
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let range = month_range(&Period::new(12, 2024)).unwrap();
        assert_eq!(range.start, date(2024, 12, 1));
        assert_eq!(range.end, date(2025, 1, 1));
    }

    #[test]
    fn test_february_leap_year() {
        let range = month_range(&Period::new(2, 2024)).unwrap();
        assert_eq!(range.end, date(2024, 3, 1));
        assert!(range.contains(date(2024, 2, 29)));
    }

    #[test]
    fn test_range_is_half_open() {
        let range = month_range(&Period::new(3, 2023)).unwrap();
        assert!(range.contains(range.start));
        assert!(range.contains(date(2023, 3, 31)));
        assert!(!range.contains(range.end));
        assert!(!range.contains(date(2023, 2, 28)));
    }

    #[test]
    fn test_every_month_spans_exactly_one_month() {
        for year in [1999, 2000, 2024, 9999] {
            for month in 1..=12 {
                let range = month_range(&Period::new(month, year)).unwrap();
                assert_eq!(range.start, date(year, month, 1));
                assert_eq!(range.end, range.start.checked_add_months(chrono::Months::new(1)).unwrap());
            }
        }
    }

    #[test]
    fn test_month_out_of_bounds() {
        assert_eq!(
            month_range(&Period::new(0, 2024)),
            Err(ValidationError::InvalidMonth("0".to_string()))
        );
        assert_eq!(
            month_range(&Period::new(13, 2024)),
            Err(ValidationError::InvalidMonth("13".to_string()))
        );
    }

    #[test]
    fn test_year_out_of_bounds() {
        assert!(matches!(month_range(&Period::new(1, 0)), Err(ValidationError::InvalidYear(_))));
        assert!(matches!(month_range(&Period::new(1, 10000)), Err(ValidationError::InvalidYear(_))));
    }

    #[test]
    fn test_parse_period() {
        assert_eq!(parse_period(&payload("06", "2024")), Ok(Period::new(6, 2024)));
        assert_eq!(parse_period(&payload(" 12 ", "1999")), Ok(Period::new(12, 1999)));
    }

    #[test]
    fn test_parse_period_rejects_non_numeric() {
        assert_eq!(
            parse_period(&payload("June", "2024")),
            Err(ValidationError::InvalidMonth("June".to_string()))
        );
        assert_eq!(
            parse_period(&payload("6", "twenty")),
            Err(ValidationError::InvalidYear("twenty".to_string()))
        );
        assert!(parse_period(&payload("-1", "2024")).is_err());
    }
}
