//! Calendar rules behind forecast generation: contribution windows, the
//! holiday calendar and employment bounds.

pub mod employment;
pub mod holidays;
pub mod window;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::errors::ServiceError;

pub use employment::{is_active, overlaps};
pub use holidays::HolidaySet;
pub use window::{resolve_window, ContributionWindow};

/// Monday through Friday.
pub fn is_weekday(date: NaiveDate) -> bool {
    date.weekday().number_from_monday() <= 5
}

/// Reporting weeks are anchored on Mondays.
pub fn is_week_anchor(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Mon
}

/// The Monday anchor of the week containing `date`. A Sunday belongs to the
/// week that starts the following day.
pub fn week_anchor_for(date: NaiveDate) -> NaiveDate {
    let date = if date.weekday() == Weekday::Sun {
        date + Duration::days(1)
    } else {
        date
    };
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Sunday through Saturday around a Monday anchor.
pub fn calendar_week_for(anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = anchor - Duration::days(1);
    (start, start + Duration::days(6))
}

/// Rejects anything that is not a Monday.
pub fn ensure_week_anchor(date: NaiveDate) -> Result<(), ServiceError> {
    if is_week_anchor(date) {
        Ok(())
    } else {
        Err(ServiceError::ValidationError(format!(
            "Reporting week start date {} must be a Monday (got {})",
            date,
            date.weekday()
        )))
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ServiceError::ValidationError(format!(
            "Invalid date format '{}', expected YYYY-MM-DD",
            value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use test_case::test_case;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test_case(d(2024, 6, 3), true ; "monday")]
    #[test_case(d(2024, 6, 7), true ; "friday")]
    #[test_case(d(2024, 6, 8), false ; "saturday")]
    #[test_case(d(2024, 6, 9), false ; "sunday")]
    fn weekday_classification(date: NaiveDate, expected: bool) {
        assert_eq!(is_weekday(date), expected);
    }

    #[test_case(d(2024, 6, 3), d(2024, 6, 3) ; "monday is its own anchor")]
    #[test_case(d(2024, 6, 6), d(2024, 6, 3) ; "thursday")]
    #[test_case(d(2024, 6, 8), d(2024, 6, 3) ; "saturday")]
    #[test_case(d(2024, 6, 9), d(2024, 6, 10) ; "sunday rolls forward")]
    fn anchors(date: NaiveDate, expected: NaiveDate) {
        assert_eq!(week_anchor_for(date), expected);
    }

    #[test]
    fn calendar_week_runs_sunday_to_saturday() {
        let (start, end) = calendar_week_for(d(2024, 6, 3));
        assert_eq!(start, d(2024, 6, 2));
        assert_eq!(end, d(2024, 6, 8));
    }

    #[test]
    fn non_monday_anchor_is_rejected() {
        assert!(ensure_week_anchor(d(2024, 6, 3)).is_ok());
        assert_matches!(
            ensure_week_anchor(d(2024, 6, 4)),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_iso_date(" 2024-01-08 ").unwrap(), d(2024, 1, 8));
        assert_matches!(
            parse_iso_date("08/01/2024"),
            Err(ServiceError::ValidationError(_))
        );
    }
}
