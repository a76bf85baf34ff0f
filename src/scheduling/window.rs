use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::errors::ServiceError;

/// Inclusive run of calendar dates whose hours count toward one reporting
/// week for a given work area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContributionWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ContributionWindow {
    /// `duration_days` must be at least one.
    pub fn new(start: NaiveDate, duration_days: i32) -> Result<Self, ServiceError> {
        if duration_days < 1 {
            return Err(ServiceError::ValidationError(format!(
                "Contributing duration must be at least 1 day, got {}",
                duration_days
            )));
        }
        let end = start
            .checked_add_signed(Duration::days(i64::from(duration_days) - 1))
            .ok_or_else(|| out_of_calendar(start, duration_days))?;
        Ok(Self { start, end })
    }

    pub fn day_count(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Dates in ascending order, both ends included.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.day_count() as i64).map(move |offset| start + Duration::days(offset))
    }
}

/// Shifts the Monday anchor by the work area's signed offset and spans its
/// contributing duration.
pub fn resolve_window(
    reporting_week_start_date: NaiveDate,
    offset_days: i32,
    duration_days: i32,
) -> Result<ContributionWindow, ServiceError> {
    let start = reporting_week_start_date
        .checked_add_signed(Duration::days(i64::from(offset_days)))
        .ok_or_else(|| out_of_calendar(reporting_week_start_date, offset_days))?;
    ContributionWindow::new(start, duration_days)
}

fn out_of_calendar(date: NaiveDate, days: i32) -> ServiceError {
    ServiceError::ValidationError(format!(
        "Shifting {} by {} days leaves the supported calendar",
        date, days
    ))
}
