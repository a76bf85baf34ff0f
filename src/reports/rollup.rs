//! Monthly hour rollups grouped by work area or employee.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use strum::{Display, EnumString};
use tracing::warn;

use super::variance::{round2, variance_pct};
use crate::errors::ServiceError;
use crate::repositories::production_week_repository::MonthlyHoursTotal;

/// Ordering stand-in for an infinite percentage (no forecast, some actual).
/// Never reported.
pub const VARIANCE_PCT_SORT_SENTINEL: Decimal = dec!(999999999);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RollupGroupBy {
    #[default]
    WorkArea,
    Employee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RollupSortKey {
    #[default]
    DisplayOrder,
    #[strum(serialize = "name", serialize = "employee_name")]
    Name,
    ForecastedHours,
    ActualHours,
    Variance,
    VariancePct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    Year(i32),
    /// The twelve whole months before the month containing `as_of`.
    TrailingTwelveMonths { as_of: NaiveDate },
    AllTime,
}

impl ReportPeriod {
    /// Inclusive date bounds, or `None` for no filtering.
    pub fn date_range(&self) -> Result<Option<(NaiveDate, NaiveDate)>, ServiceError> {
        match *self {
            ReportPeriod::Year(year) => {
                let start = NaiveDate::from_ymd_opt(year, 1, 1);
                let end = NaiveDate::from_ymd_opt(year, 12, 31);
                match (start, end) {
                    (Some(start), Some(end)) => Ok(Some((start, end))),
                    _ => Err(ServiceError::ValidationError(format!(
                        "Year {} is out of range",
                        year
                    ))),
                }
            }
            ReportPeriod::TrailingTwelveMonths { as_of } => {
                let this_month = first_of_month(as_of);
                let start = first_of_month(this_month - Duration::days(365));
                let end = this_month - Duration::days(1);
                Ok(Some((start, end)))
            }
            ReportPeriod::AllTime => Ok(None),
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupQuery {
    pub group_by: RollupGroupBy,
    pub period: ReportPeriod,
    #[serde(default)]
    pub sort_by: RollupSortKey,
    #[serde(default)]
    pub direction: SortDirection,
}

impl RollupQuery {
    pub fn new(group_by: RollupGroupBy, period: ReportPeriod) -> Self {
        Self {
            group_by,
            period,
            sort_by: RollupSortKey::default(),
            direction: SortDirection::default(),
        }
    }

    pub fn sorted_by(mut self, sort_by: RollupSortKey, direction: SortDirection) -> Self {
        self.sort_by = sort_by;
        self.direction = direction;
        self
    }
}

/// Descriptive data for one group key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollupGroup {
    pub id: i64,
    /// Work area name or employee first name.
    pub name: String,
    /// Employee last initial; empty for work areas.
    pub name_suffix: String,
    pub display_order: Option<i32>,
}

impl RollupGroup {
    pub fn label(&self) -> String {
        if self.name_suffix.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.name_suffix)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRollupRow {
    pub year: i32,
    pub month: u32,
    pub group_id: i64,
    pub group_name: String,
    pub display_order: Option<i32>,
    pub forecasted_hours: Decimal,
    pub actual_hours: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variance_pct: Option<Decimal>,
}

impl MonthlyRollupRow {
    /// Ordering value for percentage sorts, with sentinels standing in for
    /// an unbounded change when nothing was forecast.
    pub fn variance_pct_sort_key(&self) -> Decimal {
        if self.forecasted_hours.is_zero() {
            return match self.actual_hours.cmp(&Decimal::ZERO) {
                Ordering::Greater => VARIANCE_PCT_SORT_SENTINEL,
                Ordering::Less => -VARIANCE_PCT_SORT_SENTINEL,
                Ordering::Equal => Decimal::ZERO,
            };
        }
        variance_pct(self.forecasted_hours, self.actual_hours)
    }
}

/// Turns per-month sums into report rows and orders them.
///
/// Sums whose group is unknown are left out. A group with no recorded actual
/// hours reports 0.
pub fn build_monthly_rollup(
    totals: &[MonthlyHoursTotal],
    groups: &HashMap<i64, RollupGroup>,
    query: &RollupQuery,
) -> Result<Vec<MonthlyRollupRow>, ServiceError> {
    let mut rows = Vec::with_capacity(totals.len());
    for total in totals {
        let Some(group) = groups.get(&total.group_id) else {
            warn!(
                group_id = total.group_id,
                group_by = %query.group_by,
                "No group record for rollup key, skipping"
            );
            continue;
        };
        let month = u32::try_from(total.month).map_err(|_| {
            ServiceError::InternalError(format!("Month {} out of range in rollup", total.month))
        })?;
        let forecasted = round2(total.forecasted.unwrap_or_default());
        let actual = round2(total.actual.unwrap_or_default());
        let (variance, pct) = match query.group_by {
            RollupGroupBy::Employee => (
                Some(round2(actual - forecasted)),
                Some(round2(variance_pct(forecasted, actual))),
            ),
            RollupGroupBy::WorkArea => (None, None),
        };
        rows.push(MonthlyRollupRow {
            year: total.year,
            month,
            group_id: total.group_id,
            group_name: group.label(),
            display_order: group.display_order,
            forecasted_hours: forecasted,
            actual_hours: actual,
            variance,
            variance_pct: pct,
        });
    }

    sort_rollup(&mut rows, groups, query.sort_by, query.direction);
    Ok(rows)
}

/// Primary key, then a stable tiebreaker, then year and month, all in the
/// requested direction. Null primary values lead ascending and trail
/// descending.
pub fn sort_rollup(
    rows: &mut [MonthlyRollupRow],
    groups: &HashMap<i64, RollupGroup>,
    sort_by: RollupSortKey,
    direction: SortDirection,
) {
    let name_of = |row: &MonthlyRollupRow| {
        groups
            .get(&row.group_id)
            .map(|g| (g.name.clone(), g.name_suffix.clone()))
            .unwrap_or_default()
    };

    rows.sort_by(|a, b| {
        let primary = match sort_by {
            RollupSortKey::DisplayOrder => a
                .display_order
                .cmp(&b.display_order)
                .then(a.group_id.cmp(&b.group_id)),
            RollupSortKey::Name => {
                let (a_name, a_suffix) = name_of(a);
                let (b_name, b_suffix) = name_of(b);
                a_name
                    .cmp(&b_name)
                    .then(a_suffix.cmp(&b_suffix))
                    .then(a.group_id.cmp(&b.group_id))
            }
            RollupSortKey::ForecastedHours => a
                .forecasted_hours
                .cmp(&b.forecasted_hours)
                .then(a.display_order.cmp(&b.display_order)),
            RollupSortKey::ActualHours => a
                .actual_hours
                .cmp(&b.actual_hours)
                .then(a.display_order.cmp(&b.display_order)),
            RollupSortKey::Variance => (a.actual_hours - a.forecasted_hours)
                .cmp(&(b.actual_hours - b.forecasted_hours))
                .then(a.display_order.cmp(&b.display_order)),
            RollupSortKey::VariancePct => a
                .variance_pct_sort_key()
                .cmp(&b.variance_pct_sort_key())
                .then(a.display_order.cmp(&b.display_order)),
        };
        direction
            .apply(primary.then(a.year.cmp(&b.year)).then(a.month.cmp(&b.month)))
            .then(a.group_id.cmp(&b.group_id))
    });
}
