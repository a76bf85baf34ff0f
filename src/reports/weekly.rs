use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::rollup::ReportPeriod;
use super::variance::{round2, Variance};
use crate::entities::production_week;
use crate::errors::ServiceError;

/// Target-versus-actual summary for one production week. Missing targets
/// and aggregates count as zero in the variances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyOverviewRow {
    pub production_week_id: i64,
    pub reporting_week_start_date: NaiveDate,
    pub reporting_week_end_date: NaiveDate,
    pub forecasted_product_value: Option<Decimal>,
    pub actual_product_value: Option<Decimal>,
    pub forecasted_dollars_per_hour: Option<Decimal>,
    pub actual_dollars_per_hour: Option<Decimal>,
    pub dollars_per_hour: Variance,
    pub forecasted_boxes_built: Option<i32>,
    pub actual_boxes_built: Option<i32>,
    pub boxes_built: Variance,
    pub forecasted_total_production_hours: Option<Decimal>,
    pub actual_total_production_hours: Option<Decimal>,
    pub total_hours: Variance,
}

impl From<&production_week::Model> for WeeklyOverviewRow {
    fn from(week: &production_week::Model) -> Self {
        Self {
            production_week_id: week.production_week_id,
            reporting_week_start_date: week.reporting_week_start_date,
            reporting_week_end_date: week.reporting_week_end_date,
            forecasted_product_value: week.forecasted_product_value,
            actual_product_value: week.actual_product_value,
            forecasted_dollars_per_hour: week.forecasted_dollars_per_hour,
            actual_dollars_per_hour: week.actual_dollars_per_hour,
            dollars_per_hour: Variance::between_optional(
                week.forecasted_dollars_per_hour,
                week.actual_dollars_per_hour,
            ),
            forecasted_boxes_built: week.forecasted_boxes_built,
            actual_boxes_built: week.actual_boxes_built,
            boxes_built: Variance::between_optional(
                week.forecasted_boxes_built.map(Decimal::from),
                week.actual_boxes_built.map(Decimal::from),
            ),
            forecasted_total_production_hours: week.forecasted_total_production_hours,
            actual_total_production_hours: week.actual_total_production_hours,
            total_hours: Variance::between_optional(
                week.forecasted_total_production_hours,
                week.actual_total_production_hours,
            ),
        }
    }
}

/// Company-wide actuals for the weeks starting in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCompanyActualsRow {
    pub year: i32,
    pub month: u32,
    pub total_actual_product_value: Decimal,
    pub total_actual_hours: Decimal,
    pub total_actual_boxes: i64,
    /// 0 when no hours were recorded.
    pub actual_dollars_per_hour: Decimal,
}

#[derive(Default)]
struct MonthTotals {
    value: Decimal,
    hours: Decimal,
    boxes: i64,
}

/// Groups weeks by the month of their start date, oldest month first.
pub fn build_company_actuals(
    weeks: &[production_week::Model],
    period: &ReportPeriod,
) -> Result<Vec<MonthlyCompanyActualsRow>, ServiceError> {
    let range = period.date_range()?;
    let mut months: BTreeMap<(i32, u32), MonthTotals> = BTreeMap::new();

    for week in weeks {
        let start = week.reporting_week_start_date;
        if let Some((from, to)) = range {
            if start < from || start > to {
                continue;
            }
        }
        let totals = months.entry((start.year(), start.month())).or_default();
        totals.value += week.actual_product_value.unwrap_or_default();
        totals.hours += week.actual_total_production_hours.unwrap_or_default();
        totals.boxes += i64::from(week.actual_boxes_built.unwrap_or_default());
    }

    Ok(months
        .into_iter()
        .map(|((year, month), totals)| MonthlyCompanyActualsRow {
            year,
            month,
            total_actual_product_value: round2(totals.value),
            total_actual_hours: round2(totals.hours),
            total_actual_boxes: totals.boxes,
            actual_dollars_per_hour: if totals.hours > Decimal::ZERO {
                round2(totals.value / totals.hours)
            } else {
                Decimal::ZERO
            },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn week(
        id: i64,
        start: NaiveDate,
        value: Option<Decimal>,
        hours: Option<Decimal>,
        boxes: Option<i32>,
    ) -> production_week::Model {
        production_week::Model {
            production_week_id: id,
            reporting_week_start_date: start,
            reporting_week_end_date: start + chrono::Duration::days(6),
            forecasted_product_value: None,
            actual_product_value: value,
            forecasted_boxes_built: Some(100),
            actual_boxes_built: boxes,
            forecasted_total_production_hours: Some(dec!(200)),
            actual_total_production_hours: hours,
            forecasted_dollars_per_hour: None,
            actual_dollars_per_hour: None,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn overview_treats_missing_values_as_zero() {
        let row = WeeklyOverviewRow::from(&week(1, d(2024, 1, 8), None, None, Some(90)));
        assert_eq!(row.boxes_built.variance, dec!(-10));
        assert_eq!(row.boxes_built.variance_pct, dec!(-10));
        assert_eq!(row.total_hours.variance, dec!(-200));
        assert_eq!(row.dollars_per_hour.variance_pct, dec!(0));
    }

    #[test]
    fn company_actuals_group_by_start_month() {
        let weeks = vec![
            week(1, d(2024, 1, 29), Some(dec!(5000)), Some(dec!(200)), Some(40)),
            week(2, d(2024, 1, 22), Some(dec!(3000)), Some(dec!(100)), None),
            week(3, d(2024, 2, 5), None, None, None),
        ];
        let rows = build_company_actuals(&weeks, &ReportPeriod::AllTime).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].month, 1);
        assert_eq!(rows[0].total_actual_hours, dec!(300));
        assert_eq!(rows[0].total_actual_boxes, 40);
        assert_eq!(rows[0].actual_dollars_per_hour, dec!(26.67));
        assert_eq!(rows[1].actual_dollars_per_hour, dec!(0));
    }
}
