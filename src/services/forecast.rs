use chrono::NaiveDate;
use metrics::{counter, histogram};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::Set, IntoActiveModel, TransactionTrait};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    db::DbPool,
    entities::{employee, production_week, work_area},
    errors::ServiceError,
    reports::variance::{dollars_per_hour, round2},
    repositories::{
        production_week_repository::{new_daily_hours, DailyHoursKey},
        HolidayRepository, ProductionWeekRepository, RosterRepository,
    },
    scheduling::{ensure_week_anchor, is_active, is_weekday, resolve_window, HolidaySet},
};

/// An employee together with what forecasting needs to know about them.
#[derive(Debug, Clone)]
pub struct EmployeeAssignment {
    pub employee: employee::Model,
    pub work_area: Option<work_area::Model>,
    /// Default hours of the employee's position, if the position exists.
    pub default_hours: Option<Decimal>,
}

/// One forecast cell produced by planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlannedHours {
    pub employee_id: i64,
    pub work_area_id: i64,
    pub work_date: NaiveDate,
    pub forecasted_hours: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekPlan {
    pub rows: Vec<PlannedHours>,
    /// Employees left out because their work area could not be resolved.
    pub skipped_employees: Vec<i64>,
}

impl WeekPlan {
    /// Sum of every planned row, rounded to two places.
    pub fn total_hours(&self) -> Decimal {
        round2(self.rows.iter().map(|row| row.forecasted_hours).sum())
    }
}

/// Result of generating a week.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedWeek {
    pub week: production_week::Model,
    pub rows_created: usize,
    pub skipped_employees: Vec<i64>,
}

/// Expands every assignment into one row per day of its work area's
/// contribution window.
///
/// A day is forecast at the position default only when it is a weekday,
/// not a holiday and inside the employee's employment; every other day is
/// emitted with zero hours.
pub fn plan_week_forecast(
    reporting_week_start_date: NaiveDate,
    assignments: &[EmployeeAssignment],
    holidays: &HolidaySet,
) -> Result<WeekPlan, ServiceError> {
    let mut plan = WeekPlan::default();

    for assignment in assignments {
        let employee = &assignment.employee;
        let Some(area) = assignment.work_area.as_ref() else {
            warn!(
                employee_id = employee.employee_id,
                "Employee has no primary work area; skipping forecast"
            );
            plan.skipped_employees.push(employee.employee_id);
            continue;
        };
        if assignment.default_hours.is_none() {
            warn!(
                employee_id = employee.employee_id,
                position_id = employee.position_id,
                "Employee position not found; forecasting zero hours"
            );
        }

        let window = resolve_window(
            reporting_week_start_date,
            area.reporting_week_start_offset_days,
            area.contributing_duration_days,
        )?;

        for work_date in window.days() {
            let scheduled = is_weekday(work_date)
                && !holidays.is_holiday(work_date)
                && is_active(employee, work_date);
            let forecasted_hours = if scheduled {
                assignment.default_hours.unwrap_or_default()
            } else {
                Decimal::ZERO
            };
            plan.rows.push(PlannedHours {
                employee_id: employee.employee_id,
                work_area_id: area.work_area_id,
                work_date,
                forecasted_hours,
            });
        }
    }

    Ok(plan)
}

/// Creates production weeks and their forecast daily hours
#[derive(Clone)]
pub struct ForecastService {
    db: Arc<DbPool>,
}

impl ForecastService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Creates the week anchored on `reporting_week_start_date` and forecasts
    /// hours for every employee. Nothing is written unless the whole week is.
    #[instrument(skip(self))]
    pub async fn generate_week(
        &self,
        reporting_week_start_date: NaiveDate,
    ) -> Result<GeneratedWeek, ServiceError> {
        ensure_week_anchor(reporting_week_start_date)?;
        let started = Instant::now();
        let db = &*self.db;

        if ProductionWeekRepository::find_by_start(db, reporting_week_start_date)
            .await?
            .is_some()
        {
            counter!("shopfloor.forecast.conflicts", 1);
            return Err(ServiceError::Conflict(format!(
                "A production week starting {} already exists",
                reporting_week_start_date
            )));
        }

        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        // The unique index settles a race with a concurrent generator.
        let week = ProductionWeekRepository::insert_shell(&txn, reporting_week_start_date)
            .await
            .map_err(|e| {
                if matches!(e, ServiceError::Conflict(_)) {
                    counter!("shopfloor.forecast.conflicts", 1);
                }
                e
            })?;

        let holidays = HolidayRepository::load_set(&txn).await?;
        let work_areas = RosterRepository::work_areas_by_id(&txn).await?;
        let positions = RosterRepository::positions_by_id(&txn).await?;
        let assignments: Vec<EmployeeAssignment> = RosterRepository::list_employees(&txn)
            .await?
            .into_iter()
            .map(|employee| EmployeeAssignment {
                work_area: work_areas.get(&employee.primary_work_area_id).cloned(),
                default_hours: positions
                    .get(&employee.position_id)
                    .map(|position| position.default_hours),
                employee,
            })
            .collect();
        debug!(
            employees = assignments.len(),
            holidays = holidays.len(),
            "Planning week forecast"
        );

        let plan = plan_week_forecast(reporting_week_start_date, &assignments, &holidays)?;
        let total_hours = plan.total_hours();
        let week_id = week.production_week_id;

        let rows = plan
            .rows
            .iter()
            .map(|row| {
                new_daily_hours(
                    DailyHoursKey {
                        employee_id: row.employee_id,
                        work_area_id: row.work_area_id,
                        work_date: row.work_date,
                        production_week_id: week_id,
                    },
                    row.forecasted_hours,
                    None,
                )
            })
            .collect();
        let rows_created = ProductionWeekRepository::insert_daily_hours_batch(&txn, rows)
            .await
            .map_err(|e| {
                error!(production_week_id = week_id, "Failed to insert forecast rows: {}", e);
                e
            })?;

        let forecasted_dph = dollars_per_hour(week.forecasted_product_value, Some(total_hours));
        let mut active = week.into_active_model();
        active.forecasted_total_production_hours = Set(Some(total_hours));
        active.forecasted_dollars_per_hour = Set(forecasted_dph);
        let week = ProductionWeekRepository::update(&txn, active).await?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        counter!("shopfloor.forecast.weeks_generated", 1);
        counter!("shopfloor.forecast.rows_emitted", rows_created as u64);
        histogram!("shopfloor.forecast.generate_duration", started.elapsed());
        info!(
            production_week_id = week.production_week_id,
            rows = rows_created,
            forecasted_total_hours = %total_hours,
            "Production week generated"
        );

        Ok(GeneratedWeek {
            week,
            rows_created,
            skipped_employees: plan.skipped_employees,
        })
    }

    /// Parses a `YYYY-MM-DD` anchor and generates the week.
    pub async fn generate_week_from_str(&self, value: &str) -> Result<GeneratedWeek, ServiceError> {
        let anchor = crate::scheduling::parse_iso_date(value)?;
        self.generate_week(anchor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn area(id: i64, offset: i32, duration: i32) -> work_area::Model {
        work_area::Model {
            work_area_id: id,
            work_area_name: format!("Area {}", id),
            reporting_week_start_offset_days: offset,
            contributing_duration_days: duration,
            display_order: Some(id as i32),
        }
    }

    fn assignment(
        id: i64,
        area: Option<work_area::Model>,
        hours: Option<Decimal>,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> EmployeeAssignment {
        EmployeeAssignment {
            employee: employee::Model {
                employee_id: id,
                first_name: "Sam".into(),
                last_initial: "R".into(),
                position_id: 1,
                primary_work_area_id: area.as_ref().map_or(99, |a| a.work_area_id),
                employment_start_date: start,
                employment_end_date: end,
                display_order: id as i32,
            },
            work_area: area,
            default_hours: hours,
        }
    }

    #[test]
    fn shifted_window_skips_weekend_and_holiday() {
        let monday = d(2024, 1, 8);
        let holidays = HolidaySet::new([d(2024, 1, 10)]);
        let plan = plan_week_forecast(
            monday,
            &[assignment(1, Some(area(1, -1, 7)), Some(dec!(8)), d(2020, 1, 1), None)],
            &holidays,
        )
        .unwrap();

        let hours: Vec<_> = plan.rows.iter().map(|r| r.forecasted_hours).collect();
        // Sun, Mon, Tue, Wed (holiday), Thu, Fri, Sat
        assert_eq!(
            hours,
            vec![dec!(0), dec!(8), dec!(8), dec!(0), dec!(8), dec!(8), dec!(0)]
        );
        assert_eq!(plan.rows[0].work_date, d(2024, 1, 7));
        assert_eq!(plan.total_hours(), dec!(32));
    }

    #[test]
    fn days_after_employment_end_are_zero() {
        let plan = plan_week_forecast(
            d(2024, 1, 8),
            &[assignment(
                1,
                Some(area(1, 0, 7)),
                Some(dec!(7.5)),
                d(2020, 1, 1),
                Some(d(2024, 1, 10)),
            )],
            &HolidaySet::default(),
        )
        .unwrap();

        assert_eq!(plan.rows.len(), 7);
        assert_eq!(plan.total_hours(), dec!(22.5));
        assert!(plan
            .rows
            .iter()
            .filter(|r| r.work_date > d(2024, 1, 10))
            .all(|r| r.forecasted_hours.is_zero()));
    }

    #[test]
    fn missing_area_skips_and_missing_position_forecasts_zero() {
        let plan = plan_week_forecast(
            d(2024, 1, 8),
            &[
                assignment(1, None, Some(dec!(8)), d(2020, 1, 1), None),
                assignment(2, Some(area(1, 0, 2)), None, d(2020, 1, 1), None),
            ],
            &HolidaySet::default(),
        )
        .unwrap();

        assert_eq!(plan.skipped_employees, vec![1]);
        assert_eq!(plan.rows.len(), 2);
        assert_eq!(plan.total_hours(), dec!(0));
    }

    #[test]
    fn invalid_duration_is_reported() {
        let result = plan_week_forecast(
            d(2024, 1, 8),
            &[assignment(1, Some(area(1, 0, 0)), Some(dec!(8)), d(2020, 1, 1), None)],
            &HolidaySet::default(),
        );
        assert!(matches!(result, Err(ServiceError::ValidationError(_))));
    }
}
