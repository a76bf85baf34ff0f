use chrono::{Datelike, NaiveDate, Weekday};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::Set, IntoActiveModel, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use strum::Display;
use tracing::{info, instrument};
use validator::Validate;

use super::validate_non_negative_decimal;
use crate::{
    db::{run_in_transaction, DbPool},
    entities::{daily_employee_hours, employee, position, production_week, work_area},
    errors::ServiceError,
    reports::variance::dollars_per_hour,
    repositories::{ProductionWeekRepository, RosterRepository},
    scheduling::{
        calendar_week_for, employment, ensure_week_anchor, is_active, is_weekday, week_anchor_for,
    },
};

const NO_WEEK_MESSAGE: &str =
    "No production week exists for this period. Create it before entering hours.";

/// Target values for a week. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct WeekTargetsUpdate {
    #[validate(custom = "validate_non_negative_decimal")]
    pub forecasted_product_value: Option<Decimal>,
    #[validate(range(min = 0))]
    pub forecasted_boxes_built: Option<i32>,
    #[validate(custom = "validate_non_negative_decimal")]
    pub actual_product_value: Option<Decimal>,
    #[validate(range(min = 0))]
    pub actual_boxes_built: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntryStatus {
    /// Backed by a stored daily-hours row.
    Existing,
    /// Suggested value for a day with no row yet.
    NewPotential,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySheetDay {
    pub work_date: NaiveDate,
    pub day_of_week: String,
    pub daily_hour_id: Option<i64>,
    pub forecasted_hours: Decimal,
    pub actual_hours: Option<Decimal>,
    pub work_area_id: i64,
    pub production_week_id: i64,
    pub status: EntryStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySheetEmployee {
    pub employee_id: i64,
    pub first_name: String,
    pub last_initial: String,
    pub position_id: i64,
    pub position_title: Option<String>,
    pub primary_work_area_id: i64,
    pub primary_work_area_name: Option<String>,
    pub days: Vec<EntrySheetDay>,
}

/// Everything needed to enter a week's hours, Sunday through Saturday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySheet {
    pub reporting_week_start_date: NaiveDate,
    pub production_week_id: Option<i64>,
    pub employees: Vec<EntrySheetEmployee>,
    pub work_areas: Vec<work_area::Model>,
    pub message: Option<String>,
}

fn day_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Lays out one row per employee active during the calendar week around
/// `anchor`. `employees` must already be in display order.
pub fn build_entry_sheet(
    anchor: NaiveDate,
    production_week_id: i64,
    employees: &[employee::Model],
    positions: &HashMap<i64, position::Model>,
    work_areas: Vec<work_area::Model>,
    entries: &[daily_employee_hours::Model],
) -> EntrySheet {
    let (from, to) = calendar_week_for(anchor);
    let by_day: HashMap<(i64, NaiveDate), &daily_employee_hours::Model> = entries
        .iter()
        .map(|entry| ((entry.employee_id, entry.work_date), entry))
        .collect();
    let area_names: HashMap<i64, &str> = work_areas
        .iter()
        .map(|area| (area.work_area_id, area.work_area_name.as_str()))
        .collect();

    let rows = employees
        .iter()
        .filter(|employee| employment::overlaps(employee, from, to))
        .map(|employee| {
            let position = positions.get(&employee.position_id);
            let days = from
                .iter_days()
                .take_while(|date| *date <= to)
                .map(|work_date| match by_day.get(&(employee.employee_id, work_date)) {
                    Some(entry) => EntrySheetDay {
                        work_date,
                        day_of_week: day_name(work_date).to_string(),
                        daily_hour_id: Some(entry.daily_hour_id),
                        forecasted_hours: entry.forecasted_hours,
                        actual_hours: entry.actual_hours,
                        work_area_id: entry.work_area_id,
                        production_week_id,
                        status: EntryStatus::Existing,
                    },
                    None => {
                        let forecasted_hours =
                            if is_weekday(work_date) && is_active(employee, work_date) {
                                position.map_or(Decimal::ZERO, |p| p.default_hours)
                            } else {
                                Decimal::ZERO
                            };
                        EntrySheetDay {
                            work_date,
                            day_of_week: day_name(work_date).to_string(),
                            daily_hour_id: None,
                            forecasted_hours,
                            actual_hours: None,
                            work_area_id: employee.primary_work_area_id,
                            production_week_id,
                            status: EntryStatus::NewPotential,
                        }
                    }
                })
                .collect();

            EntrySheetEmployee {
                employee_id: employee.employee_id,
                first_name: employee.first_name.clone(),
                last_initial: employee.last_initial.clone(),
                position_id: employee.position_id,
                position_title: position.map(|p| p.title.clone()),
                primary_work_area_id: employee.primary_work_area_id,
                primary_work_area_name: area_names
                    .get(&employee.primary_work_area_id)
                    .map(|name| name.to_string()),
                days,
            }
        })
        .collect();

    EntrySheet {
        reporting_week_start_date: anchor,
        production_week_id: Some(production_week_id),
        employees: rows,
        work_areas,
        message: None,
    }
}

/// Week targets, lifecycle and the hours entry sheet
#[derive(Clone)]
pub struct ProductionWeekService {
    db: Arc<DbPool>,
}

impl ProductionWeekService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Newest week first.
    pub async fn list_weeks(&self) -> Result<Vec<production_week::Model>, ServiceError> {
        ProductionWeekRepository::list_newest_first(&*self.db).await
    }

    pub async fn get_week(&self, id: i64) -> Result<production_week::Model, ServiceError> {
        ProductionWeekRepository::require(&*self.db, id).await
    }

    pub async fn daily_hours_for_week(
        &self,
        id: i64,
    ) -> Result<Vec<daily_employee_hours::Model>, ServiceError> {
        let db = &*self.db;
        ProductionWeekRepository::require(db, id).await?;
        ProductionWeekRepository::daily_hours_for_week(db, id).await
    }

    /// Stores new targets and re-derives both dollars-per-hour values from
    /// the stored hour totals.
    #[instrument(skip(self))]
    pub async fn update_targets(
        &self,
        id: i64,
        update: WeekTargetsUpdate,
    ) -> Result<production_week::Model, ServiceError> {
        update.validate()?;

        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let week = ProductionWeekRepository::require(&txn, id).await?;

        let forecasted_value = update
            .forecasted_product_value
            .or(week.forecasted_product_value);
        let actual_value = update.actual_product_value.or(week.actual_product_value);
        let forecasted_dph =
            dollars_per_hour(forecasted_value, week.forecasted_total_production_hours);
        let actual_dph = dollars_per_hour(actual_value, week.actual_total_production_hours);
        let forecasted_boxes = update.forecasted_boxes_built.or(week.forecasted_boxes_built);
        let actual_boxes = update.actual_boxes_built.or(week.actual_boxes_built);

        let mut active = week.into_active_model();
        active.forecasted_product_value = Set(forecasted_value);
        active.actual_product_value = Set(actual_value);
        active.forecasted_boxes_built = Set(forecasted_boxes);
        active.actual_boxes_built = Set(actual_boxes);
        active.forecasted_dollars_per_hour = Set(forecasted_dph);
        active.actual_dollars_per_hour = Set(actual_dph);
        let updated = ProductionWeekRepository::update(&txn, active).await?;

        txn.commit().await.map_err(ServiceError::db_error)?;
        info!(production_week_id = id, "Production week targets updated");
        Ok(updated)
    }

    /// Deletes a week together with the daily hours it owns.
    #[instrument(skip(self))]
    pub async fn delete_week(&self, id: i64) -> Result<u64, ServiceError> {
        let removed = run_in_transaction(&self.db, "delete_week", move |txn| {
            Box::pin(async move {
                ProductionWeekRepository::require(txn, id).await?;
                let removed = ProductionWeekRepository::delete_daily_hours_for_week(txn, id).await?;
                ProductionWeekRepository::delete(txn, id).await?;
                Ok(removed)
            })
        })
        .await?;

        counter!("shopfloor.production_weeks.deleted", 1);
        info!(production_week_id = id, daily_hours_removed = removed, "Production week deleted");
        Ok(removed)
    }

    /// Hours entry sheet for the week anchored on `reporting_week_start_date`.
    #[instrument(skip(self))]
    pub async fn entry_sheet(
        &self,
        reporting_week_start_date: NaiveDate,
    ) -> Result<EntrySheet, ServiceError> {
        ensure_week_anchor(reporting_week_start_date)?;
        let db = &*self.db;
        let work_areas = RosterRepository::list_work_areas(db).await?;

        let Some(week) = ProductionWeekRepository::find_by_start(db, reporting_week_start_date).await?
        else {
            return Ok(EntrySheet {
                reporting_week_start_date,
                production_week_id: None,
                employees: Vec::new(),
                work_areas,
                message: Some(NO_WEEK_MESSAGE.to_string()),
            });
        };

        let (from, to) = calendar_week_for(reporting_week_start_date);
        let employees = RosterRepository::employees_active_between(db, from, to).await?;
        let positions = RosterRepository::positions_by_id(db).await?;
        let entries = ProductionWeekRepository::daily_hours_between(db, Some((from, to))).await?;

        Ok(build_entry_sheet(
            reporting_week_start_date,
            week.production_week_id,
            &employees,
            &positions,
            work_areas,
            &entries,
        ))
    }

    /// Entry sheet for the calendar week containing `date`.
    pub async fn entry_sheet_for_date(&self, date: NaiveDate) -> Result<EntrySheet, ServiceError> {
        self.entry_sheet(week_anchor_for(date)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn employee(id: i64, start: NaiveDate, end: Option<NaiveDate>) -> employee::Model {
        employee::Model {
            employee_id: id,
            first_name: format!("E{}", id),
            last_initial: "X".into(),
            position_id: 1,
            primary_work_area_id: 10,
            employment_start_date: start,
            employment_end_date: end,
            display_order: id as i32,
        }
    }

    fn positions() -> HashMap<i64, position::Model> {
        HashMap::from([(
            1,
            position::Model {
                position_id: 1,
                title: "Operator".into(),
                default_hours: dec!(8),
                display_order: 1,
            },
        )])
    }

    fn areas() -> Vec<work_area::Model> {
        vec![work_area::Model {
            work_area_id: 10,
            work_area_name: "Assembly".into(),
            reporting_week_start_offset_days: 0,
            contributing_duration_days: 7,
            display_order: Some(1),
        }]
    }

    #[test]
    fn sheet_mixes_existing_rows_and_suggestions() {
        let stored = daily_employee_hours::Model {
            daily_hour_id: 77,
            employee_id: 1,
            work_area_id: 11,
            production_week_id: 5,
            work_date: d(9),
            forecasted_hours: dec!(6),
            actual_hours: Some(dec!(5.5)),
        };
        let sheet = build_entry_sheet(
            d(8),
            5,
            &[employee(1, d(1), None)],
            &positions(),
            areas(),
            &[stored],
        );

        let days = &sheet.employees[0].days;
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].work_date, d(7));
        assert_eq!(days[0].day_of_week, "Sunday");
        assert_eq!(days[0].status, EntryStatus::NewPotential);
        assert_eq!(days[0].forecasted_hours, dec!(0));
        assert_eq!(days[1].forecasted_hours, dec!(8));
        assert_eq!(days[2].status, EntryStatus::Existing);
        assert_eq!(days[2].work_area_id, 11);
        assert_eq!(days[2].actual_hours, Some(dec!(5.5)));
        assert_eq!(
            sheet.employees[0].primary_work_area_name.as_deref(),
            Some("Assembly")
        );
    }

    #[test]
    fn inactive_days_and_departed_employees() {
        let sheet = build_entry_sheet(
            d(8),
            5,
            &[employee(1, d(10), None), employee(2, d(1), Some(d(5)))],
            &positions(),
            areas(),
            &[],
        );

        assert_eq!(sheet.employees.len(), 1);
        let hours: Vec<_> = sheet.employees[0]
            .days
            .iter()
            .map(|day| day.forecasted_hours)
            .collect();
        assert_eq!(
            hours,
            vec![dec!(0), dec!(0), dec!(0), dec!(8), dec!(8), dec!(8), dec!(0)]
        );
    }

    #[test]
    fn targets_reject_negative_values() {
        let update = WeekTargetsUpdate {
            actual_product_value: Some(dec!(-1)),
            forecasted_boxes_built: Some(-3),
            ..Default::default()
        };
        let errors = update.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("actual_product_value"));
        assert!(errors.field_errors().contains_key("forecasted_boxes_built"));
    }
}
