use chrono::NaiveDate;
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, EntityTrait, IntoActiveModel,
    ModelTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::{Validate, ValidationError};

use super::{deserialize_some, validate_non_negative_decimal};
use crate::{
    db::{run_in_transaction, DbPool},
    entities::{employee, position, work_area, Employee, Position, WorkArea},
    errors::ServiceError,
    repositories::{JobRepository, RosterRepository},
};

/// Display order given to records created without one.
pub const DEFAULT_DISPLAY_ORDER: i32 = 999_999;
const DEFAULT_CONTRIBUTING_DURATION_DAYS: i32 = 7;
/// Widest shift or span a work area may declare, in days.
pub const MAX_WINDOW_DAYS: i32 = 366;

fn default_contributing_duration() -> i32 {
    DEFAULT_CONTRIBUTING_DURATION_DAYS
}

fn validate_week_offset(value: i32) -> Result<(), ValidationError> {
    if (-MAX_WINDOW_DAYS..=MAX_WINDOW_DAYS).contains(&value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("range");
        err.message = Some(
            format!("Offset must be within {} days of the week start", MAX_WINDOW_DAYS).into(),
        );
        Err(err)
    }
}

fn validate_employment_dates(input: &NewEmployee) -> Result<(), ValidationError> {
    check_employment_dates(input.employment_start_date, input.employment_end_date)
}

fn check_employment_dates(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), ValidationError> {
    match end {
        Some(end) if end < start => {
            let mut err = ValidationError::new("employment_end_date");
            err.message = Some("Employment end date must not be before the start date".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewWorkArea {
    #[validate(length(min = 1, max = 100))]
    pub work_area_name: String,
    #[validate(custom = "validate_week_offset")]
    pub reporting_week_start_offset_days: i32,
    #[serde(default = "default_contributing_duration")]
    #[validate(range(min = 1, max = 366))]
    pub contributing_duration_days: i32,
    #[serde(default)]
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct WorkAreaUpdate {
    #[validate(length(min = 1, max = 100))]
    pub work_area_name: Option<String>,
    #[validate(custom = "validate_week_offset")]
    pub reporting_week_start_offset_days: Option<i32>,
    #[validate(range(min = 1, max = 366))]
    pub contributing_duration_days: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewPosition {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(custom = "validate_non_negative_decimal")]
    pub default_hours: Decimal,
    #[serde(default)]
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct PositionUpdate {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[validate(custom = "validate_non_negative_decimal")]
    pub default_hours: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_employment_dates"))]
pub struct NewEmployee {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 5))]
    pub last_initial: String,
    pub position_id: i64,
    pub primary_work_area_id: i64,
    pub employment_start_date: NaiveDate,
    #[serde(default)]
    pub employment_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct EmployeeUpdate {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 5))]
    pub last_initial: Option<String>,
    pub position_id: Option<i64>,
    pub primary_work_area_id: Option<i64>,
    pub employment_start_date: Option<NaiveDate>,
    /// `Some(None)` clears the end date.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub employment_end_date: Option<Option<NaiveDate>>,
}

/// New position for one record in a reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderItem {
    pub id: i64,
    pub order: i32,
}

/// Work areas, positions and employees
#[derive(Clone)]
pub struct RosterService {
    db: Arc<DbPool>,
}

impl RosterService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    // Work areas

    pub async fn list_work_areas(&self) -> Result<Vec<work_area::Model>, ServiceError> {
        RosterRepository::list_work_areas(&*self.db).await
    }

    #[instrument(skip(self))]
    pub async fn create_work_area(
        &self,
        input: NewWorkArea,
    ) -> Result<work_area::Model, ServiceError> {
        input.validate()?;
        let name = input.work_area_name.trim().to_string();
        let created = work_area::ActiveModel {
            work_area_id: NotSet,
            work_area_name: Set(name.clone()),
            reporting_week_start_offset_days: Set(input.reporting_week_start_offset_days),
            contributing_duration_days: Set(input.contributing_duration_days),
            display_order: Set(input.display_order),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| ServiceError::from_write(e, format!("Work area '{}' already exists", name)))?;

        info!(work_area_id = created.work_area_id, name = %created.work_area_name, "Work area created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update_work_area(
        &self,
        id: i64,
        update: WorkAreaUpdate,
    ) -> Result<work_area::Model, ServiceError> {
        update.validate()?;
        let db = &*self.db;
        let existing = RosterRepository::require_work_area(db, id).await?;

        let mut active = existing.into_active_model();
        if let Some(name) = update.work_area_name {
            active.work_area_name = Set(name.trim().to_string());
        }
        if let Some(offset) = update.reporting_week_start_offset_days {
            active.reporting_week_start_offset_days = Set(offset);
        }
        if let Some(duration) = update.contributing_duration_days {
            active.contributing_duration_days = Set(duration);
        }
        active
            .update(db)
            .await
            .map_err(|e| ServiceError::from_write(e, "Another work area already has that name"))
    }

    /// Refused while employees or daily hours still point at the area.
    #[instrument(skip(self))]
    pub async fn delete_work_area(&self, id: i64) -> Result<(), ServiceError> {
        let db = &*self.db;
        let area = RosterRepository::require_work_area(db, id).await?;

        if RosterRepository::count_employees_in_work_area(db, id).await? > 0 {
            return Err(ServiceError::IntegrityGuard(format!(
                "Work area '{}' still has employees; reassign them first",
                area.work_area_name
            )));
        }
        if RosterRepository::count_daily_hours_in_work_area(db, id).await? > 0 {
            return Err(ServiceError::IntegrityGuard(format!(
                "Work area '{}' still has daily hours entries; delete them first",
                area.work_area_name
            )));
        }

        area.delete(db).await.map_err(ServiceError::db_error)?;
        counter!("shopfloor.roster.deleted", 1, "kind" => "work_area");
        info!(work_area_id = id, "Work area deleted");
        Ok(())
    }

    pub async fn reorder_work_areas(&self, items: Vec<ReorderItem>) -> Result<usize, ServiceError> {
        run_in_transaction(&self.db, "reorder_work_areas", move |txn| {
            Box::pin(async move {
                let mut updated = 0;
                for item in items {
                    let Some(area) = WorkArea::find_by_id(item.id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                    else {
                        warn!(work_area_id = item.id, "Work area not found for reordering, skipping");
                        continue;
                    };
                    let mut active = area.into_active_model();
                    active.display_order = Set(Some(item.order));
                    active.update(txn).await.map_err(ServiceError::db_error)?;
                    updated += 1;
                }
                Ok(updated)
            })
        })
        .await
    }

    // Positions

    pub async fn list_positions(&self) -> Result<Vec<position::Model>, ServiceError> {
        RosterRepository::list_positions(&*self.db).await
    }

    #[instrument(skip(self))]
    pub async fn create_position(&self, input: NewPosition) -> Result<position::Model, ServiceError> {
        input.validate()?;
        let title = input.title.trim().to_string();
        let created = position::ActiveModel {
            position_id: NotSet,
            title: Set(title.clone()),
            default_hours: Set(input.default_hours),
            display_order: Set(input.display_order.unwrap_or(DEFAULT_DISPLAY_ORDER)),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| ServiceError::from_write(e, format!("Position '{}' already exists", title)))?;

        info!(position_id = created.position_id, title = %created.title, "Position created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update_position(
        &self,
        id: i64,
        update: PositionUpdate,
    ) -> Result<position::Model, ServiceError> {
        update.validate()?;
        let db = &*self.db;
        let existing = RosterRepository::require_position(db, id).await?;

        let mut active = existing.into_active_model();
        if let Some(title) = update.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(hours) = update.default_hours {
            active.default_hours = Set(hours);
        }
        active
            .update(db)
            .await
            .map_err(|e| ServiceError::from_write(e, "Another position already has that title"))
    }

    /// Refused while any employee holds the position.
    #[instrument(skip(self))]
    pub async fn delete_position(&self, id: i64) -> Result<(), ServiceError> {
        let db = &*self.db;
        let position = RosterRepository::require_position(db, id).await?;

        if RosterRepository::count_employees_with_position(db, id).await? > 0 {
            return Err(ServiceError::IntegrityGuard(format!(
                "Position '{}' is still held by employees; reassign them first",
                position.title
            )));
        }

        position.delete(db).await.map_err(ServiceError::db_error)?;
        counter!("shopfloor.roster.deleted", 1, "kind" => "position");
        info!(position_id = id, "Position deleted");
        Ok(())
    }

    pub async fn reorder_positions(&self, items: Vec<ReorderItem>) -> Result<usize, ServiceError> {
        run_in_transaction(&self.db, "reorder_positions", move |txn| {
            Box::pin(async move {
                let mut updated = 0;
                for item in items {
                    let Some(position) = Position::find_by_id(item.id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                    else {
                        warn!(position_id = item.id, "Position not found for reordering, skipping");
                        continue;
                    };
                    let mut active = position.into_active_model();
                    active.display_order = Set(item.order);
                    active.update(txn).await.map_err(ServiceError::db_error)?;
                    updated += 1;
                }
                Ok(updated)
            })
        })
        .await
    }

    // Employees

    pub async fn list_employees(&self) -> Result<Vec<employee::Model>, ServiceError> {
        RosterRepository::list_employees(&*self.db).await
    }

    pub async fn get_employee(&self, id: i64) -> Result<employee::Model, ServiceError> {
        RosterRepository::require_employee(&*self.db, id).await
    }

    #[instrument(skip(self))]
    pub async fn create_employee(&self, input: NewEmployee) -> Result<employee::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db;
        RosterRepository::require_position(db, input.position_id).await?;
        RosterRepository::require_work_area(db, input.primary_work_area_id).await?;

        let created = employee::ActiveModel {
            employee_id: NotSet,
            first_name: Set(input.first_name.trim().to_string()),
            last_initial: Set(input.last_initial.trim().to_string()),
            position_id: Set(input.position_id),
            primary_work_area_id: Set(input.primary_work_area_id),
            employment_start_date: Set(input.employment_start_date),
            employment_end_date: Set(input.employment_end_date),
            display_order: Set(input.display_order.unwrap_or(DEFAULT_DISPLAY_ORDER)),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(employee_id = created.employee_id, name = %created.display_name(), "Employee created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update_employee(
        &self,
        id: i64,
        update: EmployeeUpdate,
    ) -> Result<employee::Model, ServiceError> {
        update.validate()?;
        let db = &*self.db;
        let existing = RosterRepository::require_employee(db, id).await?;

        if let Some(position_id) = update.position_id {
            RosterRepository::require_position(db, position_id).await?;
        }
        if let Some(work_area_id) = update.primary_work_area_id {
            RosterRepository::require_work_area(db, work_area_id).await?;
        }
        let start = update
            .employment_start_date
            .unwrap_or(existing.employment_start_date);
        let end = update
            .employment_end_date
            .unwrap_or(existing.employment_end_date);
        check_employment_dates(start, end)
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let mut active = existing.into_active_model();
        if let Some(first_name) = update.first_name {
            active.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_initial) = update.last_initial {
            active.last_initial = Set(last_initial.trim().to_string());
        }
        if let Some(position_id) = update.position_id {
            active.position_id = Set(position_id);
        }
        if let Some(work_area_id) = update.primary_work_area_id {
            active.primary_work_area_id = Set(work_area_id);
        }
        active.employment_start_date = Set(start);
        active.employment_end_date = Set(end);
        active.update(db).await.map_err(ServiceError::db_error)
    }

    /// Refused while the employee has daily hours, shift summaries or
    /// finishing work.
    #[instrument(skip(self))]
    pub async fn delete_employee(&self, id: i64) -> Result<(), ServiceError> {
        let db = &*self.db;
        let employee = RosterRepository::require_employee(db, id).await?;

        if RosterRepository::count_daily_hours_for_employee(db, id).await? > 0 {
            return Err(ServiceError::IntegrityGuard(format!(
                "Employee {} has recorded hours; delete those entries first",
                employee.display_name()
            )));
        }
        let shop_records = JobRepository::count_shift_summaries_for_employee(db, id).await?
            + JobRepository::count_finishing_work_for_employee(db, id).await?;
        if shop_records > 0 {
            return Err(ServiceError::IntegrityGuard(format!(
                "Employee {} has shift summaries or finishing work on record",
                employee.display_name()
            )));
        }

        employee.delete(db).await.map_err(ServiceError::db_error)?;
        counter!("shopfloor.roster.deleted", 1, "kind" => "employee");
        info!(employee_id = id, "Employee deleted");
        Ok(())
    }

    pub async fn reorder_employees(&self, items: Vec<ReorderItem>) -> Result<usize, ServiceError> {
        run_in_transaction(&self.db, "reorder_employees", move |txn| {
            Box::pin(async move {
                let mut updated = 0;
                for item in items {
                    let Some(employee) = Employee::find_by_id(item.id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                    else {
                        warn!(employee_id = item.id, "Employee not found for reordering, skipping");
                        continue;
                    };
                    let mut active = employee.into_active_model();
                    active.display_order = Set(item.order);
                    active.update(txn).await.map_err(ServiceError::db_error)?;
                    updated += 1;
                }
                Ok(updated)
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    #[test]
    fn work_area_duration_must_be_positive() {
        let input = NewWorkArea {
            work_area_name: "Packing".into(),
            reporting_week_start_offset_days: -1,
            contributing_duration_days: 0,
            display_order: None,
        };
        let errors = input.validate().unwrap_err();
        assert!(errors
            .field_errors()
            .contains_key("contributing_duration_days"));
    }

    #[test]
    fn work_area_shift_and_span_are_bounded() {
        let input = NewWorkArea {
            work_area_name: "Packing".into(),
            reporting_week_start_offset_days: i32::MAX,
            contributing_duration_days: MAX_WINDOW_DAYS + 1,
            display_order: None,
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("reporting_week_start_offset_days"));
        assert!(fields.contains_key("contributing_duration_days"));

        let update = WorkAreaUpdate {
            reporting_week_start_offset_days: Some(-MAX_WINDOW_DAYS - 1),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let widest = NewWorkArea {
            work_area_name: "Packing".into(),
            reporting_week_start_offset_days: -MAX_WINDOW_DAYS,
            contributing_duration_days: MAX_WINDOW_DAYS,
            display_order: None,
        };
        assert!(widest.validate().is_ok());
    }

    #[test]
    fn work_area_duration_defaults_to_a_week() {
        let input: NewWorkArea = serde_json::from_str(
            r#"{"work_area_name": "Kitting", "reporting_week_start_offset_days": 2}"#,
        )
        .unwrap();
        assert_eq!(input.contributing_duration_days, 7);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn position_hours_cannot_be_negative() {
        let input = NewPosition {
            title: "Operator".into(),
            default_hours: dec!(-0.5),
            display_order: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn employee_end_must_not_precede_start() {
        let input = NewEmployee {
            first_name: "Ana".into(),
            last_initial: "B".into(),
            position_id: 1,
            primary_work_area_id: 1,
            employment_start_date: d(10),
            employment_end_date: Some(d(9)),
            display_order: None,
        };
        assert!(input.validate().is_err());
        assert!(check_employment_dates(d(10), Some(d(10))).is_ok());
    }

    #[test]
    fn update_distinguishes_null_from_absent_end_date() {
        let cleared: EmployeeUpdate =
            serde_json::from_str(r#"{"employment_end_date": null}"#).unwrap();
        assert_eq!(cleared.employment_end_date, Some(None));

        let untouched: EmployeeUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(untouched.employment_end_date, None);
    }
}
