use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use std::collections::HashMap;

use crate::entities::{
    daily_employee_hours::{self, Entity as DailyEmployeeHours},
    employee::{self, Entity as Employee},
    position::{self, Entity as Position},
    work_area::{self, Entity as WorkArea},
};
use crate::errors::ServiceError;

/// Repository for work areas, positions and employees
#[derive(Debug, Clone, Copy, Default)]
pub struct RosterRepository;

impl RosterRepository {
    pub async fn find_work_area<C: ConnectionTrait>(
        conn: &C,
        id: i64,
    ) -> Result<Option<work_area::Model>, ServiceError> {
        WorkArea::find_by_id(id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn require_work_area<C: ConnectionTrait>(
        conn: &C,
        id: i64,
    ) -> Result<work_area::Model, ServiceError> {
        Self::find_work_area(conn, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Work area {} not found", id)))
    }

    /// Work areas by display order; unordered areas come first, ties by id.
    pub async fn list_work_areas<C: ConnectionTrait>(
        conn: &C,
    ) -> Result<Vec<work_area::Model>, ServiceError> {
        WorkArea::find()
            .order_by_asc(work_area::Column::DisplayOrder)
            .order_by_asc(work_area::Column::WorkAreaId)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn work_areas_by_id<C: ConnectionTrait>(
        conn: &C,
    ) -> Result<HashMap<i64, work_area::Model>, ServiceError> {
        Ok(Self::list_work_areas(conn)
            .await?
            .into_iter()
            .map(|area| (area.work_area_id, area))
            .collect())
    }

    pub async fn find_position<C: ConnectionTrait>(
        conn: &C,
        id: i64,
    ) -> Result<Option<position::Model>, ServiceError> {
        Position::find_by_id(id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn require_position<C: ConnectionTrait>(
        conn: &C,
        id: i64,
    ) -> Result<position::Model, ServiceError> {
        Self::find_position(conn, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Position {} not found", id)))
    }

    pub async fn list_positions<C: ConnectionTrait>(
        conn: &C,
    ) -> Result<Vec<position::Model>, ServiceError> {
        Position::find()
            .order_by_asc(position::Column::DisplayOrder)
            .order_by_asc(position::Column::PositionId)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn positions_by_id<C: ConnectionTrait>(
        conn: &C,
    ) -> Result<HashMap<i64, position::Model>, ServiceError> {
        Ok(Self::list_positions(conn)
            .await?
            .into_iter()
            .map(|position| (position.position_id, position))
            .collect())
    }

    /// The position an employee holds.
    pub async fn position_for<C: ConnectionTrait>(
        conn: &C,
        employee: &employee::Model,
    ) -> Result<Option<position::Model>, ServiceError> {
        Self::find_position(conn, employee.position_id).await
    }

    pub async fn find_employee<C: ConnectionTrait>(
        conn: &C,
        id: i64,
    ) -> Result<Option<employee::Model>, ServiceError> {
        Employee::find_by_id(id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn require_employee<C: ConnectionTrait>(
        conn: &C,
        id: i64,
    ) -> Result<employee::Model, ServiceError> {
        Self::find_employee(conn, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Employee {} not found", id)))
    }

    pub async fn list_employees<C: ConnectionTrait>(
        conn: &C,
    ) -> Result<Vec<employee::Model>, ServiceError> {
        Employee::find()
            .order_by_asc(employee::Column::DisplayOrder)
            .order_by_asc(employee::Column::EmployeeId)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Employees active on at least one day of `from..=to`.
    pub async fn employees_active_between<C: ConnectionTrait>(
        conn: &C,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<employee::Model>, ServiceError> {
        Employee::find()
            .filter(employee::Column::EmploymentStartDate.lte(to))
            .filter(
                Condition::any()
                    .add(employee::Column::EmploymentEndDate.is_null())
                    .add(employee::Column::EmploymentEndDate.gte(from)),
            )
            .order_by_asc(employee::Column::DisplayOrder)
            .order_by_asc(employee::Column::EmployeeId)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn count_employees_in_work_area<C: ConnectionTrait>(
        conn: &C,
        work_area_id: i64,
    ) -> Result<u64, ServiceError> {
        Employee::find()
            .filter(employee::Column::PrimaryWorkAreaId.eq(work_area_id))
            .count(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn count_employees_with_position<C: ConnectionTrait>(
        conn: &C,
        position_id: i64,
    ) -> Result<u64, ServiceError> {
        Employee::find()
            .filter(employee::Column::PositionId.eq(position_id))
            .count(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn count_daily_hours_in_work_area<C: ConnectionTrait>(
        conn: &C,
        work_area_id: i64,
    ) -> Result<u64, ServiceError> {
        DailyEmployeeHours::find()
            .filter(daily_employee_hours::Column::WorkAreaId.eq(work_area_id))
            .count(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn count_daily_hours_for_employee<C: ConnectionTrait>(
        conn: &C,
        employee_id: i64,
    ) -> Result<u64, ServiceError> {
        DailyEmployeeHours::find()
            .filter(daily_employee_hours::Column::EmployeeId.eq(employee_id))
            .count(conn)
            .await
            .map_err(ServiceError::db_error)
    }
}
