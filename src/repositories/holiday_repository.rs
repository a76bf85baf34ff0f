use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use crate::entities::holiday::{self, Entity as Holiday};
use crate::errors::ServiceError;
use crate::scheduling::HolidaySet;

/// Repository for the holiday calendar
#[derive(Debug, Clone, Copy, Default)]
pub struct HolidayRepository;

impl HolidayRepository {
    /// Loads every holiday date. Callers load once per operation.
    pub async fn load_set<C: ConnectionTrait>(conn: &C) -> Result<HolidaySet, ServiceError> {
        let dates: Vec<NaiveDate> = Holiday::find()
            .select_only()
            .column(holiday::Column::HolidayDate)
            .into_tuple()
            .all(conn)
            .await
            .map_err(ServiceError::db_error)?;
        debug!(count = dates.len(), "Loaded holiday calendar");
        Ok(HolidaySet::new(dates))
    }

    pub async fn list<C: ConnectionTrait>(conn: &C) -> Result<Vec<holiday::Model>, ServiceError> {
        Holiday::find()
            .order_by_asc(holiday::Column::HolidayDate)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn find_by_date<C: ConnectionTrait>(
        conn: &C,
        date: NaiveDate,
    ) -> Result<Option<holiday::Model>, ServiceError> {
        Holiday::find()
            .filter(holiday::Column::HolidayDate.eq(date))
            .one(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        date: NaiveDate,
        description: Option<String>,
    ) -> Result<holiday::Model, ServiceError> {
        holiday::ActiveModel {
            holiday_id: NotSet,
            holiday_date: Set(date),
            description: Set(description),
        }
        .insert(conn)
        .await
        .map_err(|e| ServiceError::from_write(e, format!("Holiday on {} already exists", date)))
    }

    /// Returns whether a row was removed.
    pub async fn delete<C: ConnectionTrait>(conn: &C, id: i64) -> Result<bool, ServiceError> {
        let result = Holiday::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(result.rows_affected > 0)
    }
}
