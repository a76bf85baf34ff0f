use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use crate::{
    db::DbPool, entities::holiday, errors::ServiceError, repositories::HolidayRepository,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewHoliday {
    pub holiday_date: NaiveDate,
    #[validate(length(max = 255))]
    #[serde(default)]
    pub description: Option<String>,
}

/// Maintains the company holiday calendar
#[derive(Clone)]
pub struct HolidayService {
    db: Arc<DbPool>,
}

impl HolidayService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Oldest first.
    pub async fn list(&self) -> Result<Vec<holiday::Model>, ServiceError> {
        HolidayRepository::list(&*self.db).await
    }

    #[instrument(skip(self))]
    pub async fn add(&self, input: NewHoliday) -> Result<holiday::Model, ServiceError> {
        input.validate()?;
        let description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        let created = HolidayRepository::insert(&*self.db, input.holiday_date, description).await?;
        info!(holiday_date = %created.holiday_date, "Holiday added");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !HolidayRepository::delete(&*self.db, id).await? {
            return Err(ServiceError::NotFound(format!("Holiday {} not found", id)));
        }
        info!(holiday_id = id, "Holiday deleted");
        Ok(())
    }

    /// Deletes the holiday on `date`.
    pub async fn delete_by_date(&self, date: NaiveDate) -> Result<(), ServiceError> {
        let holiday = HolidayRepository::find_by_date(&*self.db, date)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No holiday on {}", date)))?;
        self.delete(holiday.holiday_id).await
    }
}
