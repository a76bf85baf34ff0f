use chrono::NaiveDate;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use std::collections::HashMap;
use tracing::debug;

use crate::entities::{
    daily_shift_summary::{self, Entity as DailyShiftSummary},
    finishing_work::{self, Entity as FinishingWork},
    job::{self, Entity as Job},
};
use crate::errors::ServiceError;

/// Repository for jobs and the shop output recorded against them
#[derive(Debug, Clone, Copy, Default)]
pub struct JobRepository;

impl JobRepository {
    pub async fn find_job<C: ConnectionTrait>(
        conn: &C,
        id: i64,
    ) -> Result<Option<job::Model>, ServiceError> {
        Job::find_by_id(id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn require_job<C: ConnectionTrait>(
        conn: &C,
        id: i64,
    ) -> Result<job::Model, ServiceError> {
        Self::find_job(conn, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Job {} not found", id)))
    }

    /// Jobs ordered by tag.
    pub async fn list_jobs<C: ConnectionTrait>(conn: &C) -> Result<Vec<job::Model>, ServiceError> {
        Job::find()
            .order_by_asc(job::Column::JobTag)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn job_tags_by_id<C: ConnectionTrait>(
        conn: &C,
    ) -> Result<HashMap<i64, String>, ServiceError> {
        Ok(Self::list_jobs(conn)
            .await?
            .into_iter()
            .map(|job| (job.job_id, job.job_tag))
            .collect())
    }

    pub async fn insert_job<C: ConnectionTrait>(
        conn: &C,
        job: job::ActiveModel,
        tag: &str,
    ) -> Result<job::Model, ServiceError> {
        job.insert(conn)
            .await
            .map_err(|e| ServiceError::from_write(e, format!("Job tag '{}' already exists", tag)))
    }

    pub async fn update_job<C: ConnectionTrait>(
        conn: &C,
        job: job::ActiveModel,
    ) -> Result<job::Model, ServiceError> {
        job.update(conn)
            .await
            .map_err(|e| ServiceError::from_write(e, "Another job already uses that tag"))
    }

    /// Returns whether a row was removed.
    pub async fn delete_job<C: ConnectionTrait>(conn: &C, id: i64) -> Result<bool, ServiceError> {
        let result = Job::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(result.rows_affected > 0)
    }

    /// Clears the job link on every summary and finishing record that
    /// points at `job_id`. Returns the number of rows touched.
    pub async fn detach_job<C: ConnectionTrait>(conn: &C, job_id: i64) -> Result<u64, ServiceError> {
        let summaries = DailyShiftSummary::update_many()
            .col_expr(
                daily_shift_summary::Column::JobId,
                Expr::value(Option::<i64>::None),
            )
            .filter(daily_shift_summary::Column::JobId.eq(job_id))
            .exec(conn)
            .await
            .map_err(ServiceError::db_error)?;
        let finishing = FinishingWork::update_many()
            .col_expr(finishing_work::Column::JobId, Expr::value(Option::<i64>::None))
            .filter(finishing_work::Column::JobId.eq(job_id))
            .exec(conn)
            .await
            .map_err(ServiceError::db_error)?;
        debug!(
            job_id,
            summaries = summaries.rows_affected,
            finishing = finishing.rows_affected,
            "Detached records from job"
        );
        Ok(summaries.rows_affected + finishing.rows_affected)
    }

    pub async fn insert_shift_summary<C: ConnectionTrait>(
        conn: &C,
        summary: daily_shift_summary::ActiveModel,
    ) -> Result<daily_shift_summary::Model, ServiceError> {
        summary.insert(conn).await.map_err(ServiceError::db_error)
    }

    /// Summaries dated within the range, by date then id. `None` returns
    /// everything.
    pub async fn list_shift_summaries<C: ConnectionTrait>(
        conn: &C,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<daily_shift_summary::Model>, ServiceError> {
        let mut query = DailyShiftSummary::find();
        if let Some((from, to)) = range {
            query = query
                .filter(daily_shift_summary::Column::SummaryDate.gte(from))
                .filter(daily_shift_summary::Column::SummaryDate.lte(to));
        }
        query
            .order_by_asc(daily_shift_summary::Column::SummaryDate)
            .order_by_asc(daily_shift_summary::Column::SummaryId)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn count_shift_summaries_for_employee<C: ConnectionTrait>(
        conn: &C,
        employee_id: i64,
    ) -> Result<u64, ServiceError> {
        DailyShiftSummary::find()
            .filter(daily_shift_summary::Column::EmployeeId.eq(employee_id))
            .count(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn find_finishing_work<C: ConnectionTrait>(
        conn: &C,
        id: i64,
    ) -> Result<Option<finishing_work::Model>, ServiceError> {
        FinishingWork::find_by_id(id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn require_finishing_work<C: ConnectionTrait>(
        conn: &C,
        id: i64,
    ) -> Result<finishing_work::Model, ServiceError> {
        Self::find_finishing_work(conn, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Finishing work {} not found", id)))
    }

    pub async fn list_finishing_work<C: ConnectionTrait>(
        conn: &C,
    ) -> Result<Vec<finishing_work::Model>, ServiceError> {
        FinishingWork::find()
            .order_by_asc(finishing_work::Column::FinishingId)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn insert_finishing_work<C: ConnectionTrait>(
        conn: &C,
        work: finishing_work::ActiveModel,
    ) -> Result<finishing_work::Model, ServiceError> {
        work.insert(conn).await.map_err(ServiceError::db_error)
    }

    pub async fn update_finishing_work<C: ConnectionTrait>(
        conn: &C,
        work: finishing_work::ActiveModel,
    ) -> Result<finishing_work::Model, ServiceError> {
        work.update(conn).await.map_err(ServiceError::db_error)
    }

    pub async fn count_finishing_work_for_employee<C: ConnectionTrait>(
        conn: &C,
        employee_id: i64,
    ) -> Result<u64, ServiceError> {
        FinishingWork::find()
            .filter(finishing_work::Column::EmployeeId.eq(employee_id))
            .count(conn)
            .await
            .map_err(ServiceError::db_error)
    }
}
