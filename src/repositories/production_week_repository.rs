use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, SimpleExpr},
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DbBackend, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{debug, info};

use crate::entities::{
    daily_employee_hours::{self, Entity as DailyEmployeeHours},
    production_week::{self, Entity as ProductionWeek},
};
use crate::errors::ServiceError;
use crate::reports::RollupGroupBy;

/// Rows per multi-row insert, well inside SQLite's bind-parameter limit.
const INSERT_CHUNK_SIZE: usize = 100;

/// Identifies a daily-hours row independently of its surrogate id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DailyHoursKey {
    pub employee_id: i64,
    pub work_area_id: i64,
    pub work_date: NaiveDate,
    pub production_week_id: i64,
}

/// Unrounded hour sums over a week's rows. `actual` stays `None` until some
/// row records actual hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromQueryResult)]
pub struct WeekHourSums {
    pub forecasted: Option<Decimal>,
    pub actual: Option<Decimal>,
}

/// Hours summed per calendar month of `work_date` and per group key.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct MonthlyHoursTotal {
    pub year: i32,
    pub month: i32,
    pub group_id: i64,
    pub forecasted: Option<Decimal>,
    pub actual: Option<Decimal>,
}

#[derive(Debug, Clone, Copy)]
enum DatePart {
    Year,
    Month,
}

/// Integer year or month of `work_date`, in the backend's dialect.
fn work_date_part(backend: DbBackend, part: DatePart) -> SimpleExpr {
    let sql = match (backend, part) {
        (DbBackend::Sqlite, DatePart::Year) => "CAST(strftime('%Y', work_date) AS INTEGER)",
        (DbBackend::Sqlite, DatePart::Month) => "CAST(strftime('%m', work_date) AS INTEGER)",
        (DbBackend::Postgres, DatePart::Year) => "CAST(EXTRACT(YEAR FROM work_date) AS INTEGER)",
        (DbBackend::Postgres, DatePart::Month) => "CAST(EXTRACT(MONTH FROM work_date) AS INTEGER)",
        (DbBackend::MySql, DatePart::Year) => "YEAR(work_date)",
        (DbBackend::MySql, DatePart::Month) => "MONTH(work_date)",
    };
    Expr::cust(sql)
}

/// Repository for production weeks and the daily hours they own
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductionWeekRepository;

impl ProductionWeekRepository {
    pub async fn find<C: ConnectionTrait>(
        conn: &C,
        id: i64,
    ) -> Result<Option<production_week::Model>, ServiceError> {
        ProductionWeek::find_by_id(id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn require<C: ConnectionTrait>(
        conn: &C,
        id: i64,
    ) -> Result<production_week::Model, ServiceError> {
        Self::find(conn, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Production week {} not found", id)))
    }

    pub async fn find_by_start<C: ConnectionTrait>(
        conn: &C,
        start: NaiveDate,
    ) -> Result<Option<production_week::Model>, ServiceError> {
        ProductionWeek::find()
            .filter(production_week::Column::ReportingWeekStartDate.eq(start))
            .one(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn list_newest_first<C: ConnectionTrait>(
        conn: &C,
    ) -> Result<Vec<production_week::Model>, ServiceError> {
        ProductionWeek::find()
            .order_by_desc(production_week::Column::ReportingWeekStartDate)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Weeks whose start date falls in `from..=to`, oldest first.
    pub async fn list_starting_between<C: ConnectionTrait>(
        conn: &C,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<production_week::Model>, ServiceError> {
        let mut query = ProductionWeek::find();
        if let Some((from, to)) = range {
            query = query
                .filter(production_week::Column::ReportingWeekStartDate.gte(from))
                .filter(production_week::Column::ReportingWeekStartDate.lte(to));
        }
        query
            .order_by_asc(production_week::Column::ReportingWeekStartDate)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Inserts a week with no targets or aggregates. A week already anchored
    /// on `start` is a conflict.
    pub async fn insert_shell<C: ConnectionTrait>(
        conn: &C,
        start: NaiveDate,
    ) -> Result<production_week::Model, ServiceError> {
        production_week::ActiveModel {
            production_week_id: NotSet,
            reporting_week_start_date: Set(start),
            reporting_week_end_date: Set(start + Duration::days(6)),
            forecasted_product_value: Set(None),
            actual_product_value: Set(None),
            forecasted_boxes_built: Set(None),
            actual_boxes_built: Set(None),
            forecasted_total_production_hours: Set(None),
            actual_total_production_hours: Set(None),
            forecasted_dollars_per_hour: Set(None),
            actual_dollars_per_hour: Set(None),
        }
        .insert(conn)
        .await
        .map_err(|e| {
            ServiceError::from_write(
                e,
                format!("A production week starting {} already exists", start),
            )
        })
    }

    pub async fn update<C: ConnectionTrait>(
        conn: &C,
        week: production_week::ActiveModel,
    ) -> Result<production_week::Model, ServiceError> {
        week.update(conn).await.map_err(ServiceError::db_error)
    }

    pub async fn delete<C: ConnectionTrait>(conn: &C, id: i64) -> Result<bool, ServiceError> {
        let result = ProductionWeek::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(result.rows_affected > 0)
    }

    /// Daily hours owned by a week, ordered by date then employee.
    pub async fn daily_hours_for_week<C: ConnectionTrait>(
        conn: &C,
        week_id: i64,
    ) -> Result<Vec<daily_employee_hours::Model>, ServiceError> {
        DailyEmployeeHours::find()
            .filter(daily_employee_hours::Column::ProductionWeekId.eq(week_id))
            .order_by_asc(daily_employee_hours::Column::WorkDate)
            .order_by_asc(daily_employee_hours::Column::EmployeeId)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Forecast and actual sums over every row the week owns.
    pub async fn week_hour_sums<C: ConnectionTrait>(
        conn: &C,
        week_id: i64,
    ) -> Result<WeekHourSums, ServiceError> {
        let sums = DailyEmployeeHours::find()
            .select_only()
            .column_as(
                Expr::col(daily_employee_hours::Column::ForecastedHours).sum(),
                "forecasted",
            )
            .column_as(
                Expr::col(daily_employee_hours::Column::ActualHours).sum(),
                "actual",
            )
            .filter(daily_employee_hours::Column::ProductionWeekId.eq(week_id))
            .into_model::<WeekHourSums>()
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(sums.unwrap_or_default())
    }

    /// Sums daily hours per (year, month, group) for rows dated within the
    /// range. `None` covers every row.
    pub async fn monthly_hour_totals<C: ConnectionTrait>(
        conn: &C,
        range: Option<(NaiveDate, NaiveDate)>,
        group_by: RollupGroupBy,
    ) -> Result<Vec<MonthlyHoursTotal>, ServiceError> {
        let backend = conn.get_database_backend();
        let group_column = match group_by {
            RollupGroupBy::WorkArea => daily_employee_hours::Column::WorkAreaId,
            RollupGroupBy::Employee => daily_employee_hours::Column::EmployeeId,
        };
        let year = work_date_part(backend, DatePart::Year);
        let month = work_date_part(backend, DatePart::Month);

        let mut query = DailyEmployeeHours::find()
            .select_only()
            .column_as(year.clone(), "year")
            .column_as(month.clone(), "month")
            .column_as(group_column, "group_id")
            .column_as(
                Expr::col(daily_employee_hours::Column::ForecastedHours).sum(),
                "forecasted",
            )
            .column_as(
                Expr::col(daily_employee_hours::Column::ActualHours).sum(),
                "actual",
            );
        if let Some((from, to)) = range {
            query = query
                .filter(daily_employee_hours::Column::WorkDate.gte(from))
                .filter(daily_employee_hours::Column::WorkDate.lte(to));
        }
        let totals = query
            .group_by(year)
            .group_by(month)
            .group_by(group_column)
            .into_model::<MonthlyHoursTotal>()
            .all(conn)
            .await
            .map_err(ServiceError::db_error)?;
        debug!(buckets = totals.len(), group_by = %group_by, "Summed monthly hours");
        Ok(totals)
    }

    /// Daily hours dated within the range regardless of owning week. `None`
    /// returns everything.
    pub async fn daily_hours_between<C: ConnectionTrait>(
        conn: &C,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<daily_employee_hours::Model>, ServiceError> {
        let mut query = DailyEmployeeHours::find();
        if let Some((from, to)) = range {
            query = query
                .filter(daily_employee_hours::Column::WorkDate.gte(from))
                .filter(daily_employee_hours::Column::WorkDate.lte(to));
        }
        query
            .order_by_asc(daily_employee_hours::Column::WorkDate)
            .order_by_asc(daily_employee_hours::Column::DailyHourId)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn find_daily_hours<C: ConnectionTrait>(
        conn: &C,
        id: i64,
    ) -> Result<Option<daily_employee_hours::Model>, ServiceError> {
        DailyEmployeeHours::find_by_id(id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn find_daily_hours_by_key<C: ConnectionTrait>(
        conn: &C,
        key: DailyHoursKey,
    ) -> Result<Option<daily_employee_hours::Model>, ServiceError> {
        DailyEmployeeHours::find()
            .filter(daily_employee_hours::Column::EmployeeId.eq(key.employee_id))
            .filter(daily_employee_hours::Column::WorkAreaId.eq(key.work_area_id))
            .filter(daily_employee_hours::Column::WorkDate.eq(key.work_date))
            .filter(daily_employee_hours::Column::ProductionWeekId.eq(key.production_week_id))
            .one(conn)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn insert_daily_hours<C: ConnectionTrait>(
        conn: &C,
        key: DailyHoursKey,
        forecasted_hours: Decimal,
        actual_hours: Option<Decimal>,
    ) -> Result<daily_employee_hours::Model, ServiceError> {
        new_daily_hours(key, forecasted_hours, actual_hours)
            .insert(conn)
            .await
            .map_err(|e| {
                ServiceError::from_write(
                    e,
                    format!(
                        "Hours for employee {} in work area {} on {} already exist for week {}",
                        key.employee_id, key.work_area_id, key.work_date, key.production_week_id
                    ),
                )
            })
    }

    pub async fn update_daily_hours<C: ConnectionTrait>(
        conn: &C,
        row: daily_employee_hours::ActiveModel,
    ) -> Result<daily_employee_hours::Model, ServiceError> {
        row.update(conn).await.map_err(|e| {
            ServiceError::from_write(e, "Another row already holds that employee, work area and date")
        })
    }

    /// Bulk insert used by week generation. Returns the number of rows written.
    pub async fn insert_daily_hours_batch<C: ConnectionTrait>(
        conn: &C,
        rows: Vec<daily_employee_hours::ActiveModel>,
    ) -> Result<usize, ServiceError> {
        let total = rows.len();
        let mut pending = rows.into_iter().peekable();
        while pending.peek().is_some() {
            let chunk: Vec<_> = pending.by_ref().take(INSERT_CHUNK_SIZE).collect();
            debug!(rows = chunk.len(), "Inserting daily hours chunk");
            DailyEmployeeHours::insert_many(chunk)
                .exec_without_returning(conn)
                .await
                .map_err(|e| {
                    ServiceError::from_write(e, "Generated daily hours collide with existing rows")
                })?;
        }
        Ok(total)
    }

    /// Removes every daily-hours row owned by the week.
    pub async fn delete_daily_hours_for_week<C: ConnectionTrait>(
        conn: &C,
        week_id: i64,
    ) -> Result<u64, ServiceError> {
        let result = DailyEmployeeHours::delete_many()
            .filter(daily_employee_hours::Column::ProductionWeekId.eq(week_id))
            .exec(conn)
            .await
            .map_err(ServiceError::db_error)?;
        info!(
            production_week_id = week_id,
            removed = result.rows_affected,
            "Removed daily hours owned by production week"
        );
        Ok(result.rows_affected)
    }
}

pub fn new_daily_hours(
    key: DailyHoursKey,
    forecasted_hours: Decimal,
    actual_hours: Option<Decimal>,
) -> daily_employee_hours::ActiveModel {
    daily_employee_hours::ActiveModel {
        daily_hour_id: NotSet,
        employee_id: Set(key.employee_id),
        work_area_id: Set(key.work_area_id),
        production_week_id: Set(key.production_week_id),
        work_date: Set(key.work_date),
        forecasted_hours: Set(forecasted_hours),
        actual_hours: Set(actual_hours),
    }
}
