use metrics::{counter, histogram};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

use crate::{
    db::DbPool,
    errors::ServiceError,
    reports::{
        build_company_actuals, build_monthly_rollup, MonthlyCompanyActualsRow, MonthlyRollupRow,
        ReportPeriod, RollupGroup, RollupGroupBy, RollupQuery, WeeklyOverviewRow,
    },
    repositories::{ProductionWeekRepository, RosterRepository},
};

/// Read-only reporting over weeks and daily hours
#[derive(Clone)]
pub struct ReportService {
    db: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Forecast and actual hours per month per work area or employee.
    #[instrument(skip(self))]
    pub async fn monthly_rollup(
        &self,
        query: RollupQuery,
    ) -> Result<Vec<MonthlyRollupRow>, ServiceError> {
        let started = Instant::now();
        let db = &*self.db;
        let range = query.period.date_range()?;

        let groups: HashMap<i64, RollupGroup> = match query.group_by {
            RollupGroupBy::WorkArea => RosterRepository::list_work_areas(db)
                .await?
                .into_iter()
                .map(|area| {
                    (
                        area.work_area_id,
                        RollupGroup {
                            id: area.work_area_id,
                            name: area.work_area_name,
                            name_suffix: String::new(),
                            display_order: area.display_order,
                        },
                    )
                })
                .collect(),
            RollupGroupBy::Employee => RosterRepository::list_employees(db)
                .await?
                .into_iter()
                .map(|employee| {
                    (
                        employee.employee_id,
                        RollupGroup {
                            id: employee.employee_id,
                            name: employee.first_name,
                            name_suffix: employee.last_initial,
                            display_order: Some(employee.display_order),
                        },
                    )
                })
                .collect(),
        };

        let totals = ProductionWeekRepository::monthly_hour_totals(db, range, query.group_by).await?;
        debug!(buckets = totals.len(), groups = groups.len(), "Building monthly rollup");
        let rows = build_monthly_rollup(&totals, &groups, &query)?;

        counter!("shopfloor.reports.generated", 1, "report" => "monthly_rollup");
        histogram!("shopfloor.reports.duration", started.elapsed(), "report" => "monthly_rollup");
        Ok(rows)
    }

    /// One target-versus-actual row per week, newest first.
    #[instrument(skip(self))]
    pub async fn weekly_overview(&self) -> Result<Vec<WeeklyOverviewRow>, ServiceError> {
        let weeks = ProductionWeekRepository::list_newest_first(&*self.db).await?;
        counter!("shopfloor.reports.generated", 1, "report" => "weekly_overview");
        Ok(weeks.iter().map(WeeklyOverviewRow::from).collect())
    }

    /// Company actuals summed by the month each week starts in.
    #[instrument(skip(self))]
    pub async fn monthly_company_actuals(
        &self,
        period: ReportPeriod,
    ) -> Result<Vec<MonthlyCompanyActualsRow>, ServiceError> {
        let range = period.date_range()?;
        let weeks = ProductionWeekRepository::list_starting_between(&*self.db, range).await?;
        counter!("shopfloor.reports.generated", 1, "report" => "monthly_company_actuals");
        build_company_actuals(&weeks, &period)
    }
}
