use std::sync::Arc;

use crate::{
    db::DbPool,
    notifications::NotificationSink,
    services::{
        forecast::ForecastService,
        holidays::HolidayService,
        jobs::JobService,
        production_weeks::ProductionWeekService,
        reconciliation::{ManualEntryForecastPolicy, ReconciliationService},
        reports::ReportService,
        roster::RosterService,
    },
};

/// Factory for creating service instances with shared dependencies
pub struct ServiceFactory {
    db_pool: Arc<DbPool>,
    notifier: Arc<dyn NotificationSink>,
    manual_entry_policy: ManualEntryForecastPolicy,
}

impl ServiceFactory {
    /// Creates a new service factory with the given dependencies
    pub fn new(db_pool: Arc<DbPool>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            db_pool,
            notifier,
            manual_entry_policy: ManualEntryForecastPolicy::default(),
        }
    }

    pub fn with_manual_entry_policy(mut self, policy: ManualEntryForecastPolicy) -> Self {
        self.manual_entry_policy = policy;
        self
    }

    pub fn forecast_service(&self) -> ForecastService {
        ForecastService::new(self.db_pool.clone())
    }

    pub fn reconciliation_service(&self) -> ReconciliationService {
        ReconciliationService::new(self.db_pool.clone(), self.notifier.clone())
            .with_manual_entry_policy(self.manual_entry_policy.clone())
    }

    pub fn production_week_service(&self) -> ProductionWeekService {
        ProductionWeekService::new(self.db_pool.clone())
    }

    pub fn report_service(&self) -> ReportService {
        ReportService::new(self.db_pool.clone())
    }

    pub fn roster_service(&self) -> RosterService {
        RosterService::new(self.db_pool.clone())
    }

    pub fn holiday_service(&self) -> HolidayService {
        HolidayService::new(self.db_pool.clone())
    }

    pub fn job_service(&self) -> JobService {
        JobService::new(self.db_pool.clone())
    }

    /// Gets a reference to the database pool
    pub fn db_pool(&self) -> &Arc<DbPool> {
        &self.db_pool
    }
}

/// Service container holding all service instances
#[derive(Clone)]
pub struct ServiceContainer {
    pub forecast: Arc<ForecastService>,
    pub reconciliation: Arc<ReconciliationService>,
    pub production_weeks: Arc<ProductionWeekService>,
    pub reports: Arc<ReportService>,
    pub roster: Arc<RosterService>,
    pub holidays: Arc<HolidayService>,
    pub jobs: Arc<JobService>,
}

impl ServiceContainer {
    /// Creates a new service container with all services initialized
    pub fn new(factory: &ServiceFactory) -> Self {
        Self {
            forecast: Arc::new(factory.forecast_service()),
            reconciliation: Arc::new(factory.reconciliation_service()),
            production_weeks: Arc::new(factory.production_week_service()),
            reports: Arc::new(factory.report_service()),
            roster: Arc::new(factory.roster_service()),
            holidays: Arc::new(factory.holiday_service()),
            jobs: Arc::new(factory.job_service()),
        }
    }
}
