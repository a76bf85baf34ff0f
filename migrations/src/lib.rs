pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_work_areas_table;
mod m20240101_000002_create_positions_table;
mod m20240101_000003_create_employees_table;
mod m20240101_000004_create_production_weeks_table;
mod m20240101_000005_create_daily_employee_hours_table;
mod m20240101_000006_create_holidays_table;
mod m20240101_000007_create_jobs_table;
mod m20240101_000008_create_daily_shift_summaries_table;
mod m20240101_000009_create_finishing_work_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_work_areas_table::Migration),
            Box::new(m20240101_000002_create_positions_table::Migration),
            Box::new(m20240101_000003_create_employees_table::Migration),
            Box::new(m20240101_000004_create_production_weeks_table::Migration),
            Box::new(m20240101_000005_create_daily_employee_hours_table::Migration),
            Box::new(m20240101_000006_create_holidays_table::Migration),
            Box::new(m20240101_000007_create_jobs_table::Migration),
            Box::new(m20240101_000008_create_daily_shift_summaries_table::Migration),
            Box::new(m20240101_000009_create_finishing_work_table::Migration),
        ]
    }
}
