use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_work_areas_table::WorkAreas;
use super::m20240101_000003_create_employees_table::Employees;
use super::m20240101_000004_create_production_weeks_table::ProductionWeeks;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DailyEmployeeHours::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyEmployeeHours::DailyHourId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DailyEmployeeHours::EmployeeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DailyEmployeeHours::WorkAreaId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DailyEmployeeHours::ProductionWeekId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DailyEmployeeHours::WorkDate).date().not_null())
                    .col(
                        ColumnDef::new(DailyEmployeeHours::ForecastedHours)
                            .decimal_len(5, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyEmployeeHours::ActualHours)
                            .decimal_len(5, 2)
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_employee_hours_employee_id")
                            .from(DailyEmployeeHours::Table, DailyEmployeeHours::EmployeeId)
                            .to(Employees::Table, Employees::EmployeeId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_employee_hours_work_area_id")
                            .from(DailyEmployeeHours::Table, DailyEmployeeHours::WorkAreaId)
                            .to(WorkAreas::Table, WorkAreas::WorkAreaId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_employee_hours_production_week_id")
                            .from(
                                DailyEmployeeHours::Table,
                                DailyEmployeeHours::ProductionWeekId,
                            )
                            .to(ProductionWeeks::Table, ProductionWeeks::ProductionWeekId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_daily_employee_hours_entry")
                    .table(DailyEmployeeHours::Table)
                    .col(DailyEmployeeHours::EmployeeId)
                    .col(DailyEmployeeHours::WorkAreaId)
                    .col(DailyEmployeeHours::WorkDate)
                    .col(DailyEmployeeHours::ProductionWeekId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_daily_employee_hours_work_date")
                    .table(DailyEmployeeHours::Table)
                    .col(DailyEmployeeHours::WorkDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyEmployeeHours::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DailyEmployeeHours {
    Table,
    DailyHourId,
    EmployeeId,
    WorkAreaId,
    ProductionWeekId,
    WorkDate,
    ForecastedHours,
    ActualHours,
}
