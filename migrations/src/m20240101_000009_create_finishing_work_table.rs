use sea_orm_migration::prelude::*;

use super::m20240101_000003_create_employees_table::Employees;
use super::m20240101_000007_create_jobs_table::Jobs;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FinishingWork::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FinishingWork::FinishingId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FinishingWork::JobId).big_integer().null())
                    .col(ColumnDef::new(FinishingWork::ManualPartName).string_len(100).null())
                    .col(ColumnDef::new(FinishingWork::FinishType).string_len(50).not_null())
                    .col(ColumnDef::new(FinishingWork::Stage).string_len(50).not_null())
                    .col(ColumnDef::new(FinishingWork::Status).string_len(50).null())
                    .col(ColumnDef::new(FinishingWork::StageCompletedDate).date().null())
                    .col(ColumnDef::new(FinishingWork::EmployeeId).big_integer().null())
                    .col(ColumnDef::new(FinishingWork::BatchNumber).string_len(50).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_finishing_work_job_id")
                            .from(FinishingWork::Table, FinishingWork::JobId)
                            .to(Jobs::Table, Jobs::JobId)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_finishing_work_employee_id")
                            .from(FinishingWork::Table, FinishingWork::EmployeeId)
                            .to(Employees::Table, Employees::EmployeeId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FinishingWork::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FinishingWork {
    Table,
    FinishingId,
    JobId,
    ManualPartName,
    FinishType,
    Stage,
    Status,
    StageCompletedDate,
    EmployeeId,
    BatchNumber,
}
