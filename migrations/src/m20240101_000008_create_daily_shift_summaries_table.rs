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
                    .table(DailyShiftSummaries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyShiftSummaries::SummaryId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DailyShiftSummaries::SummaryDate).date().not_null())
                    .col(
                        ColumnDef::new(DailyShiftSummaries::Department)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(DailyShiftSummaries::JobId).big_integer().null())
                    .col(
                        ColumnDef::new(DailyShiftSummaries::EmployeeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DailyShiftSummaries::Station).string_len(100).null())
                    .col(ColumnDef::new(DailyShiftSummaries::SheetsCutMtr).integer().null())
                    .col(ColumnDef::new(DailyShiftSummaries::SheetsCutCs43).integer().null())
                    .col(ColumnDef::new(DailyShiftSummaries::MdfDoorsCutMtr).integer().null())
                    .col(ColumnDef::new(DailyShiftSummaries::MdfDoorsCutCs43).integer().null())
                    .col(
                        ColumnDef::new(DailyShiftSummaries::EdgebandingRan)
                            .decimal_len(10, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(DailyShiftSummaries::EdgebandingChangeovers)
                            .integer()
                            .null(),
                    )
                    .col(ColumnDef::new(DailyShiftSummaries::ManualEdgebanding).integer().null())
                    .col(ColumnDef::new(DailyShiftSummaries::DrawerBoxesBuilt).integer().null())
                    .col(ColumnDef::new(DailyShiftSummaries::BoxesPrepped).integer().null())
                    .col(ColumnDef::new(DailyShiftSummaries::BoxesBuilt).integer().null())
                    .col(ColumnDef::new(DailyShiftSummaries::BoxesHung).integer().null())
                    .col(ColumnDef::new(DailyShiftSummaries::TeamLeader).string_len(100).null())
                    .col(ColumnDef::new(DailyShiftSummaries::Shift).string_len(50).null())
                    .col(ColumnDef::new(DailyShiftSummaries::Notes).text().null())
                    // Removing a job keeps its summaries and clears the link.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_shift_summaries_job_id")
                            .from(DailyShiftSummaries::Table, DailyShiftSummaries::JobId)
                            .to(Jobs::Table, Jobs::JobId)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_shift_summaries_employee_id")
                            .from(DailyShiftSummaries::Table, DailyShiftSummaries::EmployeeId)
                            .to(Employees::Table, Employees::EmployeeId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_daily_shift_summaries_summary_date")
                    .table(DailyShiftSummaries::Table)
                    .col(DailyShiftSummaries::SummaryDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyShiftSummaries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DailyShiftSummaries {
    Table,
    SummaryId,
    SummaryDate,
    Department,
    JobId,
    EmployeeId,
    Station,
    SheetsCutMtr,
    SheetsCutCs43,
    MdfDoorsCutMtr,
    MdfDoorsCutCs43,
    EdgebandingRan,
    EdgebandingChangeovers,
    ManualEdgebanding,
    DrawerBoxesBuilt,
    BoxesPrepped,
    BoxesBuilt,
    BoxesHung,
    TeamLeader,
    Shift,
    Notes,
}
