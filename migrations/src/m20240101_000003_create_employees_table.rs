use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_work_areas_table::WorkAreas;
use super::m20240101_000002_create_positions_table::Positions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Employees::EmployeeId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Employees::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Employees::LastInitial).string_len(5).not_null())
                    .col(ColumnDef::new(Employees::PositionId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Employees::PrimaryWorkAreaId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Employees::EmploymentStartDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Employees::EmploymentEndDate).date().null())
                    .col(
                        ColumnDef::new(Employees::DisplayOrder)
                            .integer()
                            .not_null()
                            .default(999_999),
                    )
                    // Deletions are refused at the service layer while rows still reference
                    // the position or work area, so the schema only restricts.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_position_id")
                            .from(Employees::Table, Employees::PositionId)
                            .to(Positions::Table, Positions::PositionId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_primary_work_area_id")
                            .from(Employees::Table, Employees::PrimaryWorkAreaId)
                            .to(WorkAreas::Table, WorkAreas::WorkAreaId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Employees {
    Table,
    EmployeeId,
    FirstName,
    LastInitial,
    PositionId,
    PrimaryWorkAreaId,
    EmploymentStartDate,
    EmploymentEndDate,
    DisplayOrder,
}
