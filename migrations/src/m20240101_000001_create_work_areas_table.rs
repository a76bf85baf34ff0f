use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WorkAreas::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkAreas::WorkAreaId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WorkAreas::WorkAreaName)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(WorkAreas::ReportingWeekStartOffsetDays)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(WorkAreas::ContributingDurationDays)
                            .integer()
                            .not_null()
                            .default(7),
                    )
                    .col(ColumnDef::new(WorkAreas::DisplayOrder).integer().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WorkAreas::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum WorkAreas {
    Table,
    WorkAreaId,
    WorkAreaName,
    ReportingWeekStartOffsetDays,
    ContributingDurationDays,
    DisplayOrder,
}
