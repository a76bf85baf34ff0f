use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductionWeeks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductionWeeks::ProductionWeekId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    // The unique key serializes concurrent generation of the same week.
                    .col(
                        ColumnDef::new(ProductionWeeks::ReportingWeekStartDate)
                            .date()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ProductionWeeks::ReportingWeekEndDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProductionWeeks::ForecastedProductValue)
                            .decimal_len(12, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ProductionWeeks::ActualProductValue)
                            .decimal_len(12, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ProductionWeeks::ForecastedBoxesBuilt)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ProductionWeeks::ActualBoxesBuilt)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ProductionWeeks::ForecastedTotalProductionHours)
                            .decimal_len(10, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ProductionWeeks::ActualTotalProductionHours)
                            .decimal_len(10, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ProductionWeeks::ForecastedDollarsPerHour)
                            .decimal_len(10, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ProductionWeeks::ActualDollarsPerHour)
                            .decimal_len(10, 2)
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductionWeeks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ProductionWeeks {
    Table,
    ProductionWeekId,
    ReportingWeekStartDate,
    ReportingWeekEndDate,
    ForecastedProductValue,
    ActualProductValue,
    ForecastedBoxesBuilt,
    ActualBoxesBuilt,
    ForecastedTotalProductionHours,
    ActualTotalProductionHours,
    ForecastedDollarsPerHour,
    ActualDollarsPerHour,
}
