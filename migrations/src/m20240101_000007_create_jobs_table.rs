use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Jobs::JobId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Jobs::JobTag)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Jobs::NumSheets).integer().null())
                    .col(ColumnDef::new(Jobs::NumMdfDoors).integer().null())
                    .col(
                        ColumnDef::new(Jobs::LinearMetersEdgebanding)
                            .decimal_len(10, 2)
                            .null(),
                    )
                    .col(ColumnDef::new(Jobs::NumDrawerBoxes).integer().null())
                    .col(ColumnDef::new(Jobs::BoxesMcp).integer().null())
                    .col(ColumnDef::new(Jobs::BoxesPvc).integer().null())
                    .col(ColumnDef::new(Jobs::BoxesPaint).integer().null())
                    .col(ColumnDef::new(Jobs::BoxesStain).integer().null())
                    .col(ColumnDef::new(Jobs::BoxesNatural).integer().null())
                    .col(ColumnDef::new(Jobs::BoxesGlaze).integer().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Jobs {
    Table,
    JobId,
    JobTag,
    NumSheets,
    NumMdfDoors,
    LinearMetersEdgebanding,
    NumDrawerBoxes,
    BoxesMcp,
    BoxesPvc,
    BoxesPaint,
    BoxesStain,
    BoxesNatural,
    BoxesGlaze,
}
