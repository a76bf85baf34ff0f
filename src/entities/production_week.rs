use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The overall production week: one row per Monday anchor, carrying the
/// weekly targets and the aggregates derived from its daily hours.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "production_weeks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub production_week_id: i64,
    #[sea_orm(unique)]
    pub reporting_week_start_date: NaiveDate,
    pub reporting_week_end_date: NaiveDate,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub forecasted_product_value: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub actual_product_value: Option<Decimal>,
    pub forecasted_boxes_built: Option<i32>,
    pub actual_boxes_built: Option<i32>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub forecasted_total_production_hours: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub actual_total_production_hours: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub forecasted_dollars_per_hour: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub actual_dollars_per_hour: Option<Decimal>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::daily_employee_hours::Entity")]
    DailyEmployeeHours,
}

impl Related<super::daily_employee_hours::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyEmployeeHours.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
