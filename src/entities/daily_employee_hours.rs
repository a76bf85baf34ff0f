use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Forecast and actual hours for one employee on one date in one work area,
/// owned by a production week. Unique per
/// (employee_id, work_area_id, work_date, production_week_id).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_employee_hours")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub daily_hour_id: i64,
    pub employee_id: i64,
    pub work_area_id: i64,
    pub production_week_id: i64,
    pub work_date: NaiveDate,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub forecasted_hours: Decimal,
    /// Null until recorded.
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub actual_hours: Option<Decimal>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::EmployeeId"
    )]
    Employee,
    #[sea_orm(
        belongs_to = "super::work_area::Entity",
        from = "Column::WorkAreaId",
        to = "super::work_area::Column::WorkAreaId"
    )]
    WorkArea,
    #[sea_orm(
        belongs_to = "super::production_week::Entity",
        from = "Column::ProductionWeekId",
        to = "super::production_week::Column::ProductionWeekId",
        on_delete = "Cascade"
    )]
    ProductionWeek,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::work_area::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkArea.def()
    }
}

impl Related<super::production_week::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductionWeek.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
