use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub employee_id: i64,
    pub first_name: String,
    pub last_initial: String,
    pub position_id: i64,
    pub primary_work_area_id: i64,
    pub employment_start_date: NaiveDate,
    pub employment_end_date: Option<NaiveDate>,
    pub display_order: i32,
}

impl Model {
    /// Name as printed on reports, e.g. "Dana K".
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_initial)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::position::Entity",
        from = "Column::PositionId",
        to = "super::position::Column::PositionId"
    )]
    Position,
    #[sea_orm(
        belongs_to = "super::work_area::Entity",
        from = "Column::PrimaryWorkAreaId",
        to = "super::work_area::Column::WorkAreaId"
    )]
    PrimaryWorkArea,
    #[sea_orm(has_many = "super::daily_employee_hours::Entity")]
    DailyEmployeeHours,
}

impl Related<super::position::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Position.def()
    }
}

impl Related<super::work_area::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PrimaryWorkArea.def()
    }
}

impl Related<super::daily_employee_hours::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyEmployeeHours.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
