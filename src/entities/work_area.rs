use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A production zone whose daily hours roll into a reporting week through a
/// shifted contribution window.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_areas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub work_area_id: i64,
    #[sea_orm(unique)]
    pub work_area_name: String,
    /// Signed shift of the contribution window relative to the Monday anchor.
    pub reporting_week_start_offset_days: i32,
    /// Always at least one day.
    pub contributing_duration_days: i32,
    pub display_order: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::employee::Entity")]
    Employees,
    #[sea_orm(has_many = "super::daily_employee_hours::Entity")]
    DailyEmployeeHours,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl Related<super::daily_employee_hours::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyEmployeeHours.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
