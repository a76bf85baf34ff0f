use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What one employee produced at a station during one shift.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_shift_summaries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub summary_id: i64,
    pub summary_date: NaiveDate,
    pub department: String,
    pub job_id: Option<i64>,
    pub employee_id: i64,
    pub station: Option<String>,
    pub sheets_cut_mtr: Option<i32>,
    pub sheets_cut_cs43: Option<i32>,
    pub mdf_doors_cut_mtr: Option<i32>,
    pub mdf_doors_cut_cs43: Option<i32>,
    pub edgebanding_ran: Option<Decimal>,
    pub edgebanding_changeovers: Option<i32>,
    pub manual_edgebanding: Option<i32>,
    pub drawer_boxes_built: Option<i32>,
    pub boxes_prepped: Option<i32>,
    pub boxes_built: Option<i32>,
    pub boxes_hung: Option<i32>,
    pub team_leader: Option<String>,
    pub shift: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::job::Entity",
        from = "Column::JobId",
        to = "super::job::Column::JobId"
    )]
    Job,
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::EmployeeId"
    )]
    Employee,
}

impl Related<super::job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Job.def()
    }
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
