use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A customer job moving through the cutting, edgebanding and box lines,
/// with its planned quantities.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub job_id: i64,
    #[sea_orm(unique)]
    pub job_tag: String,
    pub num_sheets: Option<i32>,
    pub num_mdf_doors: Option<i32>,
    pub linear_meters_edgebanding: Option<Decimal>,
    pub num_drawer_boxes: Option<i32>,
    pub boxes_mcp: Option<i32>,
    pub boxes_pvc: Option<i32>,
    pub boxes_paint: Option<i32>,
    pub boxes_stain: Option<i32>,
    pub boxes_natural: Option<i32>,
    pub boxes_glaze: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::daily_shift_summary::Entity")]
    DailyShiftSummaries,
    #[sea_orm(has_many = "super::finishing_work::Entity")]
    FinishingWork,
}

impl Related<super::daily_shift_summary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyShiftSummaries.def()
    }
}

impl Related<super::finishing_work::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinishingWork.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
