use chrono::NaiveDate;
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::NotSet, ActiveValue::Set, IntoActiveModel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use validator::{Validate, ValidationError};

use super::{deserialize_some, validate_non_negative_decimal};
use crate::{
    db::{run_in_transaction, DbPool},
    entities::{daily_shift_summary, finishing_work, job},
    errors::ServiceError,
    repositories::{JobRepository, RosterRepository},
};

fn negative_count(field: &'static str) -> ValidationError {
    let mut err = ValidationError::new("range");
    err.message = Some(format!("{} must not be negative", field).into());
    err
}

fn validate_job_update(update: &JobUpdate) -> Result<(), ValidationError> {
    let counts = [
        ("num_sheets", update.num_sheets),
        ("num_mdf_doors", update.num_mdf_doors),
        ("num_drawer_boxes", update.num_drawer_boxes),
        ("boxes_mcp", update.boxes_mcp),
        ("boxes_pvc", update.boxes_pvc),
        ("boxes_paint", update.boxes_paint),
        ("boxes_stain", update.boxes_stain),
        ("boxes_natural", update.boxes_natural),
        ("boxes_glaze", update.boxes_glaze),
    ];
    for (field, value) in counts {
        if matches!(value, Some(Some(count)) if count < 0) {
            return Err(negative_count(field));
        }
    }
    if matches!(update.linear_meters_edgebanding, Some(Some(meters)) if meters < Decimal::ZERO) {
        return Err(negative_count("linear_meters_edgebanding"));
    }
    Ok(())
}

fn validate_finishing_subject(input: &NewFinishingWork) -> Result<(), ValidationError> {
    let named = input
        .manual_part_name
        .as_deref()
        .is_some_and(|name| !name.trim().is_empty());
    if input.job_id.is_none() && !named {
        let mut err = ValidationError::new("job_id");
        err.message = Some("Finishing work needs a job or a manual part name".into());
        return Err(err);
    }
    Ok(())
}

fn validate_stage_update(update: &FinishingStageUpdate) -> Result<(), ValidationError> {
    if let Some(Some(status)) = &update.status {
        if status.chars().count() > 50 {
            let mut err = ValidationError::new("length");
            err.message = Some("status must be at most 50 characters".into());
            return Err(err);
        }
    }
    Ok(())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewJob {
    #[validate(length(min = 1, max = 100))]
    pub job_tag: String,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub num_sheets: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub num_mdf_doors: Option<i32>,
    #[serde(default)]
    #[validate(custom = "validate_non_negative_decimal")]
    pub linear_meters_edgebanding: Option<Decimal>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub num_drawer_boxes: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub boxes_mcp: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub boxes_pvc: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub boxes_paint: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub boxes_stain: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub boxes_natural: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub boxes_glaze: Option<i32>,
}

/// Absent fields are left alone; an explicit `null` clears a quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_job_update"))]
pub struct JobUpdate {
    #[validate(length(min = 1, max = 100))]
    pub job_tag: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub num_sheets: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub num_mdf_doors: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub linear_meters_edgebanding: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub num_drawer_boxes: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub boxes_mcp: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub boxes_pvc: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub boxes_paint: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub boxes_stain: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub boxes_natural: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub boxes_glaze: Option<Option<i32>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewShiftSummary {
    pub summary_date: NaiveDate,
    #[validate(length(min = 1, max = 100))]
    pub department: String,
    #[serde(default)]
    pub job_id: Option<i64>,
    pub employee_id: i64,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub station: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub sheets_cut_mtr: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub sheets_cut_cs43: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub mdf_doors_cut_mtr: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub mdf_doors_cut_cs43: Option<i32>,
    #[serde(default)]
    #[validate(custom = "validate_non_negative_decimal")]
    pub edgebanding_ran: Option<Decimal>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub edgebanding_changeovers: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub manual_edgebanding: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub drawer_boxes_built: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub boxes_prepped: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub boxes_built: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub boxes_hung: Option<i32>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub team_leader: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub shift: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_finishing_subject"))]
pub struct NewFinishingWork {
    #[serde(default)]
    pub job_id: Option<i64>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub manual_part_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub finish_type: String,
    #[validate(length(min = 1, max = 50))]
    pub stage: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub status: Option<String>,
    #[serde(default)]
    pub stage_completed_date: Option<NaiveDate>,
    #[serde(default)]
    pub employee_id: Option<i64>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub batch_number: Option<String>,
}

/// Moves a finishing record along. `Some(None)` clears a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_stage_update"))]
pub struct FinishingStageUpdate {
    #[validate(length(min = 1, max = 50))]
    pub stage: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub stage_completed_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub employee_id: Option<Option<i64>>,
}

/// A shift summary with the job tag and employee name resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftSummaryDetail {
    #[serde(flatten)]
    pub summary: daily_shift_summary::Model,
    pub job_tag: Option<String>,
    pub employee_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinishingWorkDetail {
    #[serde(flatten)]
    pub work: finishing_work::Model,
    pub job_tag: Option<String>,
    pub employee_name: Option<String>,
}

/// Jobs, daily shift summaries and finishing work
#[derive(Clone)]
pub struct JobService {
    db: Arc<DbPool>,
}

impl JobService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    async fn employee_names(&self) -> Result<HashMap<i64, String>, ServiceError> {
        Ok(RosterRepository::list_employees(&*self.db)
            .await?
            .into_iter()
            .map(|employee| (employee.employee_id, employee.display_name()))
            .collect())
    }

    // Jobs

    pub async fn list_jobs(&self) -> Result<Vec<job::Model>, ServiceError> {
        JobRepository::list_jobs(&*self.db).await
    }

    pub async fn get_job(&self, id: i64) -> Result<job::Model, ServiceError> {
        JobRepository::require_job(&*self.db, id).await
    }

    #[instrument(skip(self))]
    pub async fn create_job(&self, input: NewJob) -> Result<job::Model, ServiceError> {
        input.validate()?;
        let tag = input.job_tag.trim().to_string();
        let created = JobRepository::insert_job(
            &*self.db,
            job::ActiveModel {
                job_id: NotSet,
                job_tag: Set(tag.clone()),
                num_sheets: Set(input.num_sheets),
                num_mdf_doors: Set(input.num_mdf_doors),
                linear_meters_edgebanding: Set(input.linear_meters_edgebanding),
                num_drawer_boxes: Set(input.num_drawer_boxes),
                boxes_mcp: Set(input.boxes_mcp),
                boxes_pvc: Set(input.boxes_pvc),
                boxes_paint: Set(input.boxes_paint),
                boxes_stain: Set(input.boxes_stain),
                boxes_natural: Set(input.boxes_natural),
                boxes_glaze: Set(input.boxes_glaze),
            },
            &tag,
        )
        .await?;

        counter!("shopfloor.jobs.created", 1);
        info!(job_id = created.job_id, job_tag = %created.job_tag, "Job created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update_job(&self, id: i64, update: JobUpdate) -> Result<job::Model, ServiceError> {
        update.validate()?;
        let db = &*self.db;
        let mut active = JobRepository::require_job(db, id).await?.into_active_model();

        if let Some(tag) = update.job_tag {
            active.job_tag = Set(tag.trim().to_string());
        }
        if let Some(value) = update.num_sheets {
            active.num_sheets = Set(value);
        }
        if let Some(value) = update.num_mdf_doors {
            active.num_mdf_doors = Set(value);
        }
        if let Some(value) = update.linear_meters_edgebanding {
            active.linear_meters_edgebanding = Set(value);
        }
        if let Some(value) = update.num_drawer_boxes {
            active.num_drawer_boxes = Set(value);
        }
        if let Some(value) = update.boxes_mcp {
            active.boxes_mcp = Set(value);
        }
        if let Some(value) = update.boxes_pvc {
            active.boxes_pvc = Set(value);
        }
        if let Some(value) = update.boxes_paint {
            active.boxes_paint = Set(value);
        }
        if let Some(value) = update.boxes_stain {
            active.boxes_stain = Set(value);
        }
        if let Some(value) = update.boxes_natural {
            active.boxes_natural = Set(value);
        }
        if let Some(value) = update.boxes_glaze {
            active.boxes_glaze = Set(value);
        }
        JobRepository::update_job(db, active).await
    }

    /// Summaries and finishing records keep their rows and lose the link.
    #[instrument(skip(self))]
    pub async fn delete_job(&self, id: i64) -> Result<(), ServiceError> {
        let detached = run_in_transaction(&self.db, "delete_job", move |txn| {
            Box::pin(async move {
                JobRepository::require_job(txn, id).await?;
                let detached = JobRepository::detach_job(txn, id).await?;
                JobRepository::delete_job(txn, id).await?;
                Ok(detached)
            })
        })
        .await?;

        counter!("shopfloor.jobs.deleted", 1);
        info!(job_id = id, detached, "Job deleted");
        Ok(())
    }

    // Shift summaries

    #[instrument(skip(self, input), fields(employee_id = input.employee_id))]
    pub async fn record_shift_summary(
        &self,
        input: NewShiftSummary,
    ) -> Result<daily_shift_summary::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db;
        RosterRepository::require_employee(db, input.employee_id).await?;
        if let Some(job_id) = input.job_id {
            JobRepository::require_job(db, job_id).await?;
        }

        let created = JobRepository::insert_shift_summary(
            db,
            daily_shift_summary::ActiveModel {
                summary_id: NotSet,
                summary_date: Set(input.summary_date),
                department: Set(input.department.trim().to_string()),
                job_id: Set(input.job_id),
                employee_id: Set(input.employee_id),
                station: Set(trimmed(input.station)),
                sheets_cut_mtr: Set(input.sheets_cut_mtr),
                sheets_cut_cs43: Set(input.sheets_cut_cs43),
                mdf_doors_cut_mtr: Set(input.mdf_doors_cut_mtr),
                mdf_doors_cut_cs43: Set(input.mdf_doors_cut_cs43),
                edgebanding_ran: Set(input.edgebanding_ran),
                edgebanding_changeovers: Set(input.edgebanding_changeovers),
                manual_edgebanding: Set(input.manual_edgebanding),
                drawer_boxes_built: Set(input.drawer_boxes_built),
                boxes_prepped: Set(input.boxes_prepped),
                boxes_built: Set(input.boxes_built),
                boxes_hung: Set(input.boxes_hung),
                team_leader: Set(trimmed(input.team_leader)),
                shift: Set(trimmed(input.shift)),
                notes: Set(input.notes),
            },
        )
        .await?;

        counter!("shopfloor.jobs.shift_summaries", 1);
        info!(
            summary_id = created.summary_id,
            summary_date = %created.summary_date,
            department = %created.department,
            "Shift summary recorded"
        );
        Ok(created)
    }

    /// Summaries dated in `from..=to`, or all of them.
    pub async fn list_shift_summaries(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<ShiftSummaryDetail>, ServiceError> {
        let db = &*self.db;
        let summaries = JobRepository::list_shift_summaries(db, range).await?;
        let tags = JobRepository::job_tags_by_id(db).await?;
        let names = self.employee_names().await?;
        Ok(summaries
            .into_iter()
            .map(|summary| ShiftSummaryDetail {
                job_tag: summary.job_id.and_then(|id| tags.get(&id).cloned()),
                employee_name: names.get(&summary.employee_id).cloned(),
                summary,
            })
            .collect())
    }

    // Finishing work

    pub async fn list_finishing_work(&self) -> Result<Vec<FinishingWorkDetail>, ServiceError> {
        let db = &*self.db;
        let items = JobRepository::list_finishing_work(db).await?;
        let tags = JobRepository::job_tags_by_id(db).await?;
        let names = self.employee_names().await?;
        Ok(items
            .into_iter()
            .map(|work| FinishingWorkDetail {
                job_tag: work.job_id.and_then(|id| tags.get(&id).cloned()),
                employee_name: work.employee_id.and_then(|id| names.get(&id).cloned()),
                work,
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn create_finishing_work(
        &self,
        input: NewFinishingWork,
    ) -> Result<finishing_work::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db;
        if let Some(job_id) = input.job_id {
            JobRepository::require_job(db, job_id).await?;
        }
        if let Some(employee_id) = input.employee_id {
            RosterRepository::require_employee(db, employee_id).await?;
        }

        let created = JobRepository::insert_finishing_work(
            db,
            finishing_work::ActiveModel {
                finishing_id: NotSet,
                job_id: Set(input.job_id),
                manual_part_name: Set(trimmed(input.manual_part_name)),
                finish_type: Set(input.finish_type.trim().to_string()),
                stage: Set(input.stage.trim().to_string()),
                status: Set(trimmed(input.status)),
                stage_completed_date: Set(input.stage_completed_date),
                employee_id: Set(input.employee_id),
                batch_number: Set(trimmed(input.batch_number)),
            },
        )
        .await?;

        counter!("shopfloor.jobs.finishing_created", 1);
        info!(finishing_id = created.finishing_id, stage = %created.stage, "Finishing work created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update_finishing_stage(
        &self,
        id: i64,
        update: FinishingStageUpdate,
    ) -> Result<finishing_work::Model, ServiceError> {
        update.validate()?;
        let db = &*self.db;
        let existing = JobRepository::require_finishing_work(db, id).await?;
        if let Some(Some(employee_id)) = update.employee_id {
            RosterRepository::require_employee(db, employee_id).await?;
        }

        let mut active = existing.into_active_model();
        if let Some(stage) = update.stage {
            active.stage = Set(stage.trim().to_string());
        }
        if let Some(status) = update.status {
            active.status = Set(trimmed(status));
        }
        if let Some(date) = update.stage_completed_date {
            active.stage_completed_date = Set(date);
        }
        if let Some(employee_id) = update.employee_id {
            active.employee_id = Set(employee_id);
        }
        let updated = JobRepository::update_finishing_work(db, active).await?;
        info!(finishing_id = id, stage = %updated.stage, "Finishing stage updated");
        Ok(updated)
    }
}
