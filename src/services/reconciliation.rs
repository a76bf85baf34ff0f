use chrono::NaiveDate;
use metrics::counter;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveValue::Set, ConnectionTrait, IntoActiveModel, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::{
    db::{run_in_transaction, DbPool},
    entities::{position, production_week},
    errors::ServiceError,
    notifications::{spawn_dispatch, NotificationSink, WeekUpdateNotice},
    reports::variance::{dollars_per_hour, round2},
    repositories::{
        production_week_repository::DailyHoursKey, ProductionWeekRepository, RosterRepository,
    },
    scheduling::is_weekday,
};

/// One recorded-hours cell submitted from the entry sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyHoursEntry {
    #[serde(default)]
    pub daily_hour_id: Option<i64>,
    pub employee_id: i64,
    pub work_date: NaiveDate,
    pub work_area_id: i64,
    #[serde(default)]
    pub production_week_id: Option<i64>,
    #[serde(default)]
    pub actual_hours: Option<Decimal>,
}

/// A forecast correction, addressed by id or by its natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    #[serde(default)]
    pub daily_hour_id: Option<i64>,
    pub forecasted_hours: Decimal,
    #[serde(default)]
    pub employee_id: Option<i64>,
    #[serde(default)]
    pub work_date: Option<NaiveDate>,
    #[serde(default)]
    pub work_area_id: Option<i64>,
    #[serde(default)]
    pub production_week_id: Option<i64>,
}

impl ForecastEntry {
    fn key(&self) -> Option<DailyHoursKey> {
        Some(DailyHoursKey {
            employee_id: self.employee_id?,
            work_area_id: self.work_area_id?,
            work_date: self.work_date?,
            production_week_id: self.production_week_id?,
        })
    }
}

/// How the forecast of a day added by hand (no generated row) is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ManualEntryForecastPolicy {
    /// The position's default hours on weekdays, nothing on weekends.
    #[default]
    PositionDefault,
    /// Fixed hours keyed on the position title, nothing on weekends.
    Fixed {
        team_leader_title: String,
        team_leader_hours: Decimal,
        standard_hours: Decimal,
    },
}

impl ManualEntryForecastPolicy {
    /// 7.75 hours for team leaders and 7.5 for everyone else.
    pub fn legacy_fixed() -> Self {
        ManualEntryForecastPolicy::Fixed {
            team_leader_title: "Team Leader".to_string(),
            team_leader_hours: dec!(7.75),
            standard_hours: dec!(7.5),
        }
    }

    pub fn forecast_for(&self, work_date: NaiveDate, position: Option<&position::Model>) -> Decimal {
        if !is_weekday(work_date) {
            return Decimal::ZERO;
        }
        match self {
            ManualEntryForecastPolicy::PositionDefault => {
                position.map_or(Decimal::ZERO, |p| p.default_hours)
            }
            ManualEntryForecastPolicy::Fixed {
                team_leader_title,
                team_leader_hours,
                standard_hours,
            } => match position {
                Some(p) if &p.title == team_leader_title => *team_leader_hours,
                _ => *standard_hours,
            },
        }
    }
}

/// What a daily-hours batch changed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchUpdateOutcome {
    pub updated: usize,
    pub created: usize,
    /// Ids that no longer exist.
    pub skipped_ids: Vec<i64>,
    /// Affected weeks after re-aggregation, oldest id first.
    pub weeks: Vec<production_week::Model>,
}

/// Records actual hours and keeps week aggregates in step with them
#[derive(Clone)]
pub struct ReconciliationService {
    db: Arc<DbPool>,
    notifier: Arc<dyn NotificationSink>,
    manual_entry_policy: ManualEntryForecastPolicy,
}

impl ReconciliationService {
    pub fn new(db: Arc<DbPool>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            db,
            notifier,
            manual_entry_policy: ManualEntryForecastPolicy::default(),
        }
    }

    pub fn with_manual_entry_policy(mut self, policy: ManualEntryForecastPolicy) -> Self {
        self.manual_entry_policy = policy;
        self
    }

    /// Applies a batch of recorded hours, then recomputes the actual totals
    /// of every touched week. The batch is all-or-nothing; one notice per
    /// touched week is sent after commit.
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn apply_daily_update(
        &self,
        actor: &str,
        entries: Vec<DailyHoursEntry>,
    ) -> Result<BatchUpdateOutcome, ServiceError> {
        for entry in &entries {
            validate_daily_entry(entry)?;
        }

        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;
        let mut outcome = BatchUpdateOutcome::default();
        let mut affected: BTreeSet<i64> = BTreeSet::new();

        for entry in &entries {
            match entry.daily_hour_id {
                Some(id) => {
                    let Some(row) = ProductionWeekRepository::find_daily_hours(&txn, id).await?
                    else {
                        warn!(daily_hour_id = id, "Daily hours row not found, skipping update");
                        outcome.skipped_ids.push(id);
                        continue;
                    };
                    if row.work_area_id != entry.work_area_id {
                        RosterRepository::require_work_area(&txn, entry.work_area_id).await?;
                    }
                    affected.insert(row.production_week_id);
                    let mut active = row.into_active_model();
                    active.actual_hours = Set(entry.actual_hours);
                    active.work_area_id = Set(entry.work_area_id);
                    ProductionWeekRepository::update_daily_hours(&txn, active).await?;
                    outcome.updated += 1;
                }
                None => {
                    let week_id = entry.production_week_id.ok_or_else(|| {
                        ServiceError::InternalError(
                            "new daily hours entry passed validation without a week".into(),
                        )
                    })?;
                    let employee = RosterRepository::require_employee(&txn, entry.employee_id).await?;
                    RosterRepository::require_work_area(&txn, entry.work_area_id).await?;
                    ProductionWeekRepository::require(&txn, week_id).await?;
                    let position = RosterRepository::position_for(&txn, &employee).await?;
                    let forecast = self
                        .manual_entry_policy
                        .forecast_for(entry.work_date, position.as_ref());

                    let key = DailyHoursKey {
                        employee_id: entry.employee_id,
                        work_area_id: entry.work_area_id,
                        work_date: entry.work_date,
                        production_week_id: week_id,
                    };
                    ProductionWeekRepository::insert_daily_hours(
                        &txn,
                        key,
                        forecast,
                        entry.actual_hours,
                    )
                    .await?;
                    affected.insert(week_id);
                    outcome.created += 1;
                }
            }
        }

        for week_id in &affected {
            outcome.weeks.push(recompute_actuals(&txn, *week_id).await?);
        }

        txn.commit().await.map_err(ServiceError::db_error)?;

        counter!("shopfloor.reconciliation.batches", 1);
        counter!("shopfloor.reconciliation.rows_updated", outcome.updated as u64);
        counter!("shopfloor.reconciliation.rows_created", outcome.created as u64);
        info!(
            actor,
            updated = outcome.updated,
            created = outcome.created,
            skipped = outcome.skipped_ids.len(),
            weeks = outcome.weeks.len(),
            "Daily hours batch applied"
        );

        let notices = outcome
            .weeks
            .iter()
            .map(|week| {
                WeekUpdateNotice::new(
                    actor,
                    week.production_week_id,
                    week.reporting_week_start_date,
                )
            })
            .collect();
        spawn_dispatch(Arc::clone(&self.notifier), notices);

        Ok(outcome)
    }

    /// Corrects forecast hours and recomputes the forecast totals of every
    /// touched week. Returns the touched week ids.
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn apply_forecast_update(
        &self,
        entries: Vec<ForecastEntry>,
    ) -> Result<Vec<i64>, ServiceError> {
        for entry in &entries {
            if entry.forecasted_hours < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Forecasted hours must not be negative (got {})",
                    entry.forecasted_hours
                )));
            }
        }

        let affected = run_in_transaction(&self.db, "apply_forecast_update", move |txn| {
            Box::pin(async move {
                let mut affected: BTreeSet<i64> = BTreeSet::new();

                for entry in &entries {
                    if let Some(id) = entry.daily_hour_id {
                        let Some(row) = ProductionWeekRepository::find_daily_hours(txn, id).await?
                        else {
                            warn!(daily_hour_id = id, "Daily hours row not found, skipping forecast update");
                            continue;
                        };
                        affected.insert(row.production_week_id);
                        let mut active = row.into_active_model();
                        active.forecasted_hours = Set(entry.forecasted_hours);
                        ProductionWeekRepository::update_daily_hours(txn, active).await?;
                        continue;
                    }

                    let Some(key) = entry.key() else {
                        warn!(?entry, "Forecast entry has neither an id nor a complete key, skipping");
                        continue;
                    };
                    match ProductionWeekRepository::find_daily_hours_by_key(txn, key).await? {
                        Some(row) => {
                            let mut active = row.into_active_model();
                            active.forecasted_hours = Set(entry.forecasted_hours);
                            ProductionWeekRepository::update_daily_hours(txn, active).await?;
                        }
                        None => {
                            ProductionWeekRepository::require(txn, key.production_week_id).await?;
                            RosterRepository::require_employee(txn, key.employee_id).await?;
                            RosterRepository::require_work_area(txn, key.work_area_id).await?;
                            ProductionWeekRepository::insert_daily_hours(
                                txn,
                                key,
                                entry.forecasted_hours,
                                None,
                            )
                            .await?;
                        }
                    }
                    affected.insert(key.production_week_id);
                }

                for week_id in &affected {
                    recompute_forecasts(txn, *week_id).await?;
                }
                Ok(affected.into_iter().collect::<Vec<_>>())
            })
        })
        .await?;

        counter!("shopfloor.reconciliation.forecast_batches", 1);
        info!(weeks = ?affected, "Forecast hours updated");
        Ok(affected)
    }
}

fn validate_daily_entry(entry: &DailyHoursEntry) -> Result<(), ServiceError> {
    if entry.production_week_id.is_none() {
        return Err(ServiceError::ValidationError(format!(
            "Cannot save hours for employee {} on {}: no production week given; create the week first",
            entry.employee_id, entry.work_date
        )));
    }
    if let Some(hours) = entry.actual_hours {
        if hours < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Actual hours must not be negative (employee {}, {}: {})",
                entry.employee_id, entry.work_date, hours
            )));
        }
    }
    Ok(())
}

/// Sets the actual total to the rounded sum of recorded hours (0 when none)
/// and derives the actual dollars per hour from it.
pub async fn recompute_actuals<C: ConnectionTrait>(
    conn: &C,
    production_week_id: i64,
) -> Result<production_week::Model, ServiceError> {
    let week = ProductionWeekRepository::require(conn, production_week_id).await?;
    let sums = ProductionWeekRepository::week_hour_sums(conn, production_week_id).await?;
    let total = round2(sums.actual.unwrap_or_default());
    let dph = dollars_per_hour(week.actual_product_value, Some(total));
    debug!(production_week_id, actual_total = %total, "Recomputed week actuals");

    let mut active = week.into_active_model();
    active.actual_total_production_hours = Set(Some(total));
    active.actual_dollars_per_hour = Set(dph);
    ProductionWeekRepository::update(conn, active).await
}

/// Forecast-side counterpart of [`recompute_actuals`].
pub async fn recompute_forecasts<C: ConnectionTrait>(
    conn: &C,
    production_week_id: i64,
) -> Result<production_week::Model, ServiceError> {
    let week = ProductionWeekRepository::require(conn, production_week_id).await?;
    let sums = ProductionWeekRepository::week_hour_sums(conn, production_week_id).await?;
    let total = round2(sums.forecasted.unwrap_or_default());
    let dph = dollars_per_hour(week.forecasted_product_value, Some(total));
    debug!(production_week_id, forecasted_total = %total, "Recomputed week forecasts");

    let mut active = week.into_active_model();
    active.forecasted_total_production_hours = Set(Some(total));
    active.forecasted_dollars_per_hour = Set(dph);
    ProductionWeekRepository::update(conn, active).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use test_case::test_case;

    fn position(title: &str, hours: Decimal) -> position::Model {
        position::Model {
            position_id: 1,
            title: title.into(),
            default_hours: hours,
            display_order: 1,
        }
    }

    fn d(day: u32) -> NaiveDate {
        // 2024-01-08 is a Monday.
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test_case(d(8), dec!(6.5) ; "weekday uses position default")]
    #[test_case(d(13), dec!(0) ; "saturday")]
    #[test_case(d(14), dec!(0) ; "sunday")]
    fn position_default_policy(date: NaiveDate, expected: Decimal) {
        let p = position("Operator", dec!(6.5));
        assert_eq!(
            ManualEntryForecastPolicy::PositionDefault.forecast_for(date, Some(&p)),
            expected
        );
    }

    #[test]
    fn position_default_without_position_is_zero() {
        assert_eq!(
            ManualEntryForecastPolicy::PositionDefault.forecast_for(d(8), None),
            Decimal::ZERO
        );
    }

    #[test]
    fn legacy_fixed_policy_keys_on_title() {
        let policy = ManualEntryForecastPolicy::legacy_fixed();
        let leader = position("Team Leader", dec!(9));
        let operator = position("Operator", dec!(9));
        assert_eq!(policy.forecast_for(d(9), Some(&leader)), dec!(7.75));
        assert_eq!(policy.forecast_for(d(9), Some(&operator)), dec!(7.5));
        assert_eq!(policy.forecast_for(d(9), None), dec!(7.5));
        assert_eq!(policy.forecast_for(d(13), Some(&leader)), dec!(0));
    }

    fn entry(week: Option<i64>, actual: Option<Decimal>) -> DailyHoursEntry {
        DailyHoursEntry {
            daily_hour_id: None,
            employee_id: 1,
            work_date: d(8),
            work_area_id: 1,
            production_week_id: week,
            actual_hours: actual,
        }
    }

    #[test]
    fn entries_need_a_week_and_non_negative_hours() {
        assert!(validate_daily_entry(&entry(Some(1), Some(dec!(8)))).is_ok());
        assert!(validate_daily_entry(&entry(Some(1), None)).is_ok());
        assert_matches!(
            validate_daily_entry(&entry(None, Some(dec!(8)))),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            validate_daily_entry(&entry(Some(1), Some(dec!(-1)))),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn forecast_entry_key_needs_every_part() {
        let mut e = ForecastEntry {
            daily_hour_id: None,
            forecasted_hours: dec!(4),
            employee_id: Some(1),
            work_date: Some(d(8)),
            work_area_id: Some(2),
            production_week_id: Some(3),
        };
        assert_eq!(e.key().map(|k| k.production_week_id), Some(3));
        e.work_area_id = None;
        assert!(e.key().is_none());
    }
}
