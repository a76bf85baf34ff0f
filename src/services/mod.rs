// Forecast generation and reconciliation
pub mod forecast;
pub mod reconciliation;

// Week lifecycle and reporting
pub mod production_weeks;
pub mod reports;

// Master data
pub mod holidays;
pub mod roster;

// Jobs and shop output
pub mod jobs;

// Service factory for dependency injection
pub mod factory;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use validator::ValidationError;

pub use factory::{ServiceContainer, ServiceFactory};
pub use forecast::ForecastService;
pub use holidays::HolidayService;
pub use jobs::JobService;
pub use production_weeks::ProductionWeekService;
pub use reconciliation::ReconciliationService;
pub use reports::ReportService;
pub use roster::RosterService;

fn validate_non_negative_decimal(value: &Decimal) -> Result<(), ValidationError> {
    if *value >= Decimal::ZERO {
        Ok(())
    } else {
        let mut err = ValidationError::new("range");
        err.message = Some("Value must not be negative".into());
        Err(err)
    }
}

/// Keeps an explicit `null` distinct from an absent field.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
