//! Report shapes and the pure computations behind them.

pub mod rollup;
pub mod variance;
pub mod weekly;

pub use rollup::{
    build_monthly_rollup, MonthlyRollupRow, ReportPeriod, RollupGroup, RollupGroupBy,
    RollupQuery, RollupSortKey, SortDirection,
};
pub use variance::{dollars_per_hour, round2, variance_pct, Variance};
pub use weekly::{build_company_actuals, MonthlyCompanyActualsRow, WeeklyOverviewRow};
