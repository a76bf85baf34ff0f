//! Explicit data accessors.
//!
//! Every accessor takes the connection to run on, so the same call works on
//! the pool and inside a transaction.

pub mod holiday_repository;
pub mod job_repository;
pub mod production_week_repository;
pub mod roster_repository;

pub use holiday_repository::HolidayRepository;
pub use job_repository::JobRepository;
pub use production_week_repository::ProductionWeekRepository;
pub use roster_repository::RosterRepository;
