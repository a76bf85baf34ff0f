pub mod daily_employee_hours;
pub mod daily_shift_summary;
pub mod employee;
pub mod finishing_work;
pub mod holiday;
pub mod job;
pub mod position;
pub mod production_week;
pub mod work_area;

pub use daily_employee_hours::Entity as DailyEmployeeHours;
pub use daily_shift_summary::Entity as DailyShiftSummary;
pub use employee::Entity as Employee;
pub use finishing_work::Entity as FinishingWork;
pub use holiday::Entity as Holiday;
pub use job::Entity as Job;
pub use position::Entity as Position;
pub use production_week::Entity as ProductionWeek;
pub use work_area::Entity as WorkArea;
