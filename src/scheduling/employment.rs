use chrono::NaiveDate;

use crate::entities::employee;

/// Whether the employee is employed on `date`. Both bounds are inclusive and
/// an open end date means still employed.
pub fn is_active(employee: &employee::Model, date: NaiveDate) -> bool {
    is_active_between(
        employee.employment_start_date,
        employee.employment_end_date,
        date,
    )
}

pub fn is_active_between(start: NaiveDate, end: Option<NaiveDate>, date: NaiveDate) -> bool {
    if date < start {
        return false;
    }
    !matches!(end, Some(end) if date > end)
}

/// Whether the employee is active on at least one day of `from..=to`.
pub fn overlaps(employee: &employee::Model, from: NaiveDate, to: NaiveDate) -> bool {
    employee.employment_start_date <= to
        && employee.employment_end_date.map_or(true, |end| end >= from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn employee(start: NaiveDate, end: Option<NaiveDate>) -> employee::Model {
        employee::Model {
            employee_id: 1,
            first_name: "Dana".into(),
            last_initial: "K".into(),
            position_id: 1,
            primary_work_area_id: 1,
            employment_start_date: start,
            employment_end_date: end,
            display_order: 1,
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let e = employee(d(4), Some(d(8)));
        assert!(!is_active(&e, d(3)));
        assert!(is_active(&e, d(4)));
        assert!(is_active(&e, d(8)));
        assert!(!is_active(&e, d(9)));
    }

    #[test]
    fn open_ended_employment() {
        let e = employee(d(4), None);
        assert!(is_active(&e, d(31)));
    }

    #[test]
    fn range_overlap() {
        let e = employee(d(10), Some(d(12)));
        assert!(overlaps(&e, d(3), d(10)));
        assert!(overlaps(&e, d(12), d(20)));
        assert!(!overlaps(&e, d(1), d(9)));
        assert!(!overlaps(&e, d(13), d(20)));
    }
}
