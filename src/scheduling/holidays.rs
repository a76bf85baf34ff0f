use chrono::NaiveDate;
use std::collections::HashSet;

/// Holiday dates loaded once per operation. Absence means a regular day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidaySet {
    dates: HashSet<NaiveDate>,
}

impl HolidaySet {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl FromIterator<NaiveDate> for HolidaySet {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership() {
        let christmas = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        let set: HolidaySet = [christmas].into_iter().collect();
        assert!(set.is_holiday(christmas));
        assert!(!set.is_holiday(christmas.succ_opt().unwrap()));
        assert!(!HolidaySet::default().is_holiday(christmas));
    }
}
