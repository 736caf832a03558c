use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::records::calendar::iso_year_week;

/// ISO `(year, week)`; weeks start on Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoWeek {
    pub year: i32,
    pub week: u32,
}

impl IsoWeek {
    pub fn of(date: NaiveDate) -> Self {
        let (year, week) = iso_year_week(date);
        IsoWeek { year, week }
    }

    pub fn label(&self) -> String {
        format!("{} 年 第 {} 週", self.year, self.week)
    }
}

/// Weekly targets of the women's team, kept only for the session.
#[derive(Debug, Clone, Default)]
pub struct WeeklyGoals {
    targets: BTreeMap<IsoWeek, i64>,
}

impl WeeklyGoals {
    pub fn set(&mut self, week: IsoWeek, target: i64) {
        self.targets.insert(week, target);
    }

    /// Returns whether a target existed.
    pub fn clear(&mut self, week: IsoWeek) -> bool {
        self.targets.remove(&week).is_some()
    }

    pub fn get(&self, week: IsoWeek) -> i64 {
        self.targets.get(&week).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (IsoWeek, i64)> + '_ {
        self.targets.iter().map(|(week, target)| (*week, *target))
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// A local test record used to try out the weekly achievement rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRecord {
    pub date: NaiveDate,
    pub staff: String,
    pub new: i64,
    pub exist: i64,
    pub line: i64,
}

impl TestRecord {
    pub fn total(&self) -> i64 {
        self.new + self.exist + self.line
    }
}

pub fn weekly_total(records: &[TestRecord], week: IsoWeek) -> i64 {
    records
        .iter()
        .filter(|record| IsoWeek::of(record.date) == week)
        .map(TestRecord::total)
        .sum()
}

/// Percentage of the target reached; 0.0 while no target is set. Not capped.
pub fn achievement_rate(actual: i64, target: i64) -> f64 {
    if target > 0 {
        actual as f64 / target as f64 * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::calendar::parse_date;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_set_get_clear() {
        let mut goals = WeeklyGoals::default();
        let week = IsoWeek::of(date("2024-05-08"));
        assert_eq!(week, IsoWeek { year: 2024, week: 19 });
        assert_eq!(goals.get(week), 0);

        goals.set(week, 12);
        goals.set(week, 15);
        assert_eq!(goals.get(week), 15, "Second set should overwrite");

        assert!(goals.clear(week));
        assert!(!goals.clear(week), "Clearing twice reports nothing to clear");
        assert!(goals.is_empty());
    }

    #[test]
    fn test_iter_sorted_by_week() {
        let mut goals = WeeklyGoals::default();
        goals.set(IsoWeek { year: 2024, week: 3 }, 1);
        goals.set(IsoWeek { year: 2023, week: 50 }, 2);
        let weeks = goals.iter().map(|(week, _)| week.label()).collect::<Vec<_>>();
        assert_eq!(weeks, vec!["2023 年 第 50 週", "2024 年 第 3 週"]);
    }

    #[test]
    fn test_weekly_total_uses_iso_week() {
        let records = vec![
            TestRecord { date: date("2024-05-06"), staff: "Yui".into(), new: 1, exist: 2, line: 3 },
            TestRecord { date: date("2024-05-12"), staff: "Yui".into(), new: 1, exist: 0, line: 0 },
            TestRecord { date: date("2024-05-13"), staff: "Yui".into(), new: 9, exist: 0, line: 0 },
        ];
        assert_eq!(weekly_total(&records, IsoWeek::of(date("2024-05-08"))), 7);
    }

    #[test]
    fn test_achievement_rate() {
        assert_eq!(achievement_rate(5, 10), 50.0);
        assert_eq!(achievement_rate(15, 10), 150.0);
        assert_eq!(achievement_rate(5, 0), 0.0);
    }
}
