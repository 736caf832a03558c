use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::Datelike;

use super::period::Period;
use crate::domain::records::calendar::{iso_week, week_number, YearMonth};
use crate::domain::records::record::Record;
use crate::domain::records::record_type::{Category, RecordType};

pub fn monthly_total(records: &[Record], month: YearMonth, category: Category) -> i64 {
    records
        .iter()
        .filter(|record| month.contains(record.date) && category.includes(record.record_type))
        .map(|record| record.count)
        .sum()
}

/// Progress towards a monthly target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Achievement {
    pub total: i64,
    pub target: i64,
}

impl Achievement {
    /// `min(1, total / max(1, target))`; `None` while no target is set.
    pub fn ratio(&self) -> Option<f64> {
        (self.target > 0).then(|| (self.total as f64 / self.target.max(1) as f64).min(1.0))
    }

    pub fn summary(&self) -> String {
        match self.ratio() {
            Some(ratio) => format!("目標 {} 件・達成率 {:.1}%", self.target, ratio * 100.0),
            None => "目標未設定".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyTotal {
    /// Folded week number, shown as `w{week}`.
    pub week: u32,
    pub total: i64,
}

pub fn weekly_totals(records: &[Record], month: YearMonth, category: Category) -> Vec<WeeklyTotal> {
    let mut totals = BTreeMap::<u32, i64>::new();
    for record in records
        .iter()
        .filter(|record| month.contains(record.date) && category.includes(record.record_type))
    {
        *totals.entry(week_number(iso_week(record.date))).or_default() += record.count;
    }
    totals
        .into_iter()
        .map(|(week, total)| WeeklyTotal { week, total })
        .collect()
}

/// Share of new / exist / LINE within the APP category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Composition {
    pub new: i64,
    pub exist: i64,
    pub line: i64,
}

impl Composition {
    pub fn total(&self) -> i64 {
        self.new + self.exist + self.line
    }
}

pub fn composition(records: &[Record], period: Period) -> Composition {
    records
        .iter()
        .filter(|record| period.contains(record.date))
        .fold(Composition::default(), |mut acc, record| {
            match record.record_type {
                RecordType::New => acc.new += record.count,
                RecordType::Exist => acc.exist += record.count,
                RecordType::Line => acc.line += record.count,
                RecordType::Survey => {}
            }
            acc
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffTotal {
    pub rank: usize,
    pub name: String,
    pub total: i64,
}

impl StaffTotal {
    /// Only the first place carries the crown.
    pub fn rank_label(&self) -> String {
        if self.rank == 1 {
            format!("{} 👑", self.rank)
        } else {
            self.rank.to_string()
        }
    }
}

/// Totals per staff member, highest first; ties keep name order.
pub fn staff_ranking(records: &[Record], category: Category, period: Period) -> Vec<StaffTotal> {
    let mut totals = HashMap::<&str, i64>::new();
    for record in records
        .iter()
        .filter(|record| category.includes(record.record_type) && period.contains(record.date))
    {
        *totals.entry(record.name.as_str()).or_default() += record.count;
    }

    let mut totals = totals.into_iter().collect::<Vec<_>>();
    totals.sort_by(|(a_name, a_total), (b_name, b_total)| {
        b_total.cmp(a_total).then_with(|| a_name.cmp(b_name))
    });

    totals
        .into_iter()
        .enumerate()
        .map(|(index, (name, total))| StaffTotal {
            rank: index + 1,
            name: name.to_owned(),
            total,
        })
        .collect()
}

/// Jan..Dec totals for `year`.
pub fn monthly_series(records: &[Record], year: i32, category: Category) -> [i64; 12] {
    let mut series = [0i64; 12];
    for record in records
        .iter()
        .filter(|record| record.date.year() == year && category.includes(record.record_type))
    {
        series[record.date.month0() as usize] += record.count;
    }
    series
}

pub fn monthly_series_title(category: Category, year: i32) -> String {
    let label = match category {
        Category::App => "and st",
        Category::Survey => "Survey",
    };
    format!("{} Monthly totals ({})", label, year)
}

pub fn names_from_records(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|record| record.name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
