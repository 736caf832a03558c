use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use strum::{EnumIter, IntoEnumIterator};

use crate::domain::records::calendar::{iso_week, week_number, YearMonth};
use crate::domain::records::record::Record;

/// How a statistics block slices time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum PeriodMode {
    Week,
    Month,
    Year,
}

impl PeriodMode {
    pub fn label(&self) -> &'static str {
        match self {
            PeriodMode::Week => "週（単週）",
            PeriodMode::Month => "月（単月）",
            PeriodMode::Year => "年（単年）",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        PeriodMode::iter().find(|mode| mode.label() == label)
    }

    pub fn labels() -> Vec<String> {
        PeriodMode::iter().map(|mode| mode.label().to_owned()).collect()
    }
}

/// A selected period inside an already selected year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Folded week number (see [`week_number`]) within `year`.
    Week { year: i32, week: u32 },
    Month(YearMonth),
    Year(i32),
}

impl Period {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            Period::Week { year, week } => {
                date.year() == *year && week_number(iso_week(date)) == *week
            }
            Period::Month(month) => month.contains(date),
            Period::Year(year) => date.year() == *year,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Period::Week { week, .. } => format!("w{}", week),
            Period::Month(month) => month.to_string(),
            Period::Year(year) => year.to_string(),
        }
    }
}

/// Years present in the data; the current year when there is none.
pub fn year_options(records: &[Record], today: NaiveDate) -> Vec<i32> {
    let years = records
        .iter()
        .map(|record| record.date.year())
        .collect::<BTreeSet<_>>();
    if years.is_empty() {
        return vec![today.year()];
    }
    years.into_iter().collect()
}

/// The current year when offered, else the latest one.
pub fn default_year(years: &[i32], today: NaiveDate) -> i32 {
    if years.contains(&today.year()) {
        today.year()
    } else {
        years.last().copied().unwrap_or(today.year())
    }
}

/// Options for `mode` within `year`, plus the default selection.
pub fn period_options(
    records: &[Record],
    mode: PeriodMode,
    year: i32,
    today: NaiveDate,
) -> (Vec<Period>, Period) {
    let in_year = || records.iter().filter(move |record| record.date.year() == year);

    match mode {
        PeriodMode::Week => {
            let weeks = in_year()
                .map(|record| week_number(iso_week(record.date)))
                .collect::<BTreeSet<_>>();
            let mut options = weeks
                .into_iter()
                .map(|week| Period::Week { year, week })
                .collect::<Vec<_>>();
            if options.is_empty() {
                options.push(Period::Week { year, week: 1 });
            }
            let today_week = iso_week(today);
            let wanted = Period::Week {
                year,
                week: if today_week <= 52 { today_week } else { 1 },
            };
            let default = if options.contains(&wanted) { wanted } else { options[0] };
            (options, default)
        }
        PeriodMode::Month => {
            let months = in_year()
                .map(|record| YearMonth::of(record.date))
                .collect::<BTreeSet<_>>();
            let mut options = months.into_iter().map(Period::Month).collect::<Vec<_>>();
            if options.is_empty() {
                if let Some(january) = YearMonth::new(year, 1) {
                    options.push(Period::Month(january));
                }
            }
            let wanted = if today.year() == year {
                Period::Month(YearMonth::of(today))
            } else {
                options.last().copied().unwrap_or(Period::Year(year))
            };
            let default = if options.contains(&wanted) {
                wanted
            } else {
                options.first().copied().unwrap_or(Period::Year(year))
            };
            (options, default)
        }
        PeriodMode::Year => {
            let years = year_options(records, today);
            let default = Period::Year(default_year(&years, today));
            (years.into_iter().map(Period::Year).collect(), default)
        }
    }
}

/// Selectable months of `year` for the weekly table; the current month when there is no data.
pub fn month_options(records: &[Record], year: i32, today: NaiveDate) -> (Vec<YearMonth>, YearMonth) {
    let mut months = records
        .iter()
        .filter(|record| record.date.year() == year)
        .map(|record| YearMonth::of(record.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>();
    if months.is_empty() {
        months.extend(YearMonth::new(year, today.month()));
    }
    let current = YearMonth::of(today);
    let default = if months.contains(&current) {
        current
    } else {
        *months.last().unwrap_or(&current)
    };
    (months, default)
}

#[cfg(test)]
mod tests {
    use crate::domain::records::calendar::parse_date;
    use crate::domain::records::record_type::RecordType;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn record(d: &str) -> Record {
        Record::new(date(d), "Aoi", RecordType::New, 1)
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(PeriodMode::from_label("月（単月）"), Some(PeriodMode::Month));
        assert_eq!(PeriodMode::labels().len(), 3);
    }

    #[test]
    fn test_year_options_default_to_today() {
        let today = date("2025-02-01");
        assert_eq!(year_options(&[], today), vec![2025]);
        let records = vec![record("2023-04-01"), record("2024-04-01")];
        let years = year_options(&records, today);
        assert_eq!(years, vec![2023, 2024]);
        assert_eq!(default_year(&years, today), 2024, "Latest year when today is missing");
        assert_eq!(default_year(&years, date("2023-01-01")), 2023);
    }

    #[test]
    fn test_week_options() {
        let records = vec![record("2024-01-03"), record("2024-01-10"), record("2023-12-31")];
        let (options, default) = period_options(&records, PeriodMode::Week, 2024, date("2024-01-11"));
        assert_eq!(
            options,
            vec![Period::Week { year: 2024, week: 1 }, Period::Week { year: 2024, week: 2 }]
        );
        assert_eq!(default, Period::Week { year: 2024, week: 2 });

        let (_, default) = period_options(&records, PeriodMode::Week, 2024, date("2024-06-01"));
        assert_eq!(default, Period::Week { year: 2024, week: 1 }, "Falls back to first option");
    }

    #[test]
    fn test_month_options() {
        let records = vec![record("2023-03-01"), record("2023-08-01")];
        let (options, default) = period_options(&records, PeriodMode::Month, 2023, date("2024-01-01"));
        assert_eq!(options.len(), 2);
        assert_eq!(default, Period::Month(YearMonth::new(2023, 8).unwrap()));

        let (options, default) = period_options(&[], PeriodMode::Month, 2022, date("2024-01-01"));
        assert_eq!(options, vec![Period::Month(YearMonth::new(2022, 1).unwrap())]);
        assert_eq!(default, options[0]);
    }

    #[test]
    fn test_year_period_options() {
        let records = vec![record("2023-03-01")];
        let (options, default) = period_options(&records, PeriodMode::Year, 2023, date("2024-01-01"));
        assert_eq!(options, vec![Period::Year(2023)]);
        assert_eq!(default, Period::Year(2023));
    }

    #[test]
    fn test_period_contains() {
        let week = Period::Week { year: 2024, week: 2 };
        assert!(week.contains(date("2024-01-08")));
        assert!(!week.contains(date("2024-01-07")));
        assert!(Period::Year(2024).contains(date("2024-12-31")));
        assert_eq!(week.label(), "w2");
    }

    #[test]
    fn test_month_options_without_data() {
        let (months, default) = month_options(&[], 2024, date("2024-05-20"));
        assert_eq!(months, vec![YearMonth::new(2024, 5).unwrap()]);
        assert_eq!(default, months[0]);
    }
}
