use std::{fmt::Formatter, str::FromStr};

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn iso_week(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

pub fn iso_year_week(date: NaiveDate) -> (i32, u32) {
    let week = date.iso_week();
    (week.year(), week.week())
}

/// Week 53 folds onto week 1 so labels stay within w1..=w52.
pub fn week_number(iso_week: u32) -> u32 {
    (iso_week.max(1) - 1) % 52 + 1
}

pub fn week_label(iso_week: u32) -> String {
    format!("w{}", week_number(iso_week))
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("'{0}' is not a YYYY-MM month")]
pub struct YearMonthParseError(pub String);

/// Calendar month, rendered as `YYYY-MM` (the `month` column of the targets sheet).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(YearMonth { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn abbreviation(&self) -> &'static str {
        const ABBREVIATIONS: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        ABBREVIATIONS[(self.month - 1) as usize]
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::fmt::Debug for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "YearMonth({})", self)
    }
}

impl FromStr for YearMonth {
    type Err = YearMonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || YearMonthParseError(s.to_owned());
        let (year, month) = s.trim().split_once('-').ok_or_else(error)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(error());
        }
        let year = year.parse::<i32>().map_err(|_| error())?;
        let month = month.parse::<u32>().map_err(|_| error())?;
        YearMonth::new(year, month).ok_or_else(error)
    }
}
