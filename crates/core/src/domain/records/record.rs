use std::str::FromStr;

use chrono::NaiveDate;
use tracing::warn;

use super::calendar::{format_date, iso_week, parse_date, YearMonth};
use super::record_type::{Category, RecordType};
use crate::domain::sheets::table::SheetTable;

pub const RECORDS_SHEET: &str = "records";
pub const TARGETS_SHEET: &str = "targets";

pub const RECORDS_HEADER: [&str; 5] = ["date", "week", "name", "type", "count"];
pub const TARGETS_HEADER: [&str; 3] = ["month", "category", "target"];

/// One row of the records sheet. `(date, name, record_type)` identifies a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub date: NaiveDate,
    pub week: u32,
    pub name: String,
    pub record_type: RecordType,
    pub count: i64,
}

impl Record {
    pub fn new(date: NaiveDate, name: impl Into<String>, record_type: RecordType, count: i64) -> Self {
        Record {
            date,
            week: iso_week(date),
            name: name.into(),
            record_type,
            count,
        }
    }

    pub fn matches(&self, date: NaiveDate, name: &str, record_type: RecordType) -> bool {
        self.date == date && self.name == name && self.record_type == record_type
    }

    pub fn sheet_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("date", format_date(self.date)),
            ("week", self.week.to_string()),
            ("name", self.name.clone()),
            ("type", self.record_type.to_string()),
            ("count", self.count.to_string()),
        ]
    }
}

/// Parses the records sheet. Rows without date, name or type are skipped, as are rows
/// whose type is unknown or whose date does not parse. An unparsable count reads as 0
/// and a missing or unparsable week is derived from the date.
pub fn records_from_table(table: &SheetTable) -> Vec<Record> {
    table
        .rows()
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let date = table.cell(row, "date").unwrap_or_default();
            let name = table.cell(row, "name").unwrap_or_default();
            let record_type = table.cell(row, "type").unwrap_or_default();
            if date.is_empty() || name.is_empty() || record_type.is_empty() {
                return None;
            }

            let Some(parsed_date) = parse_date(date) else {
                warn!(row = SheetTable::sheet_row(index), date, "Skipping record with unparsable date");
                return None;
            };
            let Ok(record_type) = RecordType::from_str(record_type) else {
                warn!(row = SheetTable::sheet_row(index), record_type, "Skipping record with unknown type");
                return None;
            };

            let count = parse_count(table.cell(row, "count"));
            let week = table
                .cell(row, "week")
                .and_then(|week| week.parse::<u32>().ok())
                .unwrap_or_else(|| iso_week(parsed_date));

            Some(Record {
                date: parsed_date,
                week,
                name: name.to_owned(),
                record_type,
                count,
            })
        })
        .collect()
}

/// Reads the target for `(month, category)`; 0 when absent or unparsable.
pub fn target_from_table(table: &SheetTable, month: YearMonth, category: Category) -> i64 {
    let month = month.to_string();
    table
        .find_row(&[("month", month.as_str()), ("category", category.as_ref())])
        .map(|index| parse_count(table.cell(&table.rows()[index], "target")))
        .unwrap_or(0)
}

/// Integer cell value; decimals are truncated, anything else reads as 0.
pub fn parse_count(value: Option<&str>) -> i64 {
    value
        .and_then(|value| {
            value
                .parse::<i64>()
                .ok()
                .or_else(|| value.parse::<f64>().ok().map(|v| v as i64))
        })
        .unwrap_or(0)
}
