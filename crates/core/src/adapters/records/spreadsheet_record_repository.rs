use std::sync::Arc;

use chrono::NaiveDate;
use error_stack::{report, ResultExt};
use tracing::{info, instrument};

use crate::adapters::sheets::spreadsheet_manager::{SpreadsheetManager, SpreadsheetManagerError};
use crate::adapters::sheets::spreadsheet_read::SpreadsheetRead;
use crate::adapters::sheets::spreadsheet_write::SpreadsheetWrite;
use crate::domain::records::calendar::{format_date, YearMonth};
use crate::domain::records::record::{
    parse_count, records_from_table, target_from_table, Record, RECORDS_HEADER, RECORDS_SHEET,
    TARGETS_HEADER, TARGETS_SHEET,
};
use crate::domain::records::record_type::{Category, RecordType};
use crate::domain::sheets::a1_notation::A1Notation;
use crate::domain::sheets::column::Column;
use crate::domain::sheets::table::SheetTable;
use crate::ports::record_repository::{RecordRepository, RecordRepositoryError};

trait IntoRepositoryResult<T> {
    fn into_repository(
        self,
        fallback: RecordRepositoryError,
    ) -> error_stack::Result<T, RecordRepositoryError>;
}

impl<T> IntoRepositoryResult<T> for error_stack::Result<T, SpreadsheetManagerError> {
    fn into_repository(
        self,
        fallback: RecordRepositoryError,
    ) -> error_stack::Result<T, RecordRepositoryError> {
        self.map_err(|report| {
            let context = match report.current_context() {
                SpreadsheetManagerError::PermissionDenied => RecordRepositoryError::PermissionDenied,
                SpreadsheetManagerError::Authentication => RecordRepositoryError::Authentication,
                _ => fallback,
            };
            report.change_context(context)
        })
    }
}

/// Records and targets stored in two worksheets of one spreadsheet.
pub struct SpreadsheetRecordRepository {
    pub spreadsheet_manager: Arc<SpreadsheetManager>,
}

impl SpreadsheetRecordRepository {
    pub fn new(spreadsheet_manager: Arc<SpreadsheetManager>) -> Self {
        Self {
            spreadsheet_manager,
        }
    }

    async fn table(&self, title: &str) -> error_stack::Result<SheetTable, RecordRepositoryError> {
        self.spreadsheet_manager
            .read_table(title)
            .await
            .into_repository(RecordRepositoryError::ReadFailed)
            .attach_printable_lazy(|| format!("Failed to read worksheet '{}'", title))
    }
}

#[async_trait::async_trait]
impl RecordRepository for SpreadsheetRecordRepository {
    fn describe(&self) -> String {
        format!(
            "Google Sheets spreadsheet {}",
            self.spreadsheet_manager.spreadsheet_id()
        )
    }

    #[instrument(skip(self))]
    async fn init(&self) -> error_stack::Result<(), RecordRepositoryError> {
        let (records, targets) = futures::future::join(
            self.spreadsheet_manager
                .ensure_worksheet(RECORDS_SHEET, &RECORDS_HEADER[..]),
            self.spreadsheet_manager
                .ensure_worksheet(TARGETS_SHEET, &TARGETS_HEADER[..]),
        )
        .await;
        records.into_repository(RecordRepositoryError::InitializationFailed)?;
        targets.into_repository(RecordRepositoryError::InitializationFailed)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load_all_records(&self) -> error_stack::Result<Vec<Record>, RecordRepositoryError> {
        let table = self.table(RECORDS_SHEET).await?;
        let records = records_from_table(&table);
        info!(count = records.len(), "Loaded records");
        Ok(records)
    }

    #[instrument(skip(self))]
    async fn insert_or_update_record(
        &self,
        date: NaiveDate,
        name: &str,
        record_type: RecordType,
        count: i64,
    ) -> error_stack::Result<(), RecordRepositoryError> {
        let table = self.table(RECORDS_SHEET).await?;
        let date_text = format_date(date);
        let existing = table.find_row(&[
            ("date", date_text.as_str()),
            ("name", name),
            ("type", record_type.as_ref()),
        ]);

        match existing {
            Some(index) => {
                let previous = parse_count(table.cell(&table.rows()[index], "count"));
                let record = Record::new(date, name, record_type, previous + count);
                let row = table.merge_row(index, &record.sheet_values());
                self.spreadsheet_manager
                    .write_row(RECORDS_SHEET, SheetTable::sheet_row(index), &row)
                    .await
                    .into_repository(RecordRepositoryError::WriteFailed)?;
                info!(previous, total = record.count, "Updated record");
            }
            None => {
                let record = Record::new(date, name, record_type, count);
                let row = table.layout_row(&RECORDS_HEADER, &record.sheet_values());
                self.spreadsheet_manager
                    .append_row(RECORDS_SHEET, &row)
                    .await
                    .into_repository(RecordRepositoryError::WriteFailed)?;
                info!("Appended record");
            }
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_record(
        &self,
        date: NaiveDate,
        name: &str,
        record_type: RecordType,
    ) -> error_stack::Result<bool, RecordRepositoryError> {
        let table = self.table(RECORDS_SHEET).await?;
        let date_text = format_date(date);
        let Some(index) = table.find_row(&[
            ("date", date_text.as_str()),
            ("name", name),
            ("type", record_type.as_ref()),
        ]) else {
            return Ok(false);
        };

        self.spreadsheet_manager
            .delete_row(RECORDS_SHEET, SheetTable::sheet_row(index))
            .await
            .into_repository(RecordRepositoryError::WriteFailed)?;
        info!(row = SheetTable::sheet_row(index), "Deleted record");
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn get_target(
        &self,
        month: YearMonth,
        category: Category,
    ) -> error_stack::Result<i64, RecordRepositoryError> {
        let table = self.table(TARGETS_SHEET).await?;
        Ok(target_from_table(&table, month, category))
    }

    #[instrument(skip(self))]
    async fn set_target(
        &self,
        month: YearMonth,
        category: Category,
        target: i64,
    ) -> error_stack::Result<(), RecordRepositoryError> {
        let table = self.table(TARGETS_SHEET).await?;
        let month_text = month.to_string();
        let existing =
            table.find_row(&[("month", month_text.as_str()), ("category", category.as_ref())]);

        match existing {
            Some(index) => {
                let column = table.column("target").ok_or_else(|| {
                    report!(RecordRepositoryError::WriteFailed)
                        .attach_printable("The targets worksheet has no `target` column")
                })?;
                let cell = A1Notation::cell(
                    TARGETS_SHEET,
                    Column::from_index(column),
                    SheetTable::sheet_row(index),
                );
                self.spreadsheet_manager
                    .write_value(&cell, &target.to_string())
                    .await
                    .into_repository(RecordRepositoryError::WriteFailed)?;
            }
            None => {
                let values = [
                    ("month", month_text.clone()),
                    ("category", category.to_string()),
                    ("target", target.to_string()),
                ];
                let row = table.layout_row(&TARGETS_HEADER, &values);
                self.spreadsheet_manager
                    .append_row(TARGETS_SHEET, &row)
                    .await
                    .into_repository(RecordRepositoryError::WriteFailed)?;
            }
        }
        info!(month = %month_text, %category, target, "Saved target");
        Ok(())
    }
}
