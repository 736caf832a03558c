use google_sheets4::api::ValueRange;
use tracing::instrument;

use crate::domain::sheets::a1_notation::A1Notation;

use super::spreadsheet_manager::{SpreadsheetManager, SpreadsheetManagerError};
use super::value_range_factory::ValueRangeFactory;

pub trait SpreadsheetWrite {
    fn write_value(
        &self,
        position: &A1Notation,
        value: &str,
    ) -> impl std::future::Future<Output = error_stack::Result<(), SpreadsheetManagerError>> + Send;

    /// Overwrites row `sheet_row` (1-based) starting at column A.
    fn write_row(
        &self,
        title: &str,
        sheet_row: u32,
        values: &[String],
    ) -> impl std::future::Future<Output = error_stack::Result<(), SpreadsheetManagerError>> + Send;

    /// Appends `values` after the last row of the worksheet's table.
    fn append_row(
        &self,
        title: &str,
        values: &[String],
    ) -> impl std::future::Future<Output = error_stack::Result<(), SpreadsheetManagerError>> + Send;
}

impl SpreadsheetWrite for SpreadsheetManager {
    #[instrument]
    async fn write_value(
        &self,
        position: &A1Notation,
        value: &str,
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        let value_range = ValueRange::from_single_cell(value);
        self.write_range(position, value_range).await
    }

    #[instrument]
    async fn write_row(
        &self,
        title: &str,
        sheet_row: u32,
        values: &[String],
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        let range = A1Notation::row_span(title, sheet_row, values.len());
        self.write_range(&range, ValueRange::from_row(values)).await
    }

    #[instrument]
    async fn append_row(
        &self,
        title: &str,
        values: &[String],
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        let range = A1Notation::sheet(title);
        self.append_range(&range, ValueRange::from_row(values)).await
    }
}
