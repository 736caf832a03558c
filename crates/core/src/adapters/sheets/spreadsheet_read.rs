use tracing::instrument;

use crate::domain::sheets::a1_notation::A1Notation;
use crate::domain::sheets::table::SheetTable;

use super::{
    spreadsheet_manager::{api_failure, SpreadsheetManager, SpreadsheetManagerError},
    value_range_factory::cell_text,
};

pub trait SpreadsheetRead {
    fn read_range(
        &self,
        range: &A1Notation,
    ) -> impl std::future::Future<
        Output = error_stack::Result<Vec<Vec<String>>, SpreadsheetManagerError>,
    > + Send;

    /// Whole worksheet as a table, header first.
    fn read_table(
        &self,
        title: &str,
    ) -> impl std::future::Future<Output = error_stack::Result<SheetTable, SpreadsheetManagerError>>
           + Send;
}

impl SpreadsheetRead for SpreadsheetManager {
    #[instrument]
    async fn read_range(
        &self,
        range: &A1Notation,
    ) -> error_stack::Result<Vec<Vec<String>>, SpreadsheetManagerError> {
        let response = self
            .hub
            .spreadsheets()
            .values_get(self.spreadsheet_id(), range.as_ref())
            .doit()
            .await
            .map_err(|e| api_failure(e, SpreadsheetManagerError::FailedToFetchRange))?;

        // An empty range comes back without `values`.
        let values = response
            .1
            .values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();

        Ok(values)
    }

    #[instrument]
    async fn read_table(
        &self,
        title: &str,
    ) -> error_stack::Result<SheetTable, SpreadsheetManagerError> {
        let values = self.read_range(&A1Notation::sheet(title)).await?;
        Ok(SheetTable::new(values))
    }
}
