use error_stack::{report, Report, ResultExt};
use google_sheets4::api::{
    AddSheetRequest, BatchUpdateSpreadsheetRequest, DeleteDimensionRequest, DimensionRange,
    GridProperties, Request, SheetProperties, ValueRange,
};
use google_sheets4::hyper::client::HttpConnector;
use google_sheets4::hyper_rustls::HttpsConnector;
use google_sheets4::{hyper, Sheets};
use std::{collections::HashMap, fmt::Debug};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::adapters::config::app_config::AppConfig;
use crate::adapters::config::sheets_config::SheetsTarget;
use crate::domain::sheets::a1_notation::A1Notation;
use crate::domain::sheets::table::SheetTable;

use super::spreadsheet_read::SpreadsheetRead;
use super::value_range_factory::ValueRangeFactory;
use super::{auth, http_client};

pub const NEW_SHEET_ROWS: i32 = 1000;
pub const MIN_SHEET_COLUMNS: i32 = 26;

pub struct SpreadsheetManager {
    pub target: SheetsTarget,
    client_email: String,
    pub(super) hub: Sheets<HttpsConnector<HttpConnector>>,
    pub sheet_id_cache: RwLock<Option<HashMap<String, i32>>>,
}

impl Debug for SpreadsheetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SpreadsheetManager {{ spreadsheet_id: {}, client_email: {} }}",
            self.target.spreadsheet_id(),
            self.client_email
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpreadsheetManagerError {
    #[error("Failed to authenticate the service account")]
    Authentication,
    #[error("Permission denied by the spreadsheet API")]
    PermissionDenied,
    #[error("Worksheet '{0}' is not available")]
    WorksheetUnavailable(String),
    #[error("Failed to fetch range")]
    FailedToFetchRange,
    #[error("Failed to write range")]
    FailedToWriteRange,
    #[error("Failed to fetch spreadsheet metadata")]
    FailedToFetchMetadata,
}

impl SpreadsheetManagerError {
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            SpreadsheetManagerError::PermissionDenied => Some(
                "share the spreadsheet with `client_email` as Editor and enable the Google Sheets and Google Drive APIs",
            ),
            SpreadsheetManagerError::Authentication => Some(
                "check `private_key` and `client_email` in [gcp_service_account]; the key may have been revoked",
            ),
            _ => None,
        }
    }
}

fn is_permission_denied(error: &google_sheets4::Error) -> bool {
    match error {
        google_sheets4::Error::BadRequest(body) => {
            let error = body.get("error");
            let code = error.and_then(|e| e.get("code")).and_then(|c| c.as_i64());
            let status = error.and_then(|e| e.get("status")).and_then(|s| s.as_str());
            code == Some(403) || status == Some("PERMISSION_DENIED")
        }
        google_sheets4::Error::Failure(response) => {
            response.status() == hyper::StatusCode::FORBIDDEN
        }
        _ => false,
    }
}

/// Picks the error context for a failed API call. Access problems keep their own
/// context so callers can tell them apart from ordinary fetch/write failures.
pub fn classify_api_error(
    error: &google_sheets4::Error,
    fallback: SpreadsheetManagerError,
) -> SpreadsheetManagerError {
    match error {
        e if is_permission_denied(e) => SpreadsheetManagerError::PermissionDenied,
        google_sheets4::Error::MissingToken(_) => SpreadsheetManagerError::Authentication,
        _ => fallback,
    }
}

pub(super) fn api_failure(
    error: google_sheets4::Error,
    fallback: SpreadsheetManagerError,
) -> Report<SpreadsheetManagerError> {
    let context = classify_api_error(&error, fallback);
    let remediation = context.remediation();
    let report = Report::new(error).change_context(context);
    match remediation {
        Some(remediation) => report.attach_printable(format!("Fix: {}", remediation)),
        None => report,
    }
}

impl SpreadsheetManager {
    #[instrument(name = "SpreadsheetManager::new", skip(config), fields(spreadsheet_id = %config.sheets.spreadsheet_id()))]
    pub async fn new(config: &AppConfig) -> error_stack::Result<Self, SpreadsheetManagerError> {
        let client = http_client::http_client();
        let auth = auth::auth(&config.service_account, client.clone()).await?;
        let hub = Sheets::new(client, auth);

        Ok(SpreadsheetManager {
            target: config.sheets.clone(),
            client_email: config.service_account.client_email.clone(),
            hub,
            sheet_id_cache: RwLock::new(None),
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        self.target.spreadsheet_id()
    }

    #[instrument]
    async fn fetch_sheet_ids(
        &self,
    ) -> error_stack::Result<HashMap<String, i32>, SpreadsheetManagerError> {
        let response = self
            .hub
            .spreadsheets()
            .get(self.spreadsheet_id())
            .doit()
            .await
            .map_err(|e| api_failure(e, SpreadsheetManagerError::FailedToFetchMetadata))?;

        let sheets = response.1.sheets.unwrap_or_default();
        let map = sheets
            .iter()
            .filter_map(|sheet| {
                let properties = sheet.properties.as_ref()?;
                Some((properties.title.clone()?, properties.sheet_id?))
            })
            .collect::<HashMap<_, _>>();

        Ok(map)
    }

    /// Worksheet title to sheet id, cached until a worksheet is added.
    #[instrument]
    pub async fn sheet_ids(
        &self,
    ) -> error_stack::Result<HashMap<String, i32>, SpreadsheetManagerError> {
        let cache = {
            // -- MUTEX READ --
            let guard = self.sheet_id_cache.read().await;
            guard.clone()
            // -- END MUTEX READ --
        };

        let map = match cache {
            Some(map) => map,
            None => {
                let fetched_map = self.fetch_sheet_ids().await?;

                {
                    // -- MUTEX WRITE --
                    let mut guard = self.sheet_id_cache.write().await;
                    guard.replace(fetched_map.clone());
                    // -- END MUTEX WRITE --
                }
                fetched_map
            }
        };

        Ok(map)
    }

    #[instrument]
    pub async fn sheet_id(&self, title: &str) -> error_stack::Result<i32, SpreadsheetManagerError> {
        self.sheet_ids()
            .await?
            .get(title)
            .copied()
            .ok_or_else(|| report!(SpreadsheetManagerError::WorksheetUnavailable(title.to_owned())))
    }

    /// Title of the spreadsheet; the cheapest call that proves the credential can reach it.
    #[instrument]
    pub async fn spreadsheet_title(&self) -> error_stack::Result<String, SpreadsheetManagerError> {
        let response = self
            .hub
            .spreadsheets()
            .get(self.spreadsheet_id())
            .doit()
            .await
            .map_err(|e| api_failure(e, SpreadsheetManagerError::FailedToFetchMetadata))?;

        Ok(response
            .1
            .properties
            .and_then(|properties| properties.title)
            .unwrap_or_default())
    }

    async fn batch_update(
        &self,
        requests: Vec<Request>,
        fallback: SpreadsheetManagerError,
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        let request = BatchUpdateSpreadsheetRequest {
            requests: Some(requests),
            ..Default::default()
        };

        self.hub
            .spreadsheets()
            .batch_update(request, self.spreadsheet_id())
            .doit()
            .await
            .map(|_| ())
            .map_err(|e| api_failure(e, fallback))
    }

    /// Creates the worksheet when missing and writes `header` in its first row. On an
    /// existing worksheet only the column names it lacks are added; columns already
    /// present stay where they are, whatever their order.
    #[instrument]
    pub async fn ensure_worksheet(
        &self,
        title: &str,
        header: &[&str],
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        let exists = self.sheet_ids().await?.contains_key(title);

        let header = if !exists {
            info!(title, "Creating worksheet");
            let properties = SheetProperties {
                title: Some(title.to_owned()),
                grid_properties: Some(GridProperties {
                    row_count: Some(NEW_SHEET_ROWS),
                    column_count: Some(MIN_SHEET_COLUMNS.max(header.len() as i32)),
                    ..Default::default()
                }),
                ..Default::default()
            };
            let request = Request {
                add_sheet: Some(AddSheetRequest {
                    properties: Some(properties),
                }),
                ..Default::default()
            };
            self.batch_update(
                vec![request],
                SpreadsheetManagerError::WorksheetUnavailable(title.to_owned()),
            )
            .await?;
            self.sheet_id_cache.write().await.take();
            header.iter().map(|name| name.to_string()).collect::<Vec<_>>()
        } else {
            let current = SheetTable::new(self.read_range(&A1Notation::row(title, 1)).await?);
            match current.repaired_header(header) {
                None => return Ok(()),
                Some(repaired) => {
                    warn!(title, current = ?current.header(), ?repaired, "Adding missing header columns");
                    repaired
                }
            }
        };

        let header_range = A1Notation::row_span(title, 1, header.len());
        self.write_range(&header_range, ValueRange::from_row(&header))
            .await
    }

    /// Deletes one row; `sheet_row` is 1-based like the sheet UI.
    #[instrument]
    pub async fn delete_row(
        &self,
        title: &str,
        sheet_row: u32,
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        let sheet_id = self.sheet_id(title).await?;
        let request = Request {
            delete_dimension: Some(DeleteDimensionRequest {
                range: Some(DimensionRange {
                    sheet_id: Some(sheet_id),
                    dimension: Some("ROWS".to_string()),
                    start_index: Some(sheet_row as i32 - 1),
                    end_index: Some(sheet_row as i32),
                }),
            }),
            ..Default::default()
        };

        self.batch_update(vec![request], SpreadsheetManagerError::FailedToWriteRange)
            .await
            .attach_printable_lazy(|| format!("Failed to delete row {} of {}", sheet_row, title))
    }

    #[instrument]
    pub(super) async fn write_range(
        &self,
        range: &A1Notation,
        value_range: ValueRange,
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        self.hub
            .spreadsheets()
            .values_update(value_range, self.spreadsheet_id(), range.as_ref())
            .value_input_option("RAW")
            .doit()
            .await
            .map(|_| ())
            .map_err(|e| api_failure(e, SpreadsheetManagerError::FailedToWriteRange))
            .attach_printable_lazy(|| format!("Failed to write to range {}", range))
    }

    #[instrument]
    pub(super) async fn append_range(
        &self,
        range: &A1Notation,
        value_range: ValueRange,
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        self.hub
            .spreadsheets()
            .values_append(value_range, self.spreadsheet_id(), range.as_ref())
            .value_input_option("RAW")
            .insert_data_option("INSERT_ROWS")
            .doit()
            .await
            .map(|_| ())
            .map_err(|e| api_failure(e, SpreadsheetManagerError::FailedToWriteRange))
            .attach_printable_lazy(|| format!("Failed to append to range {}", range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_forbidden_body_is_permission_denied() {
        let error = google_sheets4::Error::BadRequest(json!({
            "error": {
                "code": 403,
                "message": "The caller does not have permission",
                "status": "PERMISSION_DENIED"
            }
        }));
        assert_eq!(
            classify_api_error(&error, SpreadsheetManagerError::FailedToFetchRange),
            SpreadsheetManagerError::PermissionDenied,
            "A sheet not shared with the service account should be PermissionDenied"
        );
    }

    #[test]
    fn test_disabled_api_is_permission_denied() {
        let error = google_sheets4::Error::BadRequest(json!({
            "error": {
                "message": "Google Sheets API has not been used in project demo before or it is disabled.",
                "status": "PERMISSION_DENIED"
            }
        }));
        assert_eq!(
            classify_api_error(&error, SpreadsheetManagerError::FailedToFetchMetadata),
            SpreadsheetManagerError::PermissionDenied
        );
    }

    #[test]
    fn test_forbidden_status_is_permission_denied() {
        let response = hyper::Response::builder()
            .status(403)
            .body(hyper::Body::empty())
            .unwrap();
        let error = google_sheets4::Error::Failure(response);
        assert_eq!(
            classify_api_error(&error, SpreadsheetManagerError::FailedToWriteRange),
            SpreadsheetManagerError::PermissionDenied
        );
    }

    #[test]
    fn test_other_errors_keep_fallback() {
        let error = google_sheets4::Error::BadRequest(json!({
            "error": { "code": 400, "status": "INVALID_ARGUMENT" }
        }));
        assert_eq!(
            classify_api_error(&error, SpreadsheetManagerError::FailedToFetchRange),
            SpreadsheetManagerError::FailedToFetchRange
        );

        let error = google_sheets4::Error::MissingToken(Box::new(std::io::Error::new(
            std::io::ErrorKind::Other,
            "invalid_grant",
        )));
        assert_eq!(
            classify_api_error(&error, SpreadsheetManagerError::FailedToFetchRange),
            SpreadsheetManagerError::Authentication
        );
    }

    #[test]
    fn test_permission_report_carries_remediation() {
        let error = google_sheets4::Error::BadRequest(json!({
            "error": { "code": 403, "status": "PERMISSION_DENIED" }
        }));
        let report = api_failure(error, SpreadsheetManagerError::FailedToFetchRange);
        assert_eq!(
            report.current_context(),
            &SpreadsheetManagerError::PermissionDenied
        );
        let rendered = format!("{:?}", report);
        assert!(
            rendered.contains("as Editor"),
            "Report should explain how to grant access: {}",
            rendered
        );
    }
}
