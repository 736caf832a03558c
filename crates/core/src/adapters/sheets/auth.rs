use error_stack::{Report, ResultExt};
use google_sheets4::hyper::client::HttpConnector;
use google_sheets4::hyper_rustls::HttpsConnector;
use google_sheets4::oauth2::{self, authenticator::Authenticator};
use tracing::instrument;

use super::http_client::HttpsClient;
use super::spreadsheet_manager::SpreadsheetManagerError;
use crate::adapters::config::service_account_config::ServiceAccountCredential;

/// Converts the validated credential into the key shape the OAuth client expects.
pub fn service_account_key(
    credential: &ServiceAccountCredential,
) -> error_stack::Result<oauth2::ServiceAccountKey, SpreadsheetManagerError> {
    serde_json::to_value(credential)
        .and_then(serde_json::from_value::<oauth2::ServiceAccountKey>)
        .map_err(|e| Report::new(e).change_context(SpreadsheetManagerError::Authentication))
        .attach_printable("Service account credential could not be converted to an OAuth key")
}

#[instrument(skip(credential, client), fields(client_email = %credential.client_email))]
pub async fn auth(
    credential: &ServiceAccountCredential,
    client: HttpsClient,
) -> error_stack::Result<Authenticator<HttpsConnector<HttpConnector>>, SpreadsheetManagerError> {
    let secret = service_account_key(credential)?;

    oauth2::ServiceAccountAuthenticator::with_client(secret, client)
        .build()
        .await
        .change_context(SpreadsheetManagerError::Authentication)
        .attach_printable_lazy(|| {
            format!(
                "Could not create an authenticator for {}",
                credential.client_email
            )
        })
}
