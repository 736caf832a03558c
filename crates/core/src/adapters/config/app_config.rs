use config::{Config, FileFormat};
use error_stack::{report, Report};
use thiserror::Error;
use tracing::{info, instrument};

use super::service_account_config::{RawServiceAccount, ServiceAccountCredential};
use super::sheets_config::{RawSheets, SheetsTarget};
use crate::domain::credentials::pem::{PemBlock, PemError};

pub const DEFAULT_SECRETS_PATH: &str = "secrets.toml";
pub const SECRETS_PATH_ENV: &str = "SECRETS_PATH";

pub const SERVICE_ACCOUNT_SECTION: &str = "gcp_service_account";
pub const SHEETS_SECTION: &str = "sheets";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read secrets file '{path}'")]
    Unreadable { path: String },
    #[error("Missing section [{section}] in secrets")]
    MissingSection { section: &'static str },
    #[error("Missing field `{section}.{field}` in secrets")]
    MissingField {
        section: &'static str,
        field: &'static str,
    },
    #[error("Invalid field `{path}`: {reason}")]
    InvalidField { path: String, reason: String },
    #[error("Malformed private key in `gcp_service_account.private_key`: {0}")]
    MalformedPrivateKey(PemError),
    #[error("`sheets.url` is not a spreadsheet address: '{url}'")]
    InvalidSpreadsheetUrl { url: String },
}

impl ConfigError {
    pub fn remediation(&self) -> String {
        match self {
            ConfigError::Unreadable { .. } => format!(
                "create {} (or point {} at the file) with [{}] and [{}] sections",
                DEFAULT_SECRETS_PATH, SECRETS_PATH_ENV, SERVICE_ACCOUNT_SECTION, SHEETS_SECTION
            ),
            ConfigError::MissingSection { section } if *section == SHEETS_SECTION => {
                "add a [sheets] section with the spreadsheet url".to_owned()
            }
            ConfigError::MissingSection { section } => format!(
                "add a [{}] section with the fields of the service account JSON key",
                section
            ),
            ConfigError::MissingField { section, field } => {
                format!("set `{}` in [{}]", field, section)
            }
            ConfigError::InvalidField { .. } => "quote the value as a string".to_owned(),
            ConfigError::MalformedPrivateKey(pem) => pem.remediation().to_owned(),
            ConfigError::InvalidSpreadsheetUrl { .. } => {
                "use the address https://docs.google.com/spreadsheets/d/<ID>/edit".to_owned()
            }
        }
    }
}

fn fail(error: ConfigError) -> Report<ConfigError> {
    let remediation = error.remediation();
    report!(error).attach_printable(format!("Fix: {}", remediation))
}

#[derive(serde::Deserialize, Default)]
struct RawSecrets {
    gcp_service_account: Option<RawServiceAccount>,
    sheets: Option<RawSheets>,
}

/// Process-wide configuration, loaded once at startup and passed to whatever needs
/// spreadsheet access.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub service_account: ServiceAccountCredential,
    pub sheets: SheetsTarget,
}

impl AppConfig {
    pub fn secrets_path() -> String {
        std::env::var(SECRETS_PATH_ENV).unwrap_or_else(|_| DEFAULT_SECRETS_PATH.to_string())
    }

    #[instrument]
    pub fn load(path: &str) -> error_stack::Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(config::File::new(path, FileFormat::Toml))
            .build()
            .map_err(|e| {
                fail(ConfigError::Unreadable {
                    path: path.to_owned(),
                })
                .attach_printable(e.to_string())
            })?;
        let app_config = Self::from_config(config)?;
        info!(
            project_id = %app_config.service_account.project_id,
            client_email = %app_config.service_account.client_email,
            spreadsheet_id = %app_config.sheets.spreadsheet_id(),
            "Loaded secrets"
        );
        Ok(app_config)
    }

    pub fn from_toml_str(toml: &str) -> error_stack::Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()
            .map_err(|e| {
                fail(ConfigError::Unreadable {
                    path: "<inline>".to_owned(),
                })
                .attach_printable(e.to_string())
            })?;
        Self::from_config(config)
    }

    fn from_config(config: Config) -> error_stack::Result<Self, ConfigError> {
        let value = config
            .try_deserialize::<serde_json::Value>()
            .map_err(|e| {
                fail(ConfigError::InvalidField {
                    path: "<root>".to_owned(),
                    reason: e.to_string(),
                })
            })?;

        let raw: RawSecrets = serde_path_to_error::deserialize(value).map_err(|e| {
            fail(ConfigError::InvalidField {
                path: e.path().to_string(),
                reason: e.inner().to_string(),
            })
        })?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSecrets) -> error_stack::Result<Self, ConfigError> {
        let account = raw.gcp_service_account.ok_or_else(|| {
            fail(ConfigError::MissingSection {
                section: SERVICE_ACCOUNT_SECTION,
            })
        })?;
        let service_account = validate_service_account(account)?;

        let sheets = raw.sheets.ok_or_else(|| {
            fail(ConfigError::MissingSection {
                section: SHEETS_SECTION,
            })
        })?;
        let url = required(SHEETS_SECTION, "url", sheets.url)?;
        let sheets = SheetsTarget::from_url(&url)
            .ok_or_else(|| fail(ConfigError::InvalidSpreadsheetUrl { url }))?;

        Ok(AppConfig {
            service_account,
            sheets,
        })
    }
}

fn required(
    section: &'static str,
    field: &'static str,
    value: Option<String>,
) -> error_stack::Result<String, ConfigError> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| fail(ConfigError::MissingField { section, field }))
}

fn validate_service_account(
    raw: RawServiceAccount,
) -> error_stack::Result<ServiceAccountCredential, ConfigError> {
    let section = SERVICE_ACCOUNT_SECTION;

    let missing = [
        ("type", &raw.key_type),
        ("project_id", &raw.project_id),
        ("private_key_id", &raw.private_key_id),
        ("private_key", &raw.private_key),
        ("client_email", &raw.client_email),
        ("client_id", &raw.client_id),
        ("auth_uri", &raw.auth_uri),
        ("token_uri", &raw.token_uri),
        ("auth_provider_x509_cert_url", &raw.auth_provider_x509_cert_url),
    ]
    .into_iter()
    .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
    .map(|(field, _)| field)
    .collect::<Vec<_>>();

    if let Some(&field) = missing.first() {
        return Err(fail(ConfigError::MissingField { section, field })
            .attach_printable(format!("All missing fields: {}", missing.join(", "))));
    }

    let private_key = PemBlock::parse(raw.private_key.as_deref().unwrap_or_default())
        .map_err(|e| fail(ConfigError::MalformedPrivateKey(e)))?;

    Ok(ServiceAccountCredential {
        key_type: required(section, "type", raw.key_type)?,
        project_id: required(section, "project_id", raw.project_id)?,
        private_key_id: required(section, "private_key_id", raw.private_key_id)?,
        private_key,
        client_email: required(section, "client_email", raw.client_email)?,
        client_id: required(section, "client_id", raw.client_id)?,
        auth_uri: required(section, "auth_uri", raw.auth_uri)?,
        token_uri: required(section, "token_uri", raw.token_uri)?,
        auth_provider_x509_cert_url: required(
            section,
            "auth_provider_x509_cert_url",
            raw.auth_provider_x509_cert_url,
        )?,
        client_x509_cert_url: raw
            .client_x509_cert_url
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty()),
    })
}
