use serde::Serialize;

use crate::domain::credentials::pem::PemBlock;

/// `[gcp_service_account]` section of the secret bundle.
#[derive(serde::Deserialize, Default, Clone)]
pub struct RawServiceAccount {
    #[serde(rename = "type")]
    pub key_type: Option<String>,
    pub project_id: Option<String>,
    pub private_key_id: Option<String>,
    pub private_key: Option<String>,
    pub client_email: Option<String>,
    pub client_id: Option<String>,
    pub auth_uri: Option<String>,
    pub token_uri: Option<String>,
    pub auth_provider_x509_cert_url: Option<String>,
    pub client_x509_cert_url: Option<String>,
}

/// Validated service account credential. Read-only after load.
#[derive(Serialize, Clone, PartialEq, Eq)]
pub struct ServiceAccountCredential {
    #[serde(rename = "type")]
    pub key_type: String,
    pub project_id: String,
    pub private_key_id: String,
    #[serde(serialize_with = "serialize_pem")]
    pub private_key: PemBlock,
    pub client_email: String,
    pub client_id: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub auth_provider_x509_cert_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_x509_cert_url: Option<String>,
}

fn serialize_pem<S: serde::Serializer>(pem: &PemBlock, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(pem.as_str())
}

impl std::fmt::Debug for ServiceAccountCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredential")
            .field("key_type", &self.key_type)
            .field("project_id", &self.project_id)
            .field("private_key_id", &"<redacted>")
            .field("private_key", &self.private_key)
            .field("client_email", &self.client_email)
            .field("client_id", &self.client_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}
