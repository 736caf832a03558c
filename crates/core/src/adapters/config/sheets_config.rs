use crate::domain::sheets::spreadsheet_url::spreadsheet_id_from_url;

/// `[sheets]` section of the secret bundle.
#[derive(serde::Deserialize, Default, Clone)]
pub struct RawSheets {
    pub url: Option<String>,
}

/// The spreadsheet the dashboard reads and writes. Edit access is only checked by the
/// first API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsTarget {
    url: String,
    spreadsheet_id: String,
}

impl SheetsTarget {
    pub fn from_url(url: &str) -> Option<Self> {
        let url = url.trim();
        let spreadsheet_id = spreadsheet_id_from_url(url)?.to_owned();
        Some(SheetsTarget {
            url: url.to_owned(),
            spreadsheet_id,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }
}
