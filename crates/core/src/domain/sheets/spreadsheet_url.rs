use std::sync::OnceLock;

use regex::Regex;

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https?://docs\.google\.com/spreadsheets/d/([A-Za-z0-9_-]+)(?:[/?#].*)?$")
            .expect("spreadsheet url pattern is valid")
    })
}

/// Extracts the spreadsheet id from a `https://docs.google.com/spreadsheets/d/<ID>/...` address.
pub fn spreadsheet_id_from_url(url: &str) -> Option<&str> {
    id_pattern()
        .captures(url.trim())
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_url() {
        assert_eq!(
            spreadsheet_id_from_url("https://docs.google.com/spreadsheets/d/ABC/edit"),
            Some("ABC")
        );
    }

    #[test]
    fn test_url_with_fragment_and_whitespace() {
        assert_eq!(
            spreadsheet_id_from_url(
                "  https://docs.google.com/spreadsheets/d/1x-Y_z9/edit#gid=0 \n"
            ),
            Some("1x-Y_z9")
        );
    }

    #[test]
    fn test_bare_url() {
        assert_eq!(
            spreadsheet_id_from_url("https://docs.google.com/spreadsheets/d/ABC"),
            Some("ABC")
        );
    }

    #[test]
    fn test_not_a_spreadsheet() {
        assert_eq!(spreadsheet_id_from_url("https://drive.google.com/file/d/ABC"), None);
        assert_eq!(spreadsheet_id_from_url("ABC"), None);
        assert_eq!(spreadsheet_id_from_url(""), None);
    }
}
