use std::fmt::Formatter;

use super::column::Column;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Notation(pub String);

impl A1Notation {
    /// The whole worksheet, e.g. `'records'`.
    pub fn sheet(sheet_title: &str) -> Self {
        A1Notation(quote_title(sheet_title))
    }

    /// A single cell; `row` is 1-based.
    pub fn cell(sheet_title: &str, col: Column, row: u32) -> Self {
        A1Notation(format!("{}!{}{}", quote_title(sheet_title), col, row))
    }

    /// Every column of one 1-based row, e.g. `'records'!1:1`.
    pub fn row(sheet_title: &str, row: u32) -> Self {
        A1Notation(format!("{}!{}:{}", quote_title(sheet_title), row, row))
    }

    /// Columns `A..=width` of one 1-based row, e.g. `'records'!A1:E1`.
    pub fn row_span(sheet_title: &str, row: u32, width: usize) -> Self {
        let end = Column::from_index(width.saturating_sub(1));
        A1Notation(format!("{}!A{}:{}{}", quote_title(sheet_title), row, end, row))
    }
}

fn quote_title(sheet_title: &str) -> String {
    format!("'{}'", sheet_title.replace('\'', "''"))
}

impl std::fmt::Display for A1Notation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for A1Notation {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet() {
        assert_eq!(A1Notation::sheet("records").as_ref(), "'records'");
    }

    #[test]
    fn test_cell() {
        assert_eq!(
            A1Notation::cell("targets", Column::from_index(2), 7).as_ref(),
            "'targets'!C7"
        );
    }

    #[test]
    fn test_row() {
        assert_eq!(A1Notation::row("records", 1).as_ref(), "'records'!1:1");
    }

    #[test]
    fn test_row_span() {
        assert_eq!(
            A1Notation::row_span("records", 1, 5).as_ref(),
            "'records'!A1:E1"
        );
    }

    #[test]
    fn test_title_with_quote_is_escaped() {
        assert_eq!(A1Notation::sheet("men's").as_ref(), "'men''s'");
    }
}
