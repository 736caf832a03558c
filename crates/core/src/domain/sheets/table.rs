use std::collections::HashMap;

/// Raw worksheet contents: the first row is the header, the rest are data rows.
/// Columns are located by header name so a re-ordered sheet still reads correctly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    index: HashMap<String, usize>,
}

impl SheetTable {
    pub fn new(values: Vec<Vec<String>>) -> Self {
        let mut values = values.into_iter();
        let header = values
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|cell| cell.trim().to_owned())
            .collect::<Vec<_>>();

        let mut index = HashMap::new();
        for (position, name) in header.iter().enumerate() {
            index.entry(name.clone()).or_insert(position);
        }

        SheetTable {
            header,
            rows: values.collect(),
            index,
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Trimmed cell value; `None` when the column is unknown or the row is short.
    pub fn cell<'a>(&self, row: &'a [String], name: &str) -> Option<&'a str> {
        let position = self.column(name)?;
        row.get(position).map(|cell| cell.trim())
    }

    /// Header to write back when some `expected` column is missing; `None` when all of
    /// them are present in any order. Existing columns keep their position and the
    /// missing names go after the last non-blank one, so data rows stay aligned.
    pub fn repaired_header(&self, expected: &[&str]) -> Option<Vec<String>> {
        let missing = expected
            .iter()
            .filter(|name| self.column(name).is_none())
            .collect::<Vec<_>>();
        if missing.is_empty() {
            return None;
        }

        let used = self
            .header
            .iter()
            .rposition(|name| !name.is_empty())
            .map_or(0, |last| last + 1);
        let mut header = self.header[..used].to_vec();
        header.extend(missing.into_iter().map(|name| name.to_string()));
        Some(header)
    }

    /// Zero-based data row index of the first row whose `keys` cells equal the given values.
    pub fn find_row(&self, keys: &[(&str, &str)]) -> Option<usize> {
        if keys.iter().any(|(name, _)| self.column(name).is_none()) {
            return None;
        }
        self.rows.iter().position(|row| {
            keys.iter()
                .all(|(name, value)| self.cell(row, name) == Some(*value))
        })
    }

    /// 1-based sheet row of a zero-based data row index (row 1 is the header).
    pub fn sheet_row(data_index: usize) -> u32 {
        data_index as u32 + 2
    }

    /// Lays `values` out in header order, leaving other columns blank. Columns the
    /// header lacks are skipped; a sheet without a header uses `expected` order.
    pub fn layout_row(&self, expected: &[&str], values: &[(&str, String)]) -> Vec<String> {
        let positioned = values
            .iter()
            .filter_map(|(name, value)| {
                let position = if self.header.is_empty() {
                    expected.iter().position(|e| e == name)
                } else {
                    self.column(name)
                };
                position.map(|position| (position, value))
            })
            .collect::<Vec<_>>();

        let width = positioned
            .iter()
            .map(|(position, _)| position + 1)
            .max()
            .unwrap_or(0)
            .max(expected.len());

        let mut row = vec![String::new(); width];
        for (position, value) in positioned {
            row[position] = value.clone();
        }
        row
    }

    /// Copy of data row `data_index` with `values` written into their columns. Cells of
    /// other columns keep their content.
    pub fn merge_row(&self, data_index: usize, values: &[(&str, String)]) -> Vec<String> {
        let mut row = self.rows.get(data_index).cloned().unwrap_or_default();
        row.resize(row.len().max(self.header.len()), String::new());
        for (name, value) in values {
            if let Some(position) = self.column(name) {
                row[position] = value.clone();
            }
        }
        row
    }
}
