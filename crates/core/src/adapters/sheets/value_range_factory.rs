use google_sheets4::api::ValueRange;
use serde_json::Value;
use std::borrow::Cow;

pub trait ValueRangeFactory {
    fn from_single_cell<'a, T: Into<Cow<'a, str>> + Clone>(cell_value: T) -> Self;
    fn from_row<'a, T: Into<Cow<'a, str>> + Clone>(row_values: &[T]) -> Self;
}

fn wrap_value<'a, T: Into<Cow<'a, str>>>(value: T) -> Value {
    Value::String(value.into().into_owned())
}

fn wrap_row<'a, T: Into<Cow<'a, str>> + Clone>(row_values: &[T]) -> Vec<Value> {
    row_values
        .iter()
        .map(|value| wrap_value(value.clone()))
        .collect()
}

impl ValueRangeFactory for ValueRange {
    fn from_single_cell<'a, T: Into<Cow<'a, str>> + Clone>(cell_value: T) -> Self {
        ValueRange {
            major_dimension: None,
            range: None,
            values: Some(vec![vec![wrap_value(cell_value)]]),
        }
    }

    fn from_row<'a, T: Into<Cow<'a, str>> + Clone>(row_values: &[T]) -> Self {
        Self {
            major_dimension: Some("ROWS".to_string()),
            range: None,
            values: Some(vec![wrap_row(row_values)]),
        }
    }
}

/// Cell values as the sheet shows them. Numbers and booleans keep their textual form.
pub fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
