use std::fmt::Formatter;

use thiserror::Error;

const SEPARATOR: char = '/';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error("Duplicate element id '{0}' in the same render pass")]
    DuplicateElementId(WidgetId),
    #[error("Invalid widget key segment '{0}'")]
    InvalidKey(String),
}

impl WidgetError {
    pub fn remediation(&self) -> &'static str {
        match self {
            WidgetError::DuplicateElementId(_) => {
                "give every control a key unique within its scope (tab name + field name)"
            }
            WidgetError::InvalidKey(_) => "keys must be non-empty and must not contain '/'",
        }
    }
}

/// Identifier of one interactive control, derived from its scope path and field key,
/// e.g. `app/weekly/year`. Equal semantic keys always give equal ids.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Result<Self, WidgetError> {
        if segments.is_empty() {
            return Err(WidgetError::InvalidKey(String::new()));
        }
        for segment in segments {
            let segment = segment.as_ref();
            if segment.trim().is_empty() || segment.contains(SEPARATOR) {
                return Err(WidgetError::InvalidKey(segment.to_owned()));
            }
        }
        Ok(WidgetId(
            segments
                .iter()
                .map(|segment| segment.as_ref())
                .collect::<Vec<_>>()
                .join("/"),
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Debug for WidgetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "WidgetId({})", self.0)
    }
}

impl AsRef<str> for WidgetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
