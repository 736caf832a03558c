use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Kind of a recorded count, stored in the `type` column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum RecordType {
    New,
    Exist,
    Line,
    Survey,
}

impl RecordType {
    pub fn label(&self) -> &'static str {
        match self {
            RecordType::New => "新規",
            RecordType::Exist => "既存",
            RecordType::Line => "LINE",
            RecordType::Survey => "アンケート",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "新規" => Some(RecordType::New),
            "既存" => Some(RecordType::Exist),
            "LINE" => Some(RecordType::Line),
            "アンケート" => Some(RecordType::Survey),
            _ => None,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            RecordType::New | RecordType::Exist | RecordType::Line => Category::App,
            RecordType::Survey => Category::Survey,
        }
    }
}

/// Target category: APP recommendations (new + exist + line) or surveys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    App,
    Survey,
}

impl Category {
    pub fn includes(&self, record_type: RecordType) -> bool {
        record_type.category() == *self
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::App => "APP",
            Category::Survey => "アンケート",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_record_type_round_trips_through_sheet_value() {
        for record_type in RecordType::iter() {
            assert_eq!(
                RecordType::from_str(record_type.as_ref()),
                Ok(record_type),
                "{} should parse back",
                record_type
            );
        }
        assert_eq!(RecordType::New.to_string(), "new");
        assert!(RecordType::from_str("visit").is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(RecordType::Exist.label(), "既存");
        assert_eq!(RecordType::from_label("アンケート"), Some(RecordType::Survey));
        assert_eq!(RecordType::from_label("survey"), None);
    }

    #[test]
    fn test_category_membership() {
        assert!(Category::App.includes(RecordType::Line));
        assert!(!Category::App.includes(RecordType::Survey));
        assert!(Category::Survey.includes(RecordType::Survey));
        assert_eq!(Category::from_str("survey"), Ok(Category::Survey));
        assert_eq!(Category::App.as_ref(), "app");
    }
}
