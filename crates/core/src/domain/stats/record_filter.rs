use strum::IntoEnumIterator;

use crate::domain::records::record::Record;
use crate::domain::records::record_type::RecordType;

/// Type filter of the data management tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    All,
    /// New and existing members; LINE is not part of this filter.
    App,
    Only(RecordType),
}

impl TypeFilter {
    pub fn options() -> Vec<TypeFilter> {
        let mut options = vec![TypeFilter::All, TypeFilter::App];
        options.extend(RecordType::iter().map(TypeFilter::Only));
        options
    }

    pub fn label(&self) -> &'static str {
        match self {
            TypeFilter::All => "すべて",
            TypeFilter::App => "App（新規+既存）",
            TypeFilter::Only(record_type) => record_type.label(),
        }
    }

    /// Accepts a label or a sheet value such as `new`.
    pub fn parse(value: &str) -> Option<Self> {
        TypeFilter::options()
            .into_iter()
            .find(|filter| filter.label() == value)
            .or_else(|| match value {
                "all" => Some(TypeFilter::All),
                "app" => Some(TypeFilter::App),
                other => other.parse::<RecordType>().ok().map(TypeFilter::Only),
            })
    }

    pub fn accepts(&self, record_type: RecordType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::App => matches!(record_type, RecordType::New | RecordType::Exist),
            TypeFilter::Only(only) => *only == record_type,
        }
    }
}

/// Records matching a case-insensitive name substring and a type filter, newest first,
/// then by name and type.
pub fn filter_records(records: &[Record], name_filter: &str, type_filter: TypeFilter) -> Vec<Record> {
    let needle = name_filter.trim().to_lowercase();
    let mut filtered = records
        .iter()
        .filter(|record| needle.is_empty() || record.name.to_lowercase().contains(&needle))
        .filter(|record| type_filter.accepts(record.record_type))
        .cloned()
        .collect::<Vec<_>>();

    filtered.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.record_type.as_ref().cmp(b.record_type.as_ref()))
    });
    filtered
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::records::calendar::parse_date;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn sample() -> Vec<Record> {
        vec![
            Record::new(date("2024-05-01"), "Aoi", RecordType::New, 3),
            Record::new(date("2024-05-03"), "aoki", RecordType::Line, 1),
            Record::new(date("2024-05-03"), "Aoi", RecordType::Survey, 2),
            Record::new(date("2024-05-03"), "Aoi", RecordType::Exist, 2),
            Record::new(date("2024-05-02"), "Ren", RecordType::Exist, 5),
        ]
    }

    #[test]
    fn test_options_and_labels() {
        let labels = TypeFilter::options()
            .iter()
            .map(|f| f.label())
            .collect::<Vec<_>>();
        assert_eq!(
            labels,
            vec!["すべて", "App（新規+既存）", "新規", "既存", "LINE", "アンケート"]
        );
        assert_eq!(TypeFilter::parse("LINE"), Some(TypeFilter::Only(RecordType::Line)));
        assert_eq!(TypeFilter::parse("survey"), Some(TypeFilter::Only(RecordType::Survey)));
        assert_eq!(TypeFilter::parse("app"), Some(TypeFilter::App));
        assert_eq!(TypeFilter::parse("???"), None);
    }

    #[test]
    fn test_sorted_newest_first() {
        let filtered = filter_records(&sample(), "", TypeFilter::All);
        let keys = filtered
            .iter()
            .map(|r| (r.date.to_string(), r.name.as_str(), r.record_type))
            .collect::<Vec<_>>();
        assert_eq!(
            keys,
            vec![
                ("2024-05-03".to_string(), "Aoi", RecordType::Exist),
                ("2024-05-03".to_string(), "Aoi", RecordType::Survey),
                ("2024-05-03".to_string(), "aoki", RecordType::Line),
                ("2024-05-02".to_string(), "Ren", RecordType::Exist),
                ("2024-05-01".to_string(), "Aoi", RecordType::New),
            ]
        );
    }

    #[test]
    fn test_name_filter_is_case_insensitive() {
        let filtered = filter_records(&sample(), "AO", TypeFilter::All);
        assert_eq!(filtered.len(), 4);
    }

    #[test]
    fn test_app_filter_excludes_line() {
        let filtered = filter_records(&sample(), "", TypeFilter::App);
        assert!(filtered
            .iter()
            .all(|r| matches!(r.record_type, RecordType::New | RecordType::Exist)));
        assert_eq!(filtered.len(), 3);
    }
}
