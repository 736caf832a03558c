use chrono::NaiveDate;

use super::widget_id::WidgetId;

/// What a control reports back on the next pass, keyed by its [`WidgetId`].
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Clicked,
    Text(String),
    Number(i64),
    Selected(usize),
    Date(NaiveDate),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Tab { label: String },
    Expander { label: String },
    Form { label: String },
    Title(String),
    Subheader(String),
    Caption(String),
    Text(String),
    Info(String),
    Success(String),
    Warning(String),
    Metric { label: String, value: String },
    Progress { ratio: f64, text: String },
    Table { columns: Vec<String>, rows: Vec<Vec<String>> },
    BarChart { title: String, labels: Vec<String>, values: Vec<i64> },
    PieChart { labels: Vec<String>, values: Vec<i64> },
    TextInput { label: String, value: String },
    NumberInput { label: String, value: i64 },
    DateInput { label: String, value: NaiveDate },
    SelectBox { label: String, options: Vec<String>, selected: usize },
    Button { label: String },
    FormSubmit { label: String },
}

impl ElementKind {
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ElementKind::Tab { .. } | ElementKind::Expander { .. } | ElementKind::Form { .. }
        )
    }
}

/// One rendered element. Interactive controls and containers carry an id.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: Option<WidgetId>,
    pub depth: usize,
    pub kind: ElementKind,
}
