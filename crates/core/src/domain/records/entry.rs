use chrono::NaiveDate;

use super::record_type::RecordType;

/// A staff name picked from the list or typed in. A typed name wins.
pub fn resolve_name(selected: Option<&str>, typed: &str) -> Option<String> {
    let typed = typed.trim();
    if !typed.is_empty() {
        return Some(typed.to_owned());
    }
    selected
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
}

/// Submission of the APP recommendation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    pub selected_name: Option<String>,
    pub typed_name: String,
    pub date: NaiveDate,
    pub new: i64,
    pub exist: i64,
    pub line: i64,
}

impl AppEntry {
    pub fn name(&self) -> Option<String> {
        resolve_name(self.selected_name.as_deref(), &self.typed_name)
    }

    /// Positive counts in new, exist, line order.
    pub fn counts(&self) -> Vec<(RecordType, i64)> {
        [
            (RecordType::New, self.new),
            (RecordType::Exist, self.exist),
            (RecordType::Line, self.line),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect()
    }
}

/// Submission of the survey form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyEntry {
    pub selected_name: Option<String>,
    pub typed_name: String,
    pub date: NaiveDate,
    pub count: i64,
}

impl SurveyEntry {
    pub fn name(&self) -> Option<String> {
        resolve_name(self.selected_name.as_deref(), &self.typed_name)
    }

    pub fn counts(&self) -> Vec<(RecordType, i64)> {
        if self.count > 0 {
            vec![(RecordType::Survey, self.count)]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub date: NaiveDate,
    pub name: String,
    pub record_type: RecordType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    NameRequired,
    /// All counts were zero: the name joins the session list, nothing is stored.
    NameRegistered(String),
    Saved { name: String, records: usize },
}

impl SubmitOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SubmitOutcome::NameRequired => "名前を入力してください。",
            SubmitOutcome::NameRegistered(_) => "名前を登録しました。（データは追加していません）",
            SubmitOutcome::Saved { .. } => "保存しました。",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    NameRequired,
    Deleted,
    NotFound,
}

impl DeleteOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            DeleteOutcome::NameRequired => "名前を入力してください。",
            DeleteOutcome::Deleted => "データが削除されました。",
            DeleteOutcome::NotFound => "該当するデータが見つかりませんでした。",
        }
    }
}
