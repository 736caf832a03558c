use chrono::NaiveDate;
use thiserror::Error;

use super::application_service::PageKind;
use crate::domain::records::calendar::YearMonth;
use crate::domain::records::record_type::{Category, RecordType};
use crate::domain::stats::record_filter::TypeFilter;
use crate::domain::widgets::element::InputValue;
use crate::domain::widgets::widget_id::WidgetId;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid command: {details}")]
    InvalidCommand { details: String },
    #[error("Command execution failed: {details}")]
    ExecutionFailed { details: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Validates the secret bundle without contacting the spreadsheet.
    Check,
    HealthCheck,
    /// Renders a page, replaying `input` as what the controls reported.
    Render {
        page: PageKind,
        input: Vec<(WidgetId, InputValue)>,
    },
    ListRecords {
        name_filter: String,
        type_filter: TypeFilter,
    },
    AddApp {
        date: NaiveDate,
        name: String,
        new: i64,
        exist: i64,
        line: i64,
    },
    AddSurvey {
        date: NaiveDate,
        name: String,
        count: i64,
    },
    Delete {
        date: NaiveDate,
        name: String,
        record_type: RecordType,
    },
    Target {
        month: YearMonth,
        category: Category,
        value: Option<i64>,
    },
    Stats {
        category: Category,
        month: Option<YearMonth>,
    },
}

#[async_trait::async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, command: Command) -> error_stack::Result<String, CommandError>;
}
