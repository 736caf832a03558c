use std::collections::HashMap;

use chrono::NaiveDate;
use strum::{Display, EnumString};
use thiserror::Error;

use crate::domain::records::calendar::YearMonth;
use crate::domain::records::entry::{
    AppEntry, DeleteOutcome, DeleteRequest, SubmitOutcome, SurveyEntry,
};
use crate::domain::records::record::Record;
use crate::domain::records::record_type::Category;
use crate::domain::stats::aggregates::{Achievement, Composition, StaffTotal, WeeklyTotal};
use crate::domain::stats::record_filter::TypeFilter;
use crate::domain::widgets::element::InputValue;
use crate::domain::widgets::render_pass::Page;
use crate::domain::widgets::widget_id::WidgetId;
use crate::presentation::notice::Notice;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplicationServiceError {
    #[error("Service initialization failed: {details}")]
    InitializationFailed { details: String },
    #[error("Access to the spreadsheet was denied")]
    PermissionDenied,
    #[error("Record store operation failed: {details}")]
    RepositoryFailed { details: String },
    #[error("Invalid input: {details}")]
    InvalidInput { details: String },
    #[error("Page rendering failed")]
    RenderFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PageKind {
    Men,
    Women,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub page: Page,
    /// Feedback of the actions triggered by the replayed input.
    pub notices: Vec<Notice>,
}

/// Figures of one statistics tab for a month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyStatistics {
    pub month: YearMonth,
    pub category: Category,
    pub achievement: Achievement,
    pub weekly: Vec<WeeklyTotal>,
    /// Only for [`Category::App`].
    pub composition: Option<Composition>,
    pub ranking: Vec<StaffTotal>,
    /// Jan..Dec of the month's year.
    pub series: [i64; 12],
}

#[async_trait::async_trait]
pub trait ApplicationService: Send + Sync {
    async fn init(&self) -> error_stack::Result<(), ApplicationServiceError>;

    async fn health_check(&self) -> error_stack::Result<String, ApplicationServiceError>;

    async fn records(
        &self,
        name_filter: &str,
        type_filter: TypeFilter,
    ) -> error_stack::Result<Vec<Record>, ApplicationServiceError>;

    /// Names found in the records plus names registered during this session.
    async fn staff_names(&self) -> error_stack::Result<Vec<String>, ApplicationServiceError>;

    async fn submit_app(
        &self,
        entry: AppEntry,
    ) -> error_stack::Result<SubmitOutcome, ApplicationServiceError>;

    async fn submit_survey(
        &self,
        entry: SurveyEntry,
    ) -> error_stack::Result<SubmitOutcome, ApplicationServiceError>;

    async fn delete_record(
        &self,
        request: DeleteRequest,
    ) -> error_stack::Result<DeleteOutcome, ApplicationServiceError>;

    async fn target(
        &self,
        month: YearMonth,
        category: Category,
    ) -> error_stack::Result<i64, ApplicationServiceError>;

    async fn set_target(
        &self,
        month: YearMonth,
        category: Category,
        target: i64,
    ) -> error_stack::Result<(), ApplicationServiceError>;

    async fn statistics(
        &self,
        category: Category,
        month: YearMonth,
    ) -> error_stack::Result<MonthlyStatistics, ApplicationServiceError>;

    /// Runs one render pass replaying `input`. Actions it triggers are applied and the
    /// page is rendered again so it shows their result.
    async fn render_page(
        &self,
        page: PageKind,
        input: HashMap<WidgetId, InputValue>,
        today: NaiveDate,
    ) -> error_stack::Result<RenderedPage, ApplicationServiceError>;
}
