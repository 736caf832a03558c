use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use error_stack::{report, Report};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::domain::goals::weekly_goals::{TestRecord, WeeklyGoals};
use crate::domain::records::calendar::YearMonth;
use crate::domain::records::entry::{
    AppEntry, DeleteOutcome, DeleteRequest, SubmitOutcome, SurveyEntry,
};
use crate::domain::records::record::Record;
use crate::domain::records::record_type::{Category, RecordType};
use crate::domain::stats::aggregates::{
    composition, monthly_series, monthly_total, names_from_records, staff_ranking,
    weekly_totals, Achievement,
};
use crate::domain::stats::period::Period;
use crate::domain::stats::record_filter::{filter_records, TypeFilter};
use crate::domain::widgets::element::InputValue;
use crate::domain::widgets::render_pass::{Page, RenderPass};
use crate::domain::widgets::widget_id::{WidgetError, WidgetId};
use crate::ports::application_service::{
    ApplicationService, ApplicationServiceError, MonthlyStatistics, PageKind, RenderedPage,
};
use crate::ports::record_repository::{RecordRepository, RecordRepositoryError};
use crate::presentation::men_dashboard::{self, MenAction, MenDashboard};
use crate::presentation::notice::Notice;
use crate::presentation::women_dashboard::{self, WomenAction, WomenDashboard};

fn from_repository(
    report: Report<RecordRepositoryError>,
    details: &str,
) -> Report<ApplicationServiceError> {
    let context = match report.current_context() {
        RecordRepositoryError::PermissionDenied => ApplicationServiceError::PermissionDenied,
        _ => ApplicationServiceError::RepositoryFailed {
            details: details.to_owned(),
        },
    };
    report.change_context(context)
}

fn render_failure(error: WidgetError) -> Report<ApplicationServiceError> {
    let remediation = error.remediation();
    Report::new(error)
        .change_context(ApplicationServiceError::RenderFailed)
        .attach_printable(remediation)
}

/// Weekly goals and test records of the women's page. They live as long as the service.
#[derive(Debug, Default)]
struct WomenSession {
    goals: WeeklyGoals,
    test_records: Vec<TestRecord>,
}

pub struct StaffStatsApplicationService {
    repository: Arc<dyn RecordRepository>,
    session_names: RwLock<BTreeSet<String>>,
    women: RwLock<WomenSession>,
}

impl StaffStatsApplicationService {
    pub fn new(repository: Arc<dyn RecordRepository>) -> Self {
        Self {
            repository,
            session_names: RwLock::new(BTreeSet::new()),
            women: RwLock::new(WomenSession::default()),
        }
    }

    async fn load_records(&self) -> error_stack::Result<Vec<Record>, ApplicationServiceError> {
        self.repository
            .load_all_records()
            .await
            .map_err(|e| from_repository(e, "load records"))
    }

    async fn names_with(&self, records: &[Record]) -> Vec<String> {
        let mut names = names_from_records(records)
            .into_iter()
            .collect::<BTreeSet<_>>();
        names.extend(self.session_names.read().await.iter().cloned());
        names.into_iter().collect()
    }

    async fn submit(
        &self,
        name: Option<String>,
        date: NaiveDate,
        counts: Vec<(RecordType, i64)>,
    ) -> error_stack::Result<SubmitOutcome, ApplicationServiceError> {
        let Some(name) = name else {
            return Ok(SubmitOutcome::NameRequired);
        };

        self.session_names.write().await.insert(name.clone());
        if counts.is_empty() {
            info!(%name, "Registered name without data");
            return Ok(SubmitOutcome::NameRegistered(name));
        }

        for (record_type, count) in &counts {
            self.repository
                .insert_or_update_record(date, &name, *record_type, *count)
                .await
                .map_err(|e| from_repository(e, "save record"))?;
        }
        info!(%name, %date, records = counts.len(), "Saved records");
        Ok(SubmitOutcome::Saved {
            name,
            records: counts.len(),
        })
    }

    async fn men_pass(
        &self,
        input: &HashMap<WidgetId, InputValue>,
        today: NaiveDate,
        notices: &[Notice],
    ) -> error_stack::Result<(Page, Vec<MenAction>), ApplicationServiceError> {
        let records = self.load_records().await?;
        let names = self.names_with(&records).await;
        let month = YearMonth::of(today);
        let app_target = self.target(month, Category::App).await?;
        let survey_target = self.target(month, Category::Survey).await?;

        let view = MenDashboard {
            records: &records,
            names: &names,
            app_target,
            survey_target,
            today,
            notices,
        };
        let mut pass = RenderPass::with_input(input.clone());
        let actions = men_dashboard::render(&mut pass, &view).map_err(render_failure)?;
        Ok((pass.finish(), actions))
    }

    async fn women_pass(
        &self,
        input: &HashMap<WidgetId, InputValue>,
        today: NaiveDate,
        notices: &[Notice],
    ) -> error_stack::Result<(Page, Vec<WomenAction>), ApplicationServiceError> {
        let session = self.women.read().await;
        let view = WomenDashboard {
            goals: &session.goals,
            test_records: &session.test_records,
            today,
            notices,
        };
        let mut pass = RenderPass::with_input(input.clone());
        let actions = women_dashboard::render(&mut pass, &view).map_err(render_failure)?;
        Ok((pass.finish(), actions))
    }

    async fn apply_men_action(
        &self,
        action: MenAction,
    ) -> error_stack::Result<Notice, ApplicationServiceError> {
        let notice = match action {
            MenAction::SubmitApp(entry) => submit_notice(self.submit_app(entry).await?),
            MenAction::SubmitSurvey(entry) => submit_notice(self.submit_survey(entry).await?),
            MenAction::SetTarget {
                month,
                category,
                target,
            } => {
                self.set_target(month, category, target).await?;
                Notice::Success("保存しました。".to_owned())
            }
            MenAction::Delete(request) => match self.delete_record(request).await? {
                DeleteOutcome::Deleted => Notice::Success(DeleteOutcome::Deleted.message().to_owned()),
                outcome => Notice::Warning(outcome.message().to_owned()),
            },
            MenAction::Refresh => Notice::Info("データを再読み込みしました。".to_owned()),
        };
        Ok(notice)
    }

    async fn apply_women_action(&self, action: WomenAction) -> Notice {
        let mut session = self.women.write().await;
        match action {
            WomenAction::SaveWeeklyTarget { week, target } => {
                session.goals.set(week, target);
                Notice::Success(format!("已更新 {} 的目標為 {} 件", week.label(), target))
            }
            WomenAction::ClearWeeklyTarget(week) => {
                if session.goals.clear(week) {
                    Notice::Warning(format!("已清除 {} 的目標", week.label()))
                } else {
                    Notice::Info("本週尚未設定目標".to_owned())
                }
            }
            WomenAction::AddTestRecord(record) => {
                session.test_records.push(record);
                Notice::Success("已新增一筆測試紀錄".to_owned())
            }
        }
    }
}

fn submit_notice(outcome: SubmitOutcome) -> Notice {
    match outcome {
        SubmitOutcome::NameRequired => Notice::Warning(outcome.message().to_owned()),
        _ => Notice::Success(outcome.message().to_owned()),
    }
}

fn without_clicks(mut input: HashMap<WidgetId, InputValue>) -> HashMap<WidgetId, InputValue> {
    input.retain(|_, value| *value != InputValue::Clicked);
    input
}

#[async_trait::async_trait]
impl ApplicationService for StaffStatsApplicationService {
    #[instrument(skip(self))]
    async fn init(&self) -> error_stack::Result<(), ApplicationServiceError> {
        self.repository.init().await.map_err(|e| {
            let context = match e.current_context() {
                RecordRepositoryError::PermissionDenied => ApplicationServiceError::PermissionDenied,
                _ => ApplicationServiceError::InitializationFailed {
                    details: format!("could not prepare {}", self.repository.describe()),
                },
            };
            e.change_context(context)
        })
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> error_stack::Result<String, ApplicationServiceError> {
        let records = self.load_records().await?;
        let names = self.names_with(&records).await;

        Ok(format!(
            "🟢 Staff Stats Service - Healthy\n\
             Store: {}\n\
             Records: {}\n\
             Staff: {}",
            self.repository.describe(),
            records.len(),
            names.join(", ")
        ))
    }

    #[instrument(skip(self))]
    async fn records(
        &self,
        name_filter: &str,
        type_filter: TypeFilter,
    ) -> error_stack::Result<Vec<Record>, ApplicationServiceError> {
        let records = self.load_records().await?;
        Ok(filter_records(&records, name_filter, type_filter))
    }

    async fn staff_names(&self) -> error_stack::Result<Vec<String>, ApplicationServiceError> {
        let records = self.load_records().await?;
        Ok(self.names_with(&records).await)
    }

    #[instrument(skip(self))]
    async fn submit_app(
        &self,
        entry: AppEntry,
    ) -> error_stack::Result<SubmitOutcome, ApplicationServiceError> {
        self.submit(entry.name(), entry.date, entry.counts()).await
    }

    #[instrument(skip(self))]
    async fn submit_survey(
        &self,
        entry: SurveyEntry,
    ) -> error_stack::Result<SubmitOutcome, ApplicationServiceError> {
        self.submit(entry.name(), entry.date, entry.counts()).await
    }

    #[instrument(skip(self))]
    async fn delete_record(
        &self,
        request: DeleteRequest,
    ) -> error_stack::Result<DeleteOutcome, ApplicationServiceError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Ok(DeleteOutcome::NameRequired);
        }

        let deleted = self
            .repository
            .delete_record(request.date, name, request.record_type)
            .await
            .map_err(|e| from_repository(e, "delete record"))?;

        if deleted {
            Ok(DeleteOutcome::Deleted)
        } else {
            warn!("No record matched the deletion request");
            Ok(DeleteOutcome::NotFound)
        }
    }

    async fn target(
        &self,
        month: YearMonth,
        category: Category,
    ) -> error_stack::Result<i64, ApplicationServiceError> {
        self.repository
            .get_target(month, category)
            .await
            .map_err(|e| from_repository(e, "read target"))
    }

    #[instrument(skip(self))]
    async fn set_target(
        &self,
        month: YearMonth,
        category: Category,
        target: i64,
    ) -> error_stack::Result<(), ApplicationServiceError> {
        if target < 0 {
            return Err(report!(ApplicationServiceError::InvalidInput {
                details: format!("target must not be negative, got {}", target),
            }));
        }
        self.repository
            .set_target(month, category, target)
            .await
            .map_err(|e| from_repository(e, "save target"))
    }

    #[instrument(skip(self))]
    async fn statistics(
        &self,
        category: Category,
        month: YearMonth,
    ) -> error_stack::Result<MonthlyStatistics, ApplicationServiceError> {
        let records = self.load_records().await?;
        let target = self.target(month, category).await?;
        let period = Period::Month(month);

        Ok(MonthlyStatistics {
            month,
            category,
            achievement: Achievement {
                total: monthly_total(&records, month, category),
                target,
            },
            weekly: weekly_totals(&records, month, category),
            composition: (category == Category::App).then(|| composition(&records, period)),
            ranking: staff_ranking(&records, category, period),
            series: monthly_series(&records, month.year(), category),
        })
    }

    #[instrument(skip(self, input), fields(inputs = input.len()))]
    async fn render_page(
        &self,
        page: PageKind,
        input: HashMap<WidgetId, InputValue>,
        today: NaiveDate,
    ) -> error_stack::Result<RenderedPage, ApplicationServiceError> {
        let mut notices = Vec::new();

        let page = match page {
            PageKind::Men => {
                let (page, actions) = self.men_pass(&input, today, &[]).await?;
                if actions.is_empty() {
                    page
                } else {
                    for action in actions {
                        notices.push(self.apply_men_action(action).await?);
                    }
                    self.men_pass(&without_clicks(input), today, &notices)
                        .await?
                        .0
                }
            }
            PageKind::Women => {
                let (page, actions) = self.women_pass(&input, today, &[]).await?;
                if actions.is_empty() {
                    page
                } else {
                    for action in actions {
                        notices.push(self.apply_women_action(action).await);
                    }
                    self.women_pass(&without_clicks(input), today, &notices)
                        .await?
                        .0
                }
            }
        };

        Ok(RenderedPage { page, notices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::records::local_record_repository::LocalRecordRepository;
    use crate::domain::records::calendar::parse_date;
    use crate::domain::widgets::element::ElementKind;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn id(path: &str) -> WidgetId {
        WidgetId::from_segments(&path.split('/').collect::<Vec<_>>()).unwrap()
    }

    fn service() -> StaffStatsApplicationService {
        StaffStatsApplicationService::new(Arc::new(LocalRecordRepository::new()))
    }

    fn app_entry(typed_name: &str, new: i64, exist: i64, line: i64) -> AppEntry {
        AppEntry {
            selected_name: None,
            typed_name: typed_name.to_owned(),
            date: date("2024-05-14"),
            new,
            exist,
            line,
        }
    }

    /// Store whose every call is refused, like a spreadsheet not shared with the account.
    struct DeniedRepository;

    #[async_trait::async_trait]
    impl RecordRepository for DeniedRepository {
        fn describe(&self) -> String {
            "denied".to_owned()
        }

        async fn init(&self) -> error_stack::Result<(), RecordRepositoryError> {
            Err(report!(RecordRepositoryError::PermissionDenied))
        }

        async fn load_all_records(&self) -> error_stack::Result<Vec<Record>, RecordRepositoryError> {
            Err(report!(RecordRepositoryError::PermissionDenied))
        }

        async fn insert_or_update_record(
            &self,
            _date: NaiveDate,
            _name: &str,
            _record_type: RecordType,
            _count: i64,
        ) -> error_stack::Result<(), RecordRepositoryError> {
            Err(report!(RecordRepositoryError::PermissionDenied))
        }

        async fn delete_record(
            &self,
            _date: NaiveDate,
            _name: &str,
            _record_type: RecordType,
        ) -> error_stack::Result<bool, RecordRepositoryError> {
            Err(report!(RecordRepositoryError::PermissionDenied))
        }

        async fn get_target(
            &self,
            _month: YearMonth,
            _category: Category,
        ) -> error_stack::Result<i64, RecordRepositoryError> {
            Err(report!(RecordRepositoryError::PermissionDenied))
        }

        async fn set_target(
            &self,
            _month: YearMonth,
            _category: Category,
            _target: i64,
        ) -> error_stack::Result<(), RecordRepositoryError> {
            Err(report!(RecordRepositoryError::PermissionDenied))
        }
    }

    #[tokio::test]
    async fn test_submit_requires_name() {
        let service = service();
        let outcome = service.submit_app(app_entry("  ", 1, 0, 0)).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::NameRequired);
        assert!(service.records("", TypeFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_counts_register_name_only() {
        let service = service();
        let outcome = service.submit_app(app_entry("Ren", 0, 0, 0)).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::NameRegistered("Ren".into()));
        assert!(service.records("", TypeFilter::All).await.unwrap().is_empty());
        assert_eq!(service.staff_names().await.unwrap(), vec!["Ren".to_string()]);
    }

    #[tokio::test]
    async fn test_submit_saves_one_record_per_positive_count() {
        let service = service();
        let outcome = service.submit_app(app_entry("Ren", 2, 0, 1)).await.unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Saved {
                name: "Ren".into(),
                records: 2
            }
        );
        service.submit_app(app_entry("Ren", 3, 0, 0)).await.unwrap();

        let records = service.records("ren", TypeFilter::Only(RecordType::New)).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].count, 5, "Counts of the same key should add up");
    }

    #[tokio::test]
    async fn test_delete() {
        let service = service();
        service
            .submit_survey(SurveyEntry {
                selected_name: Some("Aoi".into()),
                typed_name: String::new(),
                date: date("2024-05-14"),
                count: 2,
            })
            .await
            .unwrap();

        let request = DeleteRequest {
            date: date("2024-05-14"),
            name: "Aoi".into(),
            record_type: RecordType::Survey,
        };
        assert_eq!(
            service.delete_record(request.clone()).await.unwrap(),
            DeleteOutcome::Deleted
        );
        assert_eq!(
            service.delete_record(request.clone()).await.unwrap(),
            DeleteOutcome::NotFound
        );
        assert_eq!(
            service
                .delete_record(DeleteRequest {
                    name: " ".into(),
                    ..request
                })
                .await
                .unwrap(),
            DeleteOutcome::NameRequired
        );
    }

    #[tokio::test]
    async fn test_negative_target_is_rejected() {
        let service = service();
        let report = service
            .set_target("2024-05".parse().unwrap(), Category::App, -1)
            .await
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            ApplicationServiceError::InvalidInput { .. }
        ));
    }

    #[tokio::test]
    async fn test_statistics() {
        let service = service();
        let may: YearMonth = "2024-05".parse().unwrap();
        service.set_target(may, Category::App, 10).await.unwrap();
        service.submit_app(app_entry("Ren", 2, 3, 1)).await.unwrap();
        service.submit_app(app_entry("Aoi", 0, 0, 8)).await.unwrap();

        let stats = service.statistics(Category::App, may).await.unwrap();
        assert_eq!(stats.achievement.total, 14);
        assert_eq!(stats.achievement.ratio(), Some(1.0), "Ratio should be capped at 1");
        assert_eq!(stats.ranking[0].name, "Aoi");
        assert_eq!(stats.series[4], 14);
        assert_eq!(stats.composition.map(|c| c.line), Some(9));

        let survey = service.statistics(Category::Survey, may).await.unwrap();
        assert_eq!(survey.composition, None);
        assert_eq!(survey.achievement.summary(), "目標未設定");
    }

    #[tokio::test]
    async fn test_render_applies_form_submission() {
        let service = service();
        let today = date("2024-05-15");
        let input = HashMap::from([
            (id("app/form/name_text"), InputValue::Text("Ren".into())),
            (id("app/form/exist"), InputValue::Number(4)),
            (id("app/form/submit"), InputValue::Clicked),
        ]);

        let rendered = service.render_page(PageKind::Men, input, today).await.unwrap();
        assert_eq!(rendered.notices, vec![Notice::Success("保存しました。".into())]);
        assert!(
            rendered
                .page
                .elements
                .iter()
                .any(|element| element.kind == ElementKind::Success("保存しました。".into())),
            "The notice should be shown on the page"
        );

        let records = service.records("", TypeFilter::All).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_type, RecordType::Exist);

        let plain = service
            .render_page(PageKind::Men, HashMap::new(), today)
            .await
            .unwrap();
        assert!(plain.notices.is_empty());
        assert_eq!(
            plain.page.ids(),
            rendered.page.ids(),
            "Rendering with and without input should yield the same ids"
        );
    }

    #[tokio::test]
    async fn test_render_women_goal_flow() {
        let service = service();
        let today = date("2024-05-15");

        let save = HashMap::from([
            (id("goals/target"), InputValue::Number(10)),
            (id("goals/save"), InputValue::Clicked),
        ]);
        let rendered = service.render_page(PageKind::Women, save, today).await.unwrap();
        assert_eq!(
            rendered.notices,
            vec![Notice::Success("已更新 2024 年 第 20 週 的目標為 10 件".into())]
        );
        assert!(rendered.page.elements.iter().any(|element| element.kind
            == ElementKind::Metric {
                label: "本週目標".into(),
                value: "10 件".into()
            }));

        let clear = HashMap::from([(id("goals/clear"), InputValue::Clicked)]);
        let rendered = service.render_page(PageKind::Women, clear.clone(), today).await.unwrap();
        assert_eq!(
            rendered.notices,
            vec![Notice::Warning("已清除 2024 年 第 20 週 的目標".into())]
        );
        let rendered = service.render_page(PageKind::Women, clear, today).await.unwrap();
        assert_eq!(rendered.notices, vec![Notice::Info("本週尚未設定目標".into())]);
    }

    #[tokio::test]
    async fn test_permission_denied_reaches_caller() {
        let service = StaffStatsApplicationService::new(Arc::new(DeniedRepository));
        let report = service.init().await.unwrap_err();
        assert_eq!(report.current_context(), &ApplicationServiceError::PermissionDenied);

        let report = service
            .render_page(PageKind::Men, HashMap::new(), date("2024-05-15"))
            .await
            .unwrap_err();
        assert_eq!(
            report.current_context(),
            &ApplicationServiceError::PermissionDenied,
            "The first remote call should surface PermissionDenied"
        );
    }
}
