use chrono::NaiveDate;
use staff_stats_core::adapters::config::app_config::AppConfig;
use staff_stats_core::domain::records::calendar::{format_date, parse_date, YearMonth};
use staff_stats_core::domain::records::entry::{AppEntry, DeleteRequest, SurveyEntry};
use staff_stats_core::domain::records::record::Record;
use staff_stats_core::domain::records::record_type::{Category, RecordType};
use staff_stats_core::domain::stats::record_filter::TypeFilter;
use staff_stats_core::domain::widgets::element::InputValue;
use staff_stats_core::domain::widgets::widget_id::WidgetId;
use staff_stats_core::ports::application_service::{
    ApplicationService, MonthlyStatistics, PageKind,
};
use staff_stats_core::ports::command_handler::{Command, CommandError, CommandHandler};
use staff_stats_core::presentation::text_renderer::TextRenderer;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument};

pub const USAGE: &str = "\
Usage: staff-stats [--local] <command>

  check                                     validate the secret bundle
  health                                    show store status
  render <men|women> [id=value ...]         render a page, replaying control input
                                            (click, #n, text:..., a date, a number)
  records [name] [type]                     list records
  add-app <date> <name> <new> <exist> <line>
  add-survey <date> <name> <count>
  delete <date> <name> <type>
  target <YYYY-MM> <app|survey> [value]     show or set a monthly target
  stats <app|survey> [YYYY-MM]              monthly statistics";

pub struct CliAdapter {
    application_service: Option<Arc<dyn ApplicationService>>,
    secrets_path: String,
    today: NaiveDate,
}

impl std::fmt::Debug for CliAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliAdapter")
            .field("application_service", &"<ApplicationService>")
            .field("secrets_path", &self.secrets_path)
            .finish()
    }
}

fn invalid(details: impl Into<String>) -> CommandError {
    CommandError::InvalidCommand {
        details: details.into(),
    }
}

fn arg<'a>(args: &'a [String], index: usize, what: &str) -> Result<&'a str, CommandError> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| invalid(format!("{} required", what)))
}

fn date_arg(args: &[String], index: usize) -> Result<NaiveDate, CommandError> {
    let value = arg(args, index, "Date (YYYY-MM-DD)")?;
    parse_date(value).ok_or_else(|| invalid(format!("Invalid date: {}", value)))
}

fn count_arg(args: &[String], index: usize, what: &str) -> Result<i64, CommandError> {
    let value = arg(args, index, what)?;
    value
        .parse()
        .map_err(|_| invalid(format!("{} must be an integer, got {}", what, value)))
}

fn month_arg(value: &str) -> Result<YearMonth, CommandError> {
    value
        .parse()
        .map_err(|_| invalid(format!("Invalid month (YYYY-MM): {}", value)))
}

fn category_arg(args: &[String], index: usize) -> Result<Category, CommandError> {
    let value = arg(args, index, "Category (app|survey)")?;
    value
        .parse()
        .map_err(|_| invalid(format!("Unknown category: {}", value)))
}

fn record_type_arg(value: &str) -> Result<RecordType, CommandError> {
    value
        .parse()
        .ok()
        .or_else(|| RecordType::from_label(value))
        .ok_or_else(|| invalid(format!("Unknown record type: {}", value)))
}

/// `id=value`: `click`, `#n` selects option n, `text:...` is taken verbatim, then a
/// date, an integer, else text.
fn parse_input(pair: &str) -> Result<(WidgetId, InputValue), CommandError> {
    let (id, value) = pair
        .split_once('=')
        .ok_or_else(|| invalid(format!("Expected id=value, got {}", pair)))?;
    let segments = id.split('/').collect::<Vec<_>>();
    let id = WidgetId::from_segments(&segments)
        .map_err(|e| invalid(format!("Invalid widget id {}: {}", id, e)))?;

    let value = if let Some(text) = value.strip_prefix("text:") {
        InputValue::Text(text.to_owned())
    } else if value == "click" {
        InputValue::Clicked
    } else if let Some(index) = value.strip_prefix('#').and_then(|n| n.parse().ok()) {
        InputValue::Selected(index)
    } else if let Some(date) = parse_date(value) {
        InputValue::Date(date)
    } else if let Ok(number) = value.parse() {
        InputValue::Number(number)
    } else {
        InputValue::Text(value.to_owned())
    };
    Ok((id, value))
}

fn format_records(records: &[Record]) -> String {
    if records.is_empty() {
        return "No records".to_owned();
    }
    let mut output = "date       | week | name | type | count\n".to_owned();
    for record in records {
        output.push_str(&format!(
            "{} | w{} | {} | {} | {}\n",
            format_date(record.date),
            record.week,
            record.name,
            record.record_type,
            record.count
        ));
    }
    output.push_str(&format!("\n{} records", records.len()));
    output
}

fn format_statistics(stats: &MonthlyStatistics) -> String {
    let mut output = format!(
        "{} {} total: {} ({})\n",
        stats.month,
        stats.category.label(),
        stats.achievement.total,
        stats.achievement.summary()
    );

    output.push_str("\nWeekly:\n");
    for week in &stats.weekly {
        output.push_str(&format!("  w{}: {}\n", week.week, week.total));
    }

    if let Some(composition) = &stats.composition {
        output.push_str(&format!(
            "\nComposition: 新規 {} / 既存 {} / LINE {}\n",
            composition.new, composition.exist, composition.line
        ));
    }

    output.push_str("\nRanking:\n");
    for staff in &stats.ranking {
        output.push_str(&format!(
            "  {} | {} | {}\n",
            staff.rank_label(),
            staff.name,
            staff.total
        ));
    }

    output.push_str(&format!(
        "\n{} monthly: {:?}",
        stats.month.year(),
        stats.series
    ));
    output
}

impl CliAdapter {
    pub fn new(
        application_service: Option<Arc<dyn ApplicationService>>,
        secrets_path: String,
        today: NaiveDate,
    ) -> Self {
        Self {
            application_service,
            secrets_path,
            today,
        }
    }

    #[instrument]
    pub async fn run(&self, command: Command) -> Result<(), Box<dyn std::error::Error>> {
        match self.handle(command).await {
            Ok(result) => {
                println!("{}", result);
                info!("Command completed");
                Ok(())
            }
            Err(report) => {
                error!("Command failed: {:?}", report);
                Err(format!("Command failed: {:?}", report).into())
            }
        }
    }

    /// Parses everything after the program name; `--local` is stripped beforehand.
    pub fn parse_args(args: &[String]) -> Result<Command, CommandError> {
        match args.first().map(|s| s.as_str()) {
            Some("check") => Ok(Command::Check),
            Some("health") => Ok(Command::HealthCheck),
            Some("render") => {
                let page = arg(args, 1, "Page (men|women)")?;
                let page = page
                    .parse::<PageKind>()
                    .map_err(|_| invalid(format!("Unknown page: {}", page)))?;
                let input = args[2..]
                    .iter()
                    .map(|pair| parse_input(pair))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Command::Render { page, input })
            }
            Some("records") => {
                let name_filter = args.get(1).cloned().unwrap_or_default();
                let type_filter = match args.get(2) {
                    Some(value) => TypeFilter::parse(value)
                        .ok_or_else(|| invalid(format!("Unknown type filter: {}", value)))?,
                    None => TypeFilter::All,
                };
                Ok(Command::ListRecords {
                    name_filter,
                    type_filter,
                })
            }
            Some("add-app") => Ok(Command::AddApp {
                date: date_arg(args, 1)?,
                name: arg(args, 2, "Name")?.to_owned(),
                new: count_arg(args, 3, "New count")?,
                exist: count_arg(args, 4, "Exist count")?,
                line: count_arg(args, 5, "LINE count")?,
            }),
            Some("add-survey") => Ok(Command::AddSurvey {
                date: date_arg(args, 1)?,
                name: arg(args, 2, "Name")?.to_owned(),
                count: count_arg(args, 3, "Survey count")?,
            }),
            Some("delete") => Ok(Command::Delete {
                date: date_arg(args, 1)?,
                name: arg(args, 2, "Name")?.to_owned(),
                record_type: record_type_arg(arg(args, 3, "Record type")?)?,
            }),
            Some("target") => Ok(Command::Target {
                month: month_arg(arg(args, 1, "Month (YYYY-MM)")?)?,
                category: category_arg(args, 2)?,
                value: match args.get(3) {
                    Some(_) => Some(count_arg(args, 3, "Target")?),
                    None => None,
                },
            }),
            Some("stats") => Ok(Command::Stats {
                category: category_arg(args, 1)?,
                month: args.get(2).map(|value| month_arg(value)).transpose()?,
            }),
            Some(other) => Err(invalid(format!("Unknown command: {}\n\n{}", other, USAGE))),
            None => Err(invalid(USAGE)),
        }
    }

    fn service(&self) -> error_stack::Result<&Arc<dyn ApplicationService>, CommandError> {
        self.application_service.as_ref().ok_or_else(|| {
            error_stack::report!(CommandError::ExecutionFailed {
                details: "No record store was prepared for this command".to_string(),
            })
        })
    }
}

fn failed<E: std::fmt::Debug>(what: &'static str) -> impl FnOnce(E) -> CommandError {
    move |report| CommandError::ExecutionFailed {
        details: format!("{}: {:?}", what, report),
    }
}

#[async_trait::async_trait]
impl CommandHandler for CliAdapter {
    #[instrument]
    async fn handle(&self, command: Command) -> error_stack::Result<String, CommandError> {
        match command {
            Command::Check => {
                let config = AppConfig::load(&self.secrets_path).map_err(|e| {
                    CommandError::ExecutionFailed {
                        details: format!("Secret bundle is invalid: {:?}", e),
                    }
                })?;
                Ok(format!(
                    "✅ {} is valid\n  project: {}\n  service account: {}\n  spreadsheet: {}",
                    self.secrets_path,
                    config.service_account.project_id,
                    config.service_account.client_email,
                    config.sheets.spreadsheet_id()
                ))
            }
            Command::HealthCheck => {
                let health = self
                    .service()?
                    .health_check()
                    .await
                    .map_err(failed("Health check failed"))?;
                Ok(health)
            }
            Command::Render { page, input } => {
                let rendered = self
                    .service()?
                    .render_page(page, input.into_iter().collect::<HashMap<_, _>>(), self.today)
                    .await
                    .map_err(failed("Render failed"))?;
                Ok(TextRenderer::default().render(&rendered.page))
            }
            Command::ListRecords {
                name_filter,
                type_filter,
            } => {
                let records = self
                    .service()?
                    .records(&name_filter, type_filter)
                    .await
                    .map_err(failed("Listing records failed"))?;
                Ok(format_records(&records))
            }
            Command::AddApp {
                date,
                name,
                new,
                exist,
                line,
            } => {
                let outcome = self
                    .service()?
                    .submit_app(AppEntry {
                        selected_name: None,
                        typed_name: name,
                        date,
                        new,
                        exist,
                        line,
                    })
                    .await
                    .map_err(failed("Saving failed"))?;
                Ok(outcome.message().to_owned())
            }
            Command::AddSurvey { date, name, count } => {
                let outcome = self
                    .service()?
                    .submit_survey(SurveyEntry {
                        selected_name: None,
                        typed_name: name,
                        date,
                        count,
                    })
                    .await
                    .map_err(failed("Saving failed"))?;
                Ok(outcome.message().to_owned())
            }
            Command::Delete {
                date,
                name,
                record_type,
            } => {
                let outcome = self
                    .service()?
                    .delete_record(DeleteRequest {
                        date,
                        name,
                        record_type,
                    })
                    .await
                    .map_err(failed("Deleting failed"))?;
                Ok(outcome.message().to_owned())
            }
            Command::Target {
                month,
                category,
                value: Some(target),
            } => {
                self.service()?
                    .set_target(month, category, target)
                    .await
                    .map_err(failed("Saving target failed"))?;
                Ok(format!("✅ {} {} target set to {}", month, category.label(), target))
            }
            Command::Target {
                month,
                category,
                value: None,
            } => {
                let target = self
                    .service()?
                    .target(month, category)
                    .await
                    .map_err(failed("Reading target failed"))?;
                Ok(format!("{} {} target: {}", month, category.label(), target))
            }
            Command::Stats { category, month } => {
                let month = month.unwrap_or_else(|| YearMonth::of(self.today));
                let stats = self
                    .service()?
                    .statistics(category, month)
                    .await
                    .map_err(failed("Statistics failed"))?;
                Ok(format_statistics(&stats))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staff_stats_core::adapters::records::local_record_repository::LocalRecordRepository;
    use staff_stats_core::application::service::StaffStatsApplicationService;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_owned).collect()
    }

    fn local_adapter() -> CliAdapter {
        let service = StaffStatsApplicationService::new(Arc::new(LocalRecordRepository::new()));
        CliAdapter::new(
            Some(Arc::new(service)),
            "secrets.toml".to_owned(),
            parse_date("2024-05-15").unwrap(),
        )
    }

    #[test]
    fn test_parse_add_app() {
        let command = CliAdapter::parse_args(&args("add-app 2024-05-14 Ren 2 0 1")).unwrap();
        assert_eq!(
            command,
            Command::AddApp {
                date: parse_date("2024-05-14").unwrap(),
                name: "Ren".to_owned(),
                new: 2,
                exist: 0,
                line: 1,
            }
        );
    }

    #[test]
    fn test_parse_delete_accepts_label() {
        let command = CliAdapter::parse_args(&args("delete 2024-05-14 Ren LINE")).unwrap();
        assert!(
            matches!(
                command,
                Command::Delete {
                    record_type: RecordType::Line,
                    ..
                }
            ),
            "The sheet label should parse as a record type"
        );
    }

    #[test]
    fn test_parse_target_and_stats() {
        assert_eq!(
            CliAdapter::parse_args(&args("target 2024-05 survey 12")).unwrap(),
            Command::Target {
                month: "2024-05".parse().unwrap(),
                category: Category::Survey,
                value: Some(12),
            }
        );
        assert_eq!(
            CliAdapter::parse_args(&args("stats app")).unwrap(),
            Command::Stats {
                category: Category::App,
                month: None,
            }
        );
    }

    #[test]
    fn test_parse_render_input() {
        let command = CliAdapter::parse_args(&args(
            "render men app/form/name_text=Ren app/form/exist=4 app/form/date=2024-05-01 app/form/name_select=#1 app/form/submit=click",
        ))
        .unwrap();
        let Command::Render { page, input } = command else {
            panic!("Expected a render command");
        };
        assert_eq!(page, PageKind::Men);
        let values = input.into_iter().map(|(_, value)| value).collect::<Vec<_>>();
        assert_eq!(
            values,
            vec![
                InputValue::Text("Ren".into()),
                InputValue::Number(4),
                InputValue::Date(parse_date("2024-05-01").unwrap()),
                InputValue::Selected(1),
                InputValue::Clicked,
            ]
        );
    }

    #[test]
    fn test_parse_render_verbatim_text() {
        let command =
            CliAdapter::parse_args(&args("render men app/form/name_text=text:007")).unwrap();
        let Command::Render { input, .. } = command else {
            panic!("Expected a render command");
        };
        assert_eq!(
            input[0].1,
            InputValue::Text("007".into()),
            "The text: prefix should keep digits as text"
        );
    }

    #[tokio::test]
    async fn test_numeric_name_submitted_through_render() {
        let adapter = local_adapter();
        adapter
            .handle(
                CliAdapter::parse_args(&args(
                    "render men app/form/name_text=123 app/form/new=1 app/form/submit=click",
                ))
                .unwrap(),
            )
            .await
            .unwrap();
        let listed = adapter
            .handle(CliAdapter::parse_args(&args("records 123")).unwrap())
            .await
            .unwrap();
        assert!(listed.contains("| 123 | new | 1"), "{}", listed);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(CliAdapter::parse_args(&args("add-app 2024-13-01 Ren 1 0 0")).is_err());
        assert!(CliAdapter::parse_args(&args("add-survey 2024-05-01 Ren many")).is_err());
        assert!(CliAdapter::parse_args(&args("render men app//x=1")).is_err());
        assert!(CliAdapter::parse_args(&args("stats app 2024/05")).is_err());
        assert!(CliAdapter::parse_args(&args("frobnicate")).is_err());
        assert!(CliAdapter::parse_args(&[]).is_err());
    }

    #[tokio::test]
    async fn test_add_then_list_records() {
        let adapter = local_adapter();
        let saved = adapter
            .handle(CliAdapter::parse_args(&args("add-survey 2024-05-14 Aoi 3")).unwrap())
            .await
            .unwrap();
        assert_eq!(saved, "保存しました。");

        let listed = adapter
            .handle(CliAdapter::parse_args(&args("records aoi")).unwrap())
            .await
            .unwrap();
        assert!(listed.contains("2024-05-14 | w20 | Aoi | survey | 3"), "{}", listed);
        assert!(listed.ends_with("1 records"));
    }

    #[tokio::test]
    async fn test_render_women_page() {
        let adapter = local_adapter();
        let output = adapter
            .handle(Command::Render {
                page: PageKind::Women,
                input: Vec::new(),
            })
            .await
            .unwrap();
        assert!(output.contains("[goals/save]"), "{}", output);
    }

    #[tokio::test]
    async fn test_check_reports_invalid_bundle() {
        let adapter = CliAdapter::new(
            None,
            "/nonexistent/secrets.toml".to_owned(),
            parse_date("2024-05-15").unwrap(),
        );
        let report = adapter.handle(Command::Check).await.unwrap_err();
        assert!(matches!(
            report.current_context(),
            CommandError::ExecutionFailed { .. }
        ));
        assert!(adapter.handle(Command::HealthCheck).await.is_err());
    }
}
