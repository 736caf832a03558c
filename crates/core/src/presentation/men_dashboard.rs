use chrono::{Datelike, NaiveDate};
use strum::IntoEnumIterator;

use super::notice::Notice;
use crate::domain::records::calendar::{format_date, YearMonth};
use crate::domain::records::entry::{AppEntry, DeleteRequest, SurveyEntry};
use crate::domain::records::record::Record;
use crate::domain::records::record_type::{Category, RecordType};
use crate::domain::stats::aggregates::{
    composition, monthly_series, monthly_series_title, monthly_total, staff_ranking,
    weekly_totals, Achievement,
};
use crate::domain::stats::period::{
    default_year, month_options, period_options, year_options, Period, PeriodMode,
};
use crate::domain::stats::record_filter::{filter_records, TypeFilter};
use crate::domain::widgets::render_pass::{RenderPass, Scope};
use crate::domain::widgets::widget_id::WidgetError;

pub const TITLE: &str = "and st 統計記録 Team Men's";

/// Everything the men's page shows. Loaded once per render pass.
#[derive(Debug, Clone, Copy)]
pub struct MenDashboard<'a> {
    pub records: &'a [Record],
    pub names: &'a [String],
    pub app_target: i64,
    pub survey_target: i64,
    pub today: NaiveDate,
    pub notices: &'a [Notice],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenAction {
    SubmitApp(AppEntry),
    SubmitSurvey(SurveyEntry),
    SetTarget {
        month: YearMonth,
        category: Category,
        target: i64,
    },
    Delete(DeleteRequest),
    Refresh,
}

pub fn render(pass: &mut RenderPass, view: &MenDashboard<'_>) -> Result<Vec<MenAction>, WidgetError> {
    let mut actions = Vec::new();
    let mut root = pass.root();
    root.title(TITLE);
    for notice in view.notices {
        notice.show(&mut root);
    }

    {
        let mut tab = root.tab("app", "APP推薦紀錄")?;
        if let Some(entry) = app_form(&mut tab, view)? {
            actions.push(MenAction::SubmitApp(entry));
        }
        statistics(&mut tab, view, Category::App, &mut actions)?;
        if tab.button("refresh", "↻")? {
            actions.push(MenAction::Refresh);
        }
    }

    {
        let mut tab = root.tab("survey", "アンケート紀錄")?;
        if let Some(entry) = survey_form(&mut tab, view)? {
            actions.push(MenAction::SubmitSurvey(entry));
        }
        statistics(&mut tab, view, Category::Survey, &mut actions)?;
        if tab.button("refresh", "↻")? {
            actions.push(MenAction::Refresh);
        }
    }

    {
        let mut tab = root.tab("data", "データ管理")?;
        if let Some(request) = data_management(&mut tab, view)? {
            actions.push(MenAction::Delete(request));
        }
    }

    Ok(actions)
}

/// Select box over typed options; returns the selected option.
fn select_value<T: Copy + PartialEq>(
    scope: &mut Scope<'_>,
    key: &str,
    label: &str,
    options: &[T],
    default: T,
    show: impl Fn(&T) -> String,
) -> Result<T, WidgetError> {
    let labels = options.iter().map(&show).collect();
    let default_index = options.iter().position(|option| *option == default).unwrap_or(0);
    let index = scope.select_box(key, label, labels, default_index)?;
    Ok(options.get(index).copied().unwrap_or(default))
}

fn name_fields(
    form: &mut Scope<'_>,
    names: &[String],
) -> Result<(Option<String>, String), WidgetError> {
    let selected = if names.is_empty() {
        form.info("登録済みの名前がありません。下で新規入力してください。");
        None
    } else {
        let index = form.select_box("name_select", "スタッフ名（選択）", names.to_vec(), 0)?;
        form.caption("未登録の場合は下で新規入力");
        names.get(index).cloned()
    };
    let typed = form.text_input("name_text", "スタッフ名（新規入力）", "")?;
    Ok((selected, typed))
}

fn app_form(tab: &mut Scope<'_>, view: &MenDashboard<'_>) -> Result<Option<AppEntry>, WidgetError> {
    tab.subheader("and st 会員登録");
    let mut form = tab.form("form", "会員登録")?;
    let (selected_name, typed_name) = name_fields(&mut form, view.names)?;
    let date = form.date_input("date", "日付", view.today)?;
    let new = form.number_input("new", "新規（件）", 0, 0)?;
    let exist = form.number_input("exist", "既存（件）", 0, 0)?;
    let line = form.number_input("line", "LINE（件）", 0, 0)?;

    let submitted = form.form_submit("submit", "保存")?;
    Ok(submitted.then(|| AppEntry {
        selected_name,
        typed_name,
        date,
        new,
        exist,
        line,
    }))
}

fn survey_form(
    tab: &mut Scope<'_>,
    view: &MenDashboard<'_>,
) -> Result<Option<SurveyEntry>, WidgetError> {
    tab.subheader("アンケート");
    let mut form = tab.form("form", "アンケート")?;
    let (selected_name, typed_name) = name_fields(&mut form, view.names)?;
    let date = form.date_input("date", "日付", view.today)?;
    let count = form.number_input("count", "アンケート（件）", 0, 0)?;

    let submitted = form.form_submit("submit", "保存")?;
    Ok(submitted.then(|| SurveyEntry {
        selected_name,
        typed_name,
        date,
        count,
    }))
}

fn statistics(
    tab: &mut Scope<'_>,
    view: &MenDashboard<'_>,
    category: Category,
    actions: &mut Vec<MenAction>,
) -> Result<(), WidgetError> {
    let month = YearMonth::of(view.today);
    let target = match category {
        Category::App => view.app_target,
        Category::Survey => view.survey_target,
    };
    let achievement = Achievement {
        total: monthly_total(view.records, month, category),
        target,
    };

    tab.subheader(format!("{}（{}）", category.label(), month));
    tab.text(format!("今月累計：**{}** 件", achievement.total));
    match achievement.ratio() {
        Some(ratio) => tab.progress(ratio, achievement.summary()),
        None => tab.info(achievement.summary()),
    }

    {
        let mut popover = tab.expander("target", "🎯 目標を設定/更新")?;
        let value = popover.number_input("value", "今月目標", target, 0)?;
        if popover.button("save", &format!("保存（{}）", category.label()))? {
            actions.push(MenAction::SetTarget {
                month,
                category,
                target: value,
            });
        }
    }

    weekly_block(&mut tab.scope("weekly")?, view, category)?;
    if category == Category::App {
        composition_block(&mut tab.scope("composition")?, view)?;
    }
    staff_block(&mut tab.scope("staff")?, view, category)?;
    monthly_block(&mut tab.scope("monthly")?, view, category)?;
    Ok(())
}

fn year_select(block: &mut Scope<'_>, label: &str, view: &MenDashboard<'_>) -> Result<i32, WidgetError> {
    let years = year_options(view.records, view.today);
    let default = default_year(&years, view.today);
    select_value(block, "year", label, &years, default, |year| year.to_string())
}

fn period_picker(block: &mut Scope<'_>, view: &MenDashboard<'_>) -> Result<(i32, PeriodMode, Period), WidgetError> {
    let year = year_select(block, "年", view)?;
    let modes = PeriodMode::iter().collect::<Vec<_>>();
    let mode = select_value(block, "period_type", "対象期間", &modes, PeriodMode::Week, |mode| {
        mode.label().to_owned()
    })?;
    let (options, default) = period_options(view.records, mode, year, view.today);
    let period = select_value(block, "period", "表示する期間", &options, default, Period::label)?;
    Ok((year, mode, period))
}

fn weekly_block(block: &mut Scope<'_>, view: &MenDashboard<'_>, category: Category) -> Result<(), WidgetError> {
    block.subheader("週別合計");
    let year = year_select(block, "年（週集計）", view)?;
    let (months, default_month) = month_options(view.records, year, view.today);
    let month = select_value(block, "month", "月", &months, default_month, |month| month.to_string())?;

    let weekly = weekly_totals(view.records, month, category);
    if weekly.is_empty() {
        block.info("この月のデータがありません。");
    } else {
        block.caption(format!("表示中：{}年・{}", year, month));
        let rows = weekly
            .iter()
            .map(|total| vec![format!("w{}", total.week), total.total.to_string()])
            .collect();
        block.table(&["w", "合計"], rows);
    }
    Ok(())
}

fn composition_block(block: &mut Scope<'_>, view: &MenDashboard<'_>) -> Result<(), WidgetError> {
    block.subheader("構成比（新規・既存・LINE）");
    let (year, mode, period) = period_picker(block, view)?;

    let parts = composition(view.records, period);
    if parts.total() > 0 {
        block.caption(match mode {
            PeriodMode::Year => format!("表示中：{}年", year),
            _ => format!("表示中：{}年・{}", year, period.label()),
        });
        block.pie_chart(
            [RecordType::New, RecordType::Exist, RecordType::Line]
                .iter()
                .map(|record_type| record_type.label().to_owned())
                .collect(),
            vec![parts.new, parts.exist, parts.line],
        );
    } else {
        block.info("対象データがありません。");
    }
    Ok(())
}

fn staff_block(block: &mut Scope<'_>, view: &MenDashboard<'_>, category: Category) -> Result<(), WidgetError> {
    block.subheader("スタッフ別 合計");
    let (year, mode, period) = period_picker(block, view)?;
    block.caption(match mode {
        PeriodMode::Year => format!("（{}年・年合計）", year),
        _ => format!("（{}年・{}）", year, period.label()),
    });

    let ranking = staff_ranking(view.records, category, period);
    if ranking.is_empty() {
        block.info("対象データがありません。");
    } else {
        let rows = ranking
            .iter()
            .map(|staff| vec![staff.rank_label(), staff.name.clone(), staff.total.to_string()])
            .collect();
        block.table(&["順位", "スタッフ", "合計"], rows);
    }
    Ok(())
}

fn monthly_block(block: &mut Scope<'_>, view: &MenDashboard<'_>, category: Category) -> Result<(), WidgetError> {
    block.subheader("月別累計（年次）");
    let year = year_select(block, "年を選択", view)?;

    let has_data = view
        .records
        .iter()
        .any(|record| record.date.year() == year && category.includes(record.record_type));
    if !has_data {
        block.info("対象データがありません。");
        return Ok(());
    }

    let labels = (1..=12)
        .filter_map(|month| YearMonth::new(year, month))
        .map(|month| month.abbreviation().to_owned())
        .collect();
    block.bar_chart(
        monthly_series_title(category, year),
        labels,
        monthly_series(view.records, year, category).to_vec(),
    );
    Ok(())
}

fn data_management(
    tab: &mut Scope<'_>,
    view: &MenDashboard<'_>,
) -> Result<Option<DeleteRequest>, WidgetError> {
    tab.subheader("📋 データ管理");
    if view.records.is_empty() {
        tab.info("現在、データが登録されていません。");
        return Ok(None);
    }

    {
        let mut search = tab.expander("view", "🔍 データを表示・検索")?;
        let name_filter = search.text_input("name_filter", "名前フィルター（空白で全件）", "")?;
        let filters = TypeFilter::options();
        let type_filter = select_value(&mut search, "type", "タイプ", &filters, TypeFilter::All, |filter| {
            filter.label().to_owned()
        })?;

        let rows = filter_records(view.records, &name_filter, type_filter)
            .into_iter()
            .map(|record| {
                vec![
                    format_date(record.date),
                    record.name,
                    record.record_type.label().to_owned(),
                    record.count.to_string(),
                ]
            })
            .collect();
        search.table(&["date", "name", "タイプ", "count"], rows);
    }

    let mut delete = tab.expander("delete", "🗑️ データを削除")?;
    delete.text("削除したい日付・名前・タイプを選択してください。");
    let date = delete.date_input("date", "日付（削除対象）", view.today)?;
    let name = delete.text_input("name", "名前（削除対象）", "")?;
    let types = RecordType::iter().collect::<Vec<_>>();
    let record_type = select_value(&mut delete, "type", "タイプ（削除対象）", &types, RecordType::New, |record_type| {
        record_type.label().to_owned()
    })?;

    let clicked = delete.button("submit", "⚠️ このデータを削除する")?;
    Ok(clicked.then(|| DeleteRequest {
        date,
        name: name.trim().to_owned(),
        record_type,
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::records::calendar::parse_date;
    use crate::domain::widgets::element::{ElementKind, InputValue};
    use crate::domain::widgets::render_pass::Page;
    use crate::domain::widgets::widget_id::WidgetId;

    fn id(path: &str) -> WidgetId {
        WidgetId::from_segments(&path.split('/').collect::<Vec<_>>()).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn sample_records() -> Vec<Record> {
        vec![
            Record::new(date("2024-05-14"), "佐藤", RecordType::New, 3),
            Record::new(date("2024-05-14"), "田中", RecordType::Exist, 5),
            Record::new(date("2024-05-15"), "佐藤", RecordType::Line, 1),
            Record::new(date("2024-05-15"), "田中", RecordType::Survey, 2),
            Record::new(date("2024-03-02"), "佐藤", RecordType::New, 4),
        ]
    }

    fn render_with(
        records: &[Record],
        names: &[String],
        input: HashMap<WidgetId, InputValue>,
    ) -> (Page, Vec<MenAction>) {
        let view = MenDashboard {
            records,
            names,
            app_target: 20,
            survey_target: 0,
            today: date("2024-05-15"),
            notices: &[],
        };
        let mut pass = RenderPass::with_input(input);
        let actions = render(&mut pass, &view).unwrap();
        (pass.finish(), actions)
    }

    fn table_rows<'a>(page: &'a Page, first_column: &str) -> Vec<&'a Vec<Vec<String>>> {
        page.elements
            .iter()
            .filter_map(|element| match &element.kind {
                ElementKind::Table { columns, rows } if columns[0] == first_column => Some(rows),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_ids_are_semantic_and_stable() {
        let records = sample_records();
        let names = vec!["佐藤".to_string(), "田中".to_string()];
        let (first, _) = render_with(&records, &names, HashMap::new());
        let (second, _) = render_with(&records, &names, HashMap::new());

        assert_eq!(first.ids(), second.ids(), "Re-render should yield identical ids");
        for expected in [
            "app/form/name_select",
            "app/form/submit",
            "app/weekly/year",
            "app/weekly/month",
            "app/composition/period",
            "app/staff/period_type",
            "survey/staff/period_type",
            "survey/target/save",
            "data/delete/submit",
        ] {
            assert!(first.find(expected).is_some(), "Missing control {}", expected);
        }
        assert!(
            first.find("survey/composition/year").is_none(),
            "Composition is only shown for APP"
        );
    }

    #[test]
    fn test_no_names_offers_text_input_only() {
        let (page, _) = render_with(&[], &[], HashMap::new());
        assert!(page.find("app/form/name_select").is_none());
        assert!(page.find("app/form/name_text").is_some());
        assert!(page.find("data/delete/submit").is_none(), "Nothing to delete without data");
    }

    #[test]
    fn test_app_form_submission() {
        let input = HashMap::from([
            (id("app/form/name_text"), InputValue::Text("Ren".into())),
            (id("app/form/new"), InputValue::Number(2)),
            (id("app/form/line"), InputValue::Number(-4)),
            (id("app/form/submit"), InputValue::Clicked),
        ]);
        let (_, actions) = render_with(&[], &[], input);
        assert_eq!(
            actions,
            vec![MenAction::SubmitApp(AppEntry {
                selected_name: None,
                typed_name: "Ren".into(),
                date: date("2024-05-15"),
                new: 2,
                exist: 0,
                line: 0,
            })],
            "Negative counts should be clamped to zero"
        );
    }

    #[test]
    fn test_survey_target_save() {
        let input = HashMap::from([
            (id("survey/target/value"), InputValue::Number(30)),
            (id("survey/target/save"), InputValue::Clicked),
        ]);
        let (_, actions) = render_with(&sample_records(), &[], input);
        assert_eq!(
            actions,
            vec![MenAction::SetTarget {
                month: "2024-05".parse().unwrap(),
                category: Category::Survey,
                target: 30,
            }]
        );
    }

    #[test]
    fn test_staff_ranking_has_crown() {
        let (page, _) = render_with(&sample_records(), &[], HashMap::new());
        let tables = table_rows(&page, "順位");
        assert_eq!(tables.len(), 2, "One ranking per statistics tab");
        assert_eq!(
            tables[0][0],
            vec!["1 👑".to_string(), "田中".to_string(), "5".to_string()]
        );
        assert_eq!(tables[0][1][0], "2");
    }

    #[test]
    fn test_progress_and_unset_target() {
        let (page, _) = render_with(&sample_records(), &[], HashMap::new());
        let progress = page
            .elements
            .iter()
            .find_map(|element| match &element.kind {
                ElementKind::Progress { ratio, text } => Some((*ratio, text.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(progress, (0.45, "目標 20 件・達成率 45.0%".to_string()));
        assert!(page
            .elements
            .iter()
            .any(|element| element.kind == ElementKind::Info("目標未設定".into())));
    }

    #[test]
    fn test_data_filter_and_delete() {
        let input = HashMap::from([
            (id("data/view/name_filter"), InputValue::Text("佐".into())),
            (id("data/delete/name"), InputValue::Text(" 佐藤 ".into())),
            (id("data/delete/type"), InputValue::Selected(2)),
            (id("data/delete/submit"), InputValue::Clicked),
        ]);
        let (page, actions) = render_with(&sample_records(), &[], input);

        let tables = table_rows(&page, "date");
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].len(), 3, "Only 佐藤's records should be listed");
        assert_eq!(tables[0][0][0], "2024-05-15", "Newest first");

        assert_eq!(
            actions,
            vec![MenAction::Delete(DeleteRequest {
                date: date("2024-05-15"),
                name: "佐藤".into(),
                record_type: RecordType::Line,
            })]
        );
    }

    #[test]
    fn test_monthly_chart() {
        let (page, _) = render_with(&sample_records(), &[], HashMap::new());
        let chart = page
            .elements
            .iter()
            .find_map(|element| match &element.kind {
                ElementKind::BarChart { title, labels, values } => {
                    Some((title.clone(), labels.clone(), values.clone()))
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(chart.0, "and st Monthly totals (2024)");
        assert_eq!(chart.1[0], "Jan");
        assert_eq!(chart.2[2], 4);
        assert_eq!(chart.2[4], 9);
    }
}
