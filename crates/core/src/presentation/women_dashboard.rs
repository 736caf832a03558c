use chrono::NaiveDate;

use super::notice::Notice;
use crate::domain::goals::weekly_goals::{
    achievement_rate, weekly_total, IsoWeek, TestRecord, WeeklyGoals,
};
use crate::domain::records::calendar::format_date;
use crate::domain::widgets::render_pass::RenderPass;
use crate::domain::widgets::widget_id::WidgetError;

pub const TITLE: &str = "and st 女生組";

#[derive(Debug, Clone, Copy)]
pub struct WomenDashboard<'a> {
    pub goals: &'a WeeklyGoals,
    pub test_records: &'a [TestRecord],
    pub today: NaiveDate,
    pub notices: &'a [Notice],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WomenAction {
    SaveWeeklyTarget { week: IsoWeek, target: i64 },
    ClearWeeklyTarget(IsoWeek),
    AddTestRecord(TestRecord),
}

pub fn render(
    pass: &mut RenderPass,
    view: &WomenDashboard<'_>,
) -> Result<Vec<WomenAction>, WidgetError> {
    let mut actions = Vec::new();
    let mut root = pass.root();
    root.title(TITLE);
    for notice in view.notices {
        notice.show(&mut root);
    }

    {
        let mut tab = root.tab("goals", "📌 週目標設定")?;
        tab.subheader("週目標設定（Local Memory）");
        let picked = tab.date_input("date", "選擇任意一日（用來判定週數）", view.today)?;
        let week = IsoWeek::of(picked);
        tab.text(format!("ISO 週：**{}**", week.label()));

        let target = tab.number_input("target", "本週目標（件）", view.goals.get(week), 0)?;
        if tab.button("save", "💾 儲存 / 更新本週目標")? {
            actions.push(WomenAction::SaveWeeklyTarget { week, target });
        }
        if tab.button("clear", "🗑️ 清除本週目標")? {
            actions.push(WomenAction::ClearWeeklyTarget(week));
        }

        if !view.goals.is_empty() {
            tab.subheader("目前已設定的週目標");
            let rows = view
                .goals
                .iter()
                .map(|(week, target)| vec![week.label(), format!("{} 件", target)])
                .collect();
            tab.table(&["週", "目標"], rows);
        }
    }

    {
        let mut tab = root.tab("rate", "📈 當週達成率")?;
        tab.subheader("當週達成率");
        let week = IsoWeek::of(view.today);
        let target = view.goals.get(week);
        let actual = weekly_total(view.test_records, week);
        tab.metric("本週目標", format!("{} 件", target));
        tab.metric("本週實績", format!("{} 件", actual));
        tab.metric("達成率", format!("{:.1}%", achievement_rate(actual, target)));
        tab.caption("※ 週的判定採用 ISO 週（週一開始）。");
    }

    {
        let mut tab = root.tab("test", "📝 測試紀錄（可選）")?;
        tab.subheader("測試紀錄（僅本地記憶體）");
        let date = tab.date_input("date", "日期", view.today)?;
        let staff = tab.text_input("staff", "員工姓名", "")?;
        let new = tab.number_input("new", "新規（App）件數", 0, 0)?;
        let exist = tab.number_input("exist", "既存（App）件數", 0, 0)?;
        let line = tab.number_input("line", "LINE 件數", 0, 0)?;
        if tab.button("add", "➕ 新增一筆測試紀錄")? {
            actions.push(WomenAction::AddTestRecord(TestRecord {
                date,
                staff: staff.trim().to_owned(),
                new,
                exist,
                line,
            }));
        }

        if !view.test_records.is_empty() {
            tab.subheader("當前測試紀錄");
            let rows = view
                .test_records
                .iter()
                .map(|record| {
                    let week = IsoWeek::of(record.date);
                    vec![
                        format_date(record.date),
                        record.staff.clone(),
                        record.new.to_string(),
                        record.exist.to_string(),
                        record.line.to_string(),
                        record.total().to_string(),
                        format!("{}-{}", week.year, week.week),
                    ]
                })
                .collect();
            tab.table(&["日期", "員工", "新規", "既存", "LINE", "合計", "ISO週"], rows);
        }
    }

    Ok(actions)
}
