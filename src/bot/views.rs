//! Turns dashboard state into Discord embeds, components and modals.

use crate::dashboard::Dashboard;
use crate::dashboard::forms::{ReportForm, ShiftForm};
use crate::dashboard::sequencer::ActionStatus;
use crate::models::{ActionType, HomeTab, User, Worksite};
use crate::utils::format::{
    format_attendance_summary, format_availability_list, format_daily_report_list,
    format_previous_day_summary, format_user_line,
};
use crate::utils::time::get_current_date_jst;
use chrono::NaiveDate;
use poise::serenity_prelude as serenity;

pub const LOGIN_MODAL: &str = "login_modal";
pub const SHIFT_MODAL: &str = "shift_modal";
pub const REPORT_MODAL: &str = "report_modal";

// Discord select menu limit
const MAX_SELECT_OPTIONS: usize = 25;

/// Buttons and menus on a dashboard message, keyed by custom id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    Tab(HomeTab),
    Stage(ActionType),
    ShiftOpen,
    ShiftCancel,
    ShiftWorksite,
    ReportOpen,
    ReportCancel,
}

impl DashboardAction {
    pub fn custom_id(&self) -> String {
        match self {
            DashboardAction::Tab(tab) => format!("tab:{}", tab.as_str()),
            DashboardAction::Stage(action) => format!("stage:{}", action.as_str()),
            DashboardAction::ShiftOpen => "shift:open".to_string(),
            DashboardAction::ShiftCancel => "shift:cancel".to_string(),
            DashboardAction::ShiftWorksite => "shift:worksite".to_string(),
            DashboardAction::ReportOpen => "report:open".to_string(),
            DashboardAction::ReportCancel => "report:cancel".to_string(),
        }
    }

    pub fn parse(custom_id: &str) -> Option<Self> {
        match custom_id.split_once(':')? {
            ("tab", tab) => HomeTab::parse(tab).map(DashboardAction::Tab),
            ("stage", action) => ActionType::parse(action).map(DashboardAction::Stage),
            ("shift", "open") => Some(DashboardAction::ShiftOpen),
            ("shift", "cancel") => Some(DashboardAction::ShiftCancel),
            ("shift", "worksite") => Some(DashboardAction::ShiftWorksite),
            ("report", "open") => Some(DashboardAction::ReportOpen),
            ("report", "cancel") => Some(DashboardAction::ReportCancel),
            _ => None,
        }
    }
}

fn button(action: DashboardAction, label: &str) -> serenity::CreateButton {
    serenity::CreateButton::new(action.custom_id()).label(label)
}

fn tab_row(active: HomeTab) -> serenity::CreateActionRow {
    let buttons = HomeTab::ALL
        .into_iter()
        .map(|tab| {
            let style = if tab == active {
                serenity::ButtonStyle::Primary
            } else {
                serenity::ButtonStyle::Secondary
            };
            button(DashboardAction::Tab(tab), tab.label())
                .style(style)
                .disabled(tab == active)
        })
        .collect();
    serenity::CreateActionRow::Buttons(buttons)
}

fn stage_button(status: &ActionStatus, submitting: bool) -> serenity::CreateButton {
    let (label, style) = if status.completed {
        (format!("✅ {}", status.label), serenity::ButtonStyle::Secondary)
    } else if submitting && status.enabled {
        ("⏳ 送信中...".to_string(), serenity::ButtonStyle::Secondary)
    } else if status.enabled {
        (status.active_label.to_string(), serenity::ButtonStyle::Success)
    } else {
        (status.label.to_string(), serenity::ButtonStyle::Secondary)
    };
    button(DashboardAction::Stage(status.action_type), &label)
        .style(style)
        .disabled(!status.enabled || submitting)
}

fn attendance_view(
    dashboard: &Dashboard,
) -> (serenity::CreateEmbed, Vec<serenity::CreateActionRow>) {
    let attendance = &dashboard.attendance;
    let statuses = attendance.statuses();

    let mut embed = serenity::CreateEmbed::new()
        .title("📋 勤怠報告")
        .description(format_attendance_summary(attendance.record.as_ref(), &statuses))
        .color(0x3498db);
    if let Some(record) = &attendance.record {
        embed = embed.footer(serenity::CreateEmbedFooter::new(
            record.date.format("%Y年%m月%d日").to_string(),
        ));
    }
    if let Some(report) = &attendance.latest_previous_day {
        embed = embed.field("前日報告", format_previous_day_summary(report), false);
    }
    if attendance.active_action == Some(ActionType::PreviousDay) {
        embed = embed.field(
            "前日報告の入力",
            "`/previous_day` で予定時刻と写真2枚（身だしなみ・経路）を送信してください",
            false,
        );
    }

    let mut components = Vec::new();
    if !statuses.is_empty() {
        let buttons = statuses
            .iter()
            .map(|status| stage_button(status, attendance.is_submitting()))
            .collect();
        components.push(serenity::CreateActionRow::Buttons(buttons));
    }
    (embed, components)
}

fn shifts_view(dashboard: &Dashboard) -> (serenity::CreateEmbed, Vec<serenity::CreateActionRow>) {
    let shifts = &dashboard.shifts;
    let embed = serenity::CreateEmbed::new()
        .title("📅 出社可能日")
        .description(format_availability_list(
            &shifts.availabilities,
            get_current_date_jst(),
        ))
        .color(0x2ecc71);

    let mut components = Vec::new();
    if shifts.form.visible {
        if let Some(menu) = worksite_select(&shifts.worksites, shifts.form.selected_worksite.as_deref())
        {
            components.push(serenity::CreateActionRow::SelectMenu(menu));
        }
        components.push(serenity::CreateActionRow::Buttons(vec![
            button(DashboardAction::ShiftCancel, "❌ キャンセル")
                .style(serenity::ButtonStyle::Secondary),
        ]));
    } else {
        components.push(serenity::CreateActionRow::Buttons(vec![
            button(DashboardAction::ShiftOpen, "➕ 出社可能日を登録")
                .style(serenity::ButtonStyle::Success)
                .disabled(shifts.submitting.is_set()),
        ]));
    }
    (embed, components)
}

fn reports_view(dashboard: &Dashboard) -> (serenity::CreateEmbed, Vec<serenity::CreateActionRow>) {
    let reports = &dashboard.reports;
    let embed = serenity::CreateEmbed::new()
        .title("📝 日報")
        .description(format_daily_report_list(&reports.reports))
        .color(0x9b59b6);

    let submitting = reports.submitting.is_set();
    let mut buttons = vec![
        button(
            DashboardAction::ReportOpen,
            if submitting { "⏳ 送信中..." } else { "✏️ 日報を作成" },
        )
        .style(serenity::ButtonStyle::Success)
        .disabled(submitting),
    ];
    if reports.form.visible {
        buttons.push(
            button(DashboardAction::ReportCancel, "❌ キャンセル")
                .style(serenity::ButtonStyle::Secondary),
        );
    }
    (embed, vec![serenity::CreateActionRow::Buttons(buttons)])
}

/// The whole dashboard message for the active tab.
pub fn dashboard_view(
    dashboard: &Dashboard,
    user: &User,
) -> (serenity::CreateEmbed, Vec<serenity::CreateActionRow>) {
    let (embed, mut components) = match dashboard.active_tab {
        HomeTab::Attendance => attendance_view(dashboard),
        HomeTab::Shifts => shifts_view(dashboard),
        HomeTab::Reports => reports_view(dashboard),
    };
    components.insert(0, tab_row(dashboard.active_tab));

    let embed = embed
        .author(serenity::CreateEmbedAuthor::new(format_user_line(user)))
        .timestamp(chrono::Utc::now());
    (embed, components)
}

pub fn worksite_select(
    worksites: &[Worksite],
    selected: Option<&str>,
) -> Option<serenity::CreateSelectMenu> {
    if worksites.is_empty() {
        return None;
    }

    let options = worksites
        .iter()
        .take(MAX_SELECT_OPTIONS)
        .map(|worksite| {
            let mut option = serenity::CreateSelectMenuOption::new(&worksite.name, &worksite.id)
                .default_selection(selected == Some(worksite.id.as_str()));
            if let Some(address) = &worksite.address {
                option = option.description(address);
            }
            option
        })
        .collect();

    Some(
        serenity::CreateSelectMenu::new(
            DashboardAction::ShiftWorksite.custom_id(),
            serenity::CreateSelectMenuKind::String { options },
        )
        .placeholder("現場を選択してください"),
    )
}

fn input_row(input: serenity::CreateInputText) -> serenity::CreateActionRow {
    serenity::CreateActionRow::InputText(input)
}

pub fn login_modal() -> serenity::CreateModal {
    serenity::CreateModal::new(LOGIN_MODAL, "ログイン").components(vec![
        input_row(
            serenity::CreateInputText::new(
                serenity::InputTextStyle::Short,
                "メールアドレス",
                "email",
            )
            .placeholder("you@example.com")
            .required(true),
        ),
        input_row(
            serenity::CreateInputText::new(serenity::InputTextStyle::Short, "パスワード", "password")
                .required(true),
        ),
    ])
}

pub fn shift_modal(form: &ShiftForm, today: NaiveDate) -> serenity::CreateModal {
    let date = if form.selected_date.is_empty() {
        today.format("%Y-%m-%d").to_string()
    } else {
        form.selected_date.clone()
    };

    serenity::CreateModal::new(SHIFT_MODAL, "出社可能日を登録").components(vec![
        input_row(
            serenity::CreateInputText::new(serenity::InputTextStyle::Short, "日付", "date")
                .placeholder("YYYY-MM-DD 形式で入力 (例: 2025-12-24)")
                .value(date)
                .required(true)
                .max_length(10),
        ),
        input_row(
            serenity::CreateInputText::new(serenity::InputTextStyle::Paragraph, "備考", "notes")
                .value(form.notes.clone())
                .required(false),
        ),
    ])
}

pub fn report_modal(form: &ReportForm) -> serenity::CreateModal {
    serenity::CreateModal::new(REPORT_MODAL, "日報を作成").components(vec![input_row(
        serenity::CreateInputText::new(serenity::InputTextStyle::Paragraph, "日報内容", "content")
            .placeholder("本日の業務内容を入力してください")
            .value(form.content.clone())
            .required(true),
    )])
}
