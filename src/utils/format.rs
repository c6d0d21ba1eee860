use crate::dashboard::orchestrator::SubmitError;
use crate::dashboard::sequencer::{ActionStatus, all_completed, next_action};
use crate::models::{AttendanceRecord, Availability, DailyReport, PreviousDayReport, User};
use crate::utils::time::{format_date_jp, format_time_jst};
use chrono::{DateTime, NaiveDate, Utc};
use poise::serenity_prelude as serenity;

const REPORT_PREVIEW_CHARS: usize = 80;

/// Room for a list inside an embed description (4096 characters), leaving
/// space for the omitted-count line.
const LIST_CHAR_LIMIT: usize = 3900;

fn time_or_placeholder(time: Option<DateTime<Utc>>) -> String {
    time.map(format_time_jst).unwrap_or_else(|| "--:--".to_string())
}

pub fn format_action_line(status: &ActionStatus) -> String {
    let icon = if status.completed {
        "✅"
    } else if status.enabled {
        "▶️"
    } else {
        "🔒"
    };
    format!("{} **{}**: {}", icon, status.label, status.description)
}

pub fn format_attendance_summary(
    record: Option<&AttendanceRecord>,
    statuses: &[ActionStatus],
) -> String {
    let Some(record) = record else {
        return "本日の勤怠記録はまだありません".to_string();
    };

    let mut summary = String::new();
    summary.push_str(&format!("**ステータス**: {}\n", record.status.label()));
    summary.push_str(&format!(
        "🌅 起床 {} / 🚃 出発 {} / 🏢 到着 {}\n\n",
        time_or_placeholder(record.wake_up_time),
        time_or_placeholder(record.departure_time),
        time_or_placeholder(record.arrival_time),
    ));

    for status in statuses {
        summary.push_str(&format_action_line(status));
        summary.push('\n');
    }

    if all_completed(statuses) {
        summary.push_str("\n🎉 **本日の報告はすべて完了しました！お疲れさまでした**");
    } else if let Some(next) = next_action(statuses) {
        summary.push_str(&format!("\n👉 次のアクション: **{}**", next.active_label));
    }

    summary
}

pub fn format_previous_day_summary(report: &PreviousDayReport) -> String {
    let mut summary = format!(
        "📅 **{}** 提出\n起床 {} / 出発 {} / 到着 {}",
        format_date_jp(report.report_date),
        report.next_wake_up_time.format("%H:%M"),
        report.next_departure_time.format("%H:%M"),
        report.next_arrival_time.format("%H:%M"),
    );
    if let Some(notes) = &report.notes {
        summary.push_str(&format!("\n📝 {}", notes));
    }
    summary
}

pub fn format_previous_day_history(reports: &[PreviousDayReport]) -> String {
    if reports.is_empty() {
        return "前日報告の履歴はありません".to_string();
    }

    let entries = reports
        .iter()
        .map(|report| format!("{}\n`ID: {}`", format_previous_day_summary(report), report.id))
        .collect();
    join_within_limit(entries, "\n\n")
}

/// Upcoming availabilities from `today` on, earliest first.
pub fn format_availability_list(availabilities: &[Availability], today: NaiveDate) -> String {
    let mut upcoming: Vec<&Availability> = availabilities
        .iter()
        .filter(|availability| availability.date >= today)
        .collect();
    if upcoming.is_empty() {
        return "登録済みの出社可能日はありません".to_string();
    }
    upcoming.sort_by_key(|availability| availability.date);

    let entries = upcoming
        .into_iter()
        .map(|availability| {
            let mut line = format!(
                "📅 **{}** {}",
                availability.date.format("%Y-%m-%d"),
                availability.worksite.name
            );
            if let Some(notes) = &availability.notes {
                line.push_str(&format!(" ({})", notes));
            }
            line.push('\n');
            line
        })
        .collect();
    join_within_limit(entries, "")
}

pub fn format_daily_report_list(reports: &[DailyReport]) -> String {
    if reports.is_empty() {
        return "日報はまだありません".to_string();
    }

    let entries = reports
        .iter()
        .map(|report| {
            let mut preview: String = report.content.chars().take(REPORT_PREVIEW_CHARS).collect();
            if report.content.chars().count() > REPORT_PREVIEW_CHARS {
                preview.push('…');
            }
            format!(
                "📝 **{}** [{}]\n> {}\n",
                report.date.format("%Y-%m-%d"),
                report.status.label(),
                preview.replace('\n', " ")
            )
        })
        .collect();
    join_within_limit(entries, "")
}

/// Concatenates entries until the next one would push the text past
/// [`LIST_CHAR_LIMIT`], then notes how many were left out.
fn join_within_limit(entries: Vec<String>, separator: &str) -> String {
    let total = entries.len();
    let mut list = String::new();
    let mut used = 0;
    for (shown, entry) in entries.into_iter().enumerate() {
        let cost = entry.chars().count() + if shown > 0 { separator.chars().count() } else { 0 };
        if used + cost > LIST_CHAR_LIMIT {
            list.push_str(&format!("\n…他{}件", total - shown));
            return list;
        }
        if shown > 0 {
            list.push_str(separator);
        }
        list.push_str(&entry);
        used += cost;
    }
    list
}

/// What the user sees when a dashboard operation fails.
pub fn format_submit_error(error: &SubmitError) -> String {
    if error.is_unauthorized() {
        return format_login_prompt();
    }
    format_error_message(&error.to_string())
}

pub fn format_login_prompt() -> String {
    format_info_message("ログインが必要です。`/login` でログインしてください")
}

pub fn format_user_line(user: &User) -> String {
    format!("{} ({})", user.name, user.role.label())
}

pub fn format_error_message(error: &str) -> String {
    format!("❌ **エラー**: {}", error)
}

pub fn format_success_message(message: &str) -> String {
    format!("✅ {}", message)
}

pub fn format_info_message(message: &str) -> String {
    format!("ℹ️ {}", message)
}

// Embed utility functions
pub fn create_success_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(0x00ff00) // Green
        .timestamp(chrono::Utc::now())
}

pub fn create_error_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(0xff0000) // Red
        .timestamp(chrono::Utc::now())
}

pub fn create_info_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(0x3498db) // Blue
        .timestamp(chrono::Utc::now())
}
