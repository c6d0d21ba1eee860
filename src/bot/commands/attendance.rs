use crate::bot::commands::{show_dashboard, signed_in};
use crate::bot::{Context, Error};
use crate::models::HomeTab;

/// 本日の勤怠報告を表示します
#[poise::command(slash_command)]
pub async fn attendance(ctx: Context<'_>) -> Result<(), Error> {
    let Some(user) = signed_in(ctx).await? else {
        return Ok(());
    };

    show_dashboard(ctx, &user, HomeTab::Attendance).await
}
