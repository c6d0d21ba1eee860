use crate::bot::commands::{show_dashboard, signed_in};
use crate::bot::{Context, Error};
use crate::models::HomeTab;

/// 日報の一覧と作成画面を表示します
#[poise::command(slash_command)]
pub async fn reports(ctx: Context<'_>) -> Result<(), Error> {
    let Some(user) = signed_in(ctx).await? else {
        return Ok(());
    };

    show_dashboard(ctx, &user, HomeTab::Reports).await
}
