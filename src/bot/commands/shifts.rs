use crate::bot::commands::{show_dashboard, signed_in};
use crate::bot::{Context, Error};
use crate::models::HomeTab;

/// 出社可能日の一覧と登録画面を表示します
#[poise::command(slash_command)]
pub async fn shifts(ctx: Context<'_>) -> Result<(), Error> {
    let Some(user) = signed_in(ctx).await? else {
        return Ok(());
    };

    show_dashboard(ctx, &user, HomeTab::Shifts).await
}
