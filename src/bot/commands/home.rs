use crate::bot::commands::{reply_ephemeral, show_dashboard, signed_in};
use crate::bot::{Context, Error};
use crate::dashboard::tabs::{Landing, landing_for};
use crate::utils::format::format_info_message;

pub(crate) const MANAGER_NOTICE: &str =
    "マネージャー向けの画面はこのボットでは提供していません。管理画面をご利用ください";

/// ホーム画面を表示します
#[poise::command(slash_command)]
pub async fn home(ctx: Context<'_>) -> Result<(), Error> {
    let Some(user) = signed_in(ctx).await? else {
        return Ok(());
    };

    match landing_for(user.role) {
        Landing::Manager => reply_ephemeral(ctx, format_info_message(MANAGER_NOTICE)).await,
        Landing::Tab(tab) => show_dashboard(ctx, &user, tab).await,
    }
}
