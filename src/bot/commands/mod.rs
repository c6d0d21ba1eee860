pub mod attendance;
pub mod home;
pub mod login;
pub mod previous_day;
pub mod reports;
pub mod shifts;

use crate::bot::views::dashboard_view;
use crate::bot::{Context, Error};
use crate::dashboard::Dashboard;
use crate::dashboard::orchestrator::SubmitError;
use crate::models::{HomeTab, User};
use crate::utils::format::{format_submit_error, format_success_message};
use tokio::sync::Mutex;

pub(crate) async fn reply_ephemeral(
    ctx: Context<'_>,
    content: impl Into<String>,
) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(content.into())
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// The caller's signed-in user. Replies with the reason and returns `None`
/// when there is none.
pub(crate) async fn signed_in(ctx: Context<'_>) -> Result<Option<User>, Error> {
    let discord_id = ctx.author().id.to_string();
    match ctx.data().session_user(&discord_id).await {
        Ok(user) => Ok(Some(user)),
        Err(message) => {
            reply_ephemeral(ctx, message).await?;
            Ok(None)
        }
    }
}

/// Replies with the rendered dashboard, prefixed by `notice` when given.
pub(crate) async fn send_dashboard(
    ctx: Context<'_>,
    user: &User,
    dashboard: &Mutex<Dashboard>,
    notice: Option<String>,
) -> Result<(), Error> {
    let (embed, components) = dashboard_view(&*dashboard.lock().await, user);
    let mut reply = poise::CreateReply::default()
        .embed(embed)
        .components(components)
        .ephemeral(true);
    if let Some(notice) = notice {
        reply = reply.content(notice);
    }
    ctx.send(reply).await?;
    Ok(())
}

/// Answers an operation's outcome together with the refreshed dashboard.
pub(crate) async fn send_outcome(
    ctx: Context<'_>,
    user: &User,
    dashboard: &Mutex<Dashboard>,
    outcome: Result<Option<String>, SubmitError>,
) -> Result<(), Error> {
    let notice = match outcome {
        Ok(message) => message.map(|m| format_success_message(&m)),
        Err(e) if e.is_unauthorized() => {
            ctx.data().forget(&ctx.author().id.to_string()).await;
            return reply_ephemeral(ctx, format_submit_error(&e)).await;
        }
        Err(e) => Some(format_submit_error(&e)),
    };
    send_dashboard(ctx, user, dashboard, notice).await
}

/// Opens the dashboard on `tab` after loading what it shows.
pub(crate) async fn show_dashboard(
    ctx: Context<'_>,
    user: &User,
    tab: HomeTab,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let discord_id = ctx.author().id.to_string();
    let data = ctx.data();
    let dashboard = data.dashboards.get(&discord_id).await;
    let outcome = data
        .prepare_tab(&discord_id, &dashboard, tab)
        .await
        .map(|_| None);

    send_outcome(ctx, user, &dashboard, outcome).await
}
