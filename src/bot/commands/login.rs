use crate::bot::commands::reply_ephemeral;
use crate::bot::views::login_modal;
use crate::bot::{Context, Error, SESSION_LOADING};
use crate::utils::format::{create_success_embed, format_info_message};
use poise::serenity_prelude as serenity;

/// ログインします
#[poise::command(slash_command)]
pub async fn login(ctx: Context<'_>) -> Result<(), Error> {
    let discord_id = ctx.author().id.to_string();
    let auth = &ctx.data().auth;

    if auth.is_loading() {
        return reply_ephemeral(ctx, format_info_message(SESSION_LOADING)).await;
    }

    if let Some(user) = auth.current_user(&discord_id).await {
        return reply_ephemeral(
            ctx,
            format_info_message(&format!(
                "既に {} としてログインしています。`/home` で画面を開けます",
                user.name
            )),
        )
        .await;
    }

    let poise::Context::Application(app_ctx) = ctx else {
        return Ok(());
    };
    app_ctx
        .interaction
        .create_response(
            ctx.serenity_context(),
            serenity::CreateInteractionResponse::Modal(login_modal()),
        )
        .await?;

    Ok(())
}

/// ログアウトします
#[poise::command(slash_command)]
pub async fn logout(ctx: Context<'_>) -> Result<(), Error> {
    let discord_id = ctx.author().id.to_string();
    let data = ctx.data();

    if data.auth.is_loading() {
        return reply_ephemeral(ctx, format_info_message(SESSION_LOADING)).await;
    }
    if !data.auth.is_authenticated(&discord_id).await {
        return reply_ephemeral(ctx, format_info_message("ログインしていません")).await;
    }

    data.auth.logout(&discord_id).await;
    data.forget(&discord_id).await;
    tracing::info!("discord_id={} signed out", discord_id);

    let embed = create_success_embed("ログアウト", "ログアウトしました");
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
