use crate::api::payloads::PhotoAttachment;
use crate::bot::commands::{reply_ephemeral, send_outcome, signed_in};
use crate::bot::{Context, Error};
use crate::dashboard::forms::PreviousDayEditForm;
use crate::dashboard::orchestrator::{Orchestrator, SubmitError};
use crate::models::HomeTab;
use crate::utils::format::{
    create_error_embed, create_info_embed, format_error_message, format_previous_day_history,
    format_previous_day_summary, format_submit_error,
};
use crate::utils::time::{format_datetime_jst, get_current_date_jst};
use poise::serenity_prelude as serenity;

const HISTORY_PAGE_SIZE: u32 = 10;

/// Downloads an attached photo so it can be uploaded to the backend.
async fn download_photo(
    attachment: Option<serenity::Attachment>,
) -> Result<Option<PhotoAttachment>, String> {
    let Some(attachment) = attachment else {
        return Ok(None);
    };

    let is_image = attachment
        .content_type
        .as_deref()
        .is_some_and(|content_type| content_type.starts_with("image/"));
    if !is_image {
        return Err(format!("{} は画像ファイルではありません", attachment.filename));
    }

    let data = attachment.download().await.map_err(|e| {
        tracing::error!("Failed to download attachment {}: {}", attachment.filename, e);
        "写真の読み込みに失敗しました".to_string()
    })?;

    Ok(Some(PhotoAttachment {
        filename: attachment.filename,
        content_type: attachment.content_type,
        data,
    }))
}

/// 前日報告（翌日の予定時刻と写真2枚）を送信します
#[poise::command(slash_command)]
pub async fn previous_day(
    ctx: Context<'_>,
    #[description = "起床予定時刻 (HH:MM)"] wake_up: String,
    #[description = "出発予定時刻 (HH:MM)"] departure: String,
    #[description = "到着予定時刻 (HH:MM)"] arrival: String,
    #[description = "身だしなみ写真"] appearance_photo: Option<serenity::Attachment>,
    #[description = "経路写真"] route_photo: Option<serenity::Attachment>,
    #[description = "備考"] notes: Option<String>,
) -> Result<(), Error> {
    let Some(user) = signed_in(ctx).await? else {
        return Ok(());
    };
    ctx.defer_ephemeral().await?;

    let photos = async {
        Ok::<_, String>((
            download_photo(appearance_photo).await?,
            download_photo(route_photo).await?,
        ))
    };
    let (appearance_photo, route_photo) = match photos.await {
        Ok(photos) => photos,
        Err(message) => return reply_ephemeral(ctx, format_error_message(&message)).await,
    };

    let discord_id = ctx.author().id.to_string();
    let data = ctx.data();
    let dashboard = data.dashboards.get(&discord_id).await;
    if let Err(e) = data
        .prepare_tab(&discord_id, &dashboard, HomeTab::Attendance)
        .await
    {
        return send_outcome(ctx, &user, &dashboard, Err(e)).await;
    }

    {
        let mut state = dashboard.lock().await;
        let form = &mut state.attendance.previous_day_form;
        form.next_wake_up_time = wake_up;
        form.next_departure_time = departure;
        form.next_arrival_time = arrival;
        form.notes = notes.unwrap_or_default();
        form.appearance_photo = appearance_photo;
        form.route_photo = route_photo;
    }

    let api = data.user_api(&discord_id);
    let outcome = Orchestrator::new(&api, &dashboard)
        .submit_previous_day(get_current_date_jst())
        .await
        .map(Some);

    send_outcome(ctx, &user, &dashboard, outcome).await
}

/// 提出済みの前日報告を修正します
#[poise::command(slash_command)]
pub async fn previous_day_edit(
    ctx: Context<'_>,
    #[description = "起床予定時刻 (HH:MM)"] wake_up: Option<String>,
    #[description = "出発予定時刻 (HH:MM)"] departure: Option<String>,
    #[description = "到着予定時刻 (HH:MM)"] arrival: Option<String>,
    #[description = "備考"] notes: Option<String>,
) -> Result<(), Error> {
    let Some(user) = signed_in(ctx).await? else {
        return Ok(());
    };

    let form = PreviousDayEditForm {
        next_wake_up_time: wake_up.unwrap_or_default(),
        next_departure_time: departure.unwrap_or_default(),
        next_arrival_time: arrival.unwrap_or_default(),
        notes: notes.unwrap_or_default(),
    };
    let update = match form.validate() {
        Ok(update) => update,
        Err(e) => return reply_ephemeral(ctx, format_error_message(&e.to_string())).await,
    };
    ctx.defer_ephemeral().await?;

    let discord_id = ctx.author().id.to_string();
    let data = ctx.data();
    let dashboard = data.dashboards.get(&discord_id).await;
    let api = data.user_api(&discord_id);

    let outcome = match data
        .prepare_tab(&discord_id, &dashboard, HomeTab::Attendance)
        .await
    {
        Ok(()) => Orchestrator::new(&api, &dashboard)
            .revise_previous_day(update)
            .await
            .map(Some),
        Err(e) => Err(e),
    };

    send_outcome(ctx, &user, &dashboard, outcome).await
}

/// 前日報告を取り消します（起床報告の前のみ）
#[poise::command(slash_command)]
pub async fn previous_day_withdraw(ctx: Context<'_>) -> Result<(), Error> {
    let Some(user) = signed_in(ctx).await? else {
        return Ok(());
    };
    ctx.defer_ephemeral().await?;

    let discord_id = ctx.author().id.to_string();
    let data = ctx.data();
    let dashboard = data.dashboards.get(&discord_id).await;
    let api = data.user_api(&discord_id);

    let outcome = match data
        .prepare_tab(&discord_id, &dashboard, HomeTab::Attendance)
        .await
    {
        Ok(()) => Orchestrator::new(&api, &dashboard)
            .withdraw_previous_day()
            .await
            .map(Some),
        Err(e) => Err(e),
    };

    send_outcome(ctx, &user, &dashboard, outcome).await
}

/// 前日報告の履歴を表示します
#[poise::command(slash_command)]
pub async fn previous_day_history(
    ctx: Context<'_>,
    #[description = "表示する報告のID"] id: Option<String>,
    #[description = "ページ番号（1から）"]
    #[min = 1]
    page: Option<u32>,
) -> Result<(), Error> {
    if signed_in(ctx).await?.is_none() {
        return Ok(());
    }
    ctx.defer_ephemeral().await?;

    let discord_id = ctx.author().id.to_string();
    let data = ctx.data();
    let dashboard = data.dashboards.get(&discord_id).await;
    let api = data.user_api(&discord_id);
    let orchestrator = Orchestrator::new(&api, &dashboard);

    let result: Result<serenity::CreateEmbed, SubmitError> = match id {
        Some(id) => orchestrator.previous_day_report(&id).await.map(|report| {
            create_info_embed("📅 前日報告", &format_previous_day_summary(&report))
                .field("身だしなみ写真", &report.appearance_photo_url, false)
                .field("経路写真", &report.route_photo_url, false)
                .field("提出日時", format_datetime_jst(report.created_at), false)
        }),
        None => {
            let page = page.unwrap_or(1).max(1);
            orchestrator
                .previous_day_history(HISTORY_PAGE_SIZE, (page - 1) * HISTORY_PAGE_SIZE)
                .await
                .map(|reports| {
                    create_info_embed("📚 前日報告の履歴", &format_previous_day_history(&reports))
                        .footer(serenity::CreateEmbedFooter::new(format!("{}ページ目", page)))
                })
        }
    };

    let embed = match result {
        Ok(embed) => embed,
        Err(e) => {
            if e.is_unauthorized() {
                data.forget(&discord_id).await;
            }
            create_error_embed("エラー", &format_submit_error(&e))
        }
    };
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
