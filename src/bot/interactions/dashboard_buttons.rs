use crate::bot::Data;
use crate::bot::Error;
use crate::bot::commands::home::MANAGER_NOTICE;
use crate::bot::views::{
    DashboardAction, LOGIN_MODAL, REPORT_MODAL, SHIFT_MODAL, dashboard_view, report_modal,
    shift_modal,
};
use crate::dashboard::Dashboard;
use crate::dashboard::orchestrator::{Orchestrator, SubmitError};
use crate::dashboard::tabs::{Landing, landing_for};
use crate::models::{ActionType, Credentials, User};
use crate::utils::format::{
    format_error_message, format_info_message, format_submit_error, format_success_message,
};
use crate::utils::time::{capture_timestamp, get_current_date_jst};
use poise::serenity_prelude as serenity;
use tokio::sync::Mutex;

async fn respond_ephemeral(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    content: String,
) -> Result<(), Error> {
    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

/// Re-renders the dashboard message in place.
async fn update_dashboard(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    user: &User,
    dashboard: &Mutex<Dashboard>,
) -> Result<(), Error> {
    let (embed, components) = dashboard_view(&*dashboard.lock().await, user);
    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::UpdateMessage(
                serenity::CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .components(components),
            ),
        )
        .await?;
    Ok(())
}

/// What a deferred interaction edits into its message once the operation
/// has finished, plus an optional follow-up notice.
async fn outcome_edit(
    data: &Data,
    discord_id: &str,
    user: &User,
    dashboard: &Mutex<Dashboard>,
    outcome: Result<Option<String>, SubmitError>,
) -> (serenity::EditInteractionResponse, Option<String>) {
    let notice = match outcome {
        Ok(message) => message.map(|m| format_success_message(&m)),
        Err(e) if e.is_unauthorized() => {
            data.forget(discord_id).await;
            let edit = serenity::EditInteractionResponse::new()
                .content(format_submit_error(&e))
                .embeds(vec![])
                .components(vec![]);
            return (edit, None);
        }
        Err(e) => Some(format_submit_error(&e)),
    };

    let (embed, components) = dashboard_view(&*dashboard.lock().await, user);
    let edit = serenity::EditInteractionResponse::new()
        .embed(embed)
        .components(components);
    (edit, notice)
}

/// An interaction whose response was deferred and is edited once the
/// operation has finished.
#[derive(Clone, Copy)]
enum Deferred<'a> {
    Component(&'a serenity::ComponentInteraction),
    Modal(&'a serenity::ModalInteraction),
}

impl Deferred<'_> {
    async fn edit(
        self,
        ctx: &serenity::Context,
        edit: serenity::EditInteractionResponse,
    ) -> Result<(), Error> {
        match self {
            Deferred::Component(interaction) => interaction.edit_response(&ctx.http, edit).await?,
            Deferred::Modal(interaction) => interaction.edit_response(&ctx.http, edit).await?,
        };
        Ok(())
    }

    async fn followup(self, ctx: &serenity::Context, notice: Option<String>) -> Result<(), Error> {
        let Some(notice) = notice else {
            return Ok(());
        };
        let followup = serenity::CreateInteractionResponseFollowup::new()
            .content(notice)
            .ephemeral(true);
        match self {
            Deferred::Component(interaction) => {
                interaction.create_followup(&ctx.http, followup).await?
            }
            Deferred::Modal(interaction) => interaction.create_followup(&ctx.http, followup).await?,
        };
        Ok(())
    }

    /// Edits the message with the outcome and sends the notice.
    async fn finish(
        self,
        ctx: &serenity::Context,
        data: &Data,
        discord_id: &str,
        user: &User,
        dashboard: &Mutex<Dashboard>,
        outcome: Result<Option<String>, SubmitError>,
    ) -> Result<(), Error> {
        let (edit, notice) = outcome_edit(data, discord_id, user, dashboard, outcome).await;
        self.edit(ctx, edit).await?;
        self.followup(ctx, notice).await
    }
}

pub async fn handle_dashboard_interaction(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some(action) = DashboardAction::parse(&interaction.data.custom_id) else {
        return respond_ephemeral(ctx, interaction, "未対応の操作です".to_string()).await;
    };

    let discord_id = interaction.user.id.to_string();
    let user = match data.session_user(&discord_id).await {
        Ok(user) => user,
        Err(message) => return respond_ephemeral(ctx, interaction, message).await,
    };
    let dashboard = data.dashboards.get(&discord_id).await;

    match action {
        DashboardAction::Tab(tab) => {
            interaction.defer(&ctx.http).await?;
            let outcome = data
                .prepare_tab(&discord_id, &dashboard, tab)
                .await
                .map(|_| None);
            Deferred::Component(interaction)
                .finish(ctx, data, &discord_id, &user, &dashboard, outcome)
                .await
        }
        DashboardAction::Stage(ActionType::PreviousDay) => {
            dashboard.lock().await.attendance.active_action = Some(ActionType::PreviousDay);
            update_dashboard(ctx, interaction, &user, &dashboard).await
        }
        DashboardAction::Stage(ActionType::Report) => {
            let modal = {
                let mut state = dashboard.lock().await;
                state.open_report_form();
                report_modal(&state.reports.form)
            };
            interaction
                .create_response(&ctx.http, serenity::CreateInteractionResponse::Modal(modal))
                .await?;
            Ok(())
        }
        DashboardAction::Stage(stage) => {
            interaction.defer(&ctx.http).await?;
            let api = data.user_api(&discord_id);
            let outcome = Orchestrator::new(&api, &dashboard)
                .submit_stage(stage, capture_timestamp())
                .await
                .map(Some);
            Deferred::Component(interaction)
                .finish(ctx, data, &discord_id, &user, &dashboard, outcome)
                .await
        }
        DashboardAction::ShiftOpen => {
            dashboard.lock().await.shifts.form.visible = true;
            update_dashboard(ctx, interaction, &user, &dashboard).await
        }
        DashboardAction::ShiftCancel => {
            dashboard.lock().await.shifts.form.cancel();
            update_dashboard(ctx, interaction, &user, &dashboard).await
        }
        DashboardAction::ShiftWorksite => {
            let selected = match &interaction.data.kind {
                serenity::ComponentInteractionDataKind::StringSelect { values } => {
                    values.first().cloned()
                }
                _ => None,
            };
            let modal = {
                let mut state = dashboard.lock().await;
                state.shifts.form.selected_worksite = selected;
                shift_modal(&state.shifts.form, get_current_date_jst())
            };
            interaction
                .create_response(&ctx.http, serenity::CreateInteractionResponse::Modal(modal))
                .await?;
            Ok(())
        }
        DashboardAction::ReportOpen => {
            let modal = {
                let mut state = dashboard.lock().await;
                state.open_report_form();
                report_modal(&state.reports.form)
            };
            interaction
                .create_response(&ctx.http, serenity::CreateInteractionResponse::Modal(modal))
                .await?;
            Ok(())
        }
        DashboardAction::ReportCancel => {
            dashboard.lock().await.reports.form.cancel();
            update_dashboard(ctx, interaction, &user, &dashboard).await
        }
    }
}

fn modal_value<'a>(interaction: &'a serenity::ModalInteraction, custom_id: &str) -> &'a str {
    interaction
        .data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .find_map(|component| match component {
            serenity::ActionRowComponent::InputText(input) if input.custom_id == custom_id => {
                input.value.as_deref()
            }
            _ => None,
        })
        .unwrap_or("")
}

pub async fn handle_dashboard_modal(
    ctx: &serenity::Context,
    interaction: &serenity::ModalInteraction,
    data: &Data,
) -> Result<(), Error> {
    match interaction.data.custom_id.as_str() {
        LOGIN_MODAL => handle_login_modal(ctx, interaction, data).await,
        SHIFT_MODAL => handle_shift_modal(ctx, interaction, data).await,
        REPORT_MODAL => handle_report_modal(ctx, interaction, data).await,
        _ => {
            interaction
                .create_response(
                    &ctx.http,
                    serenity::CreateInteractionResponse::Message(
                        serenity::CreateInteractionResponseMessage::new()
                            .content("未対応の操作です")
                            .ephemeral(true),
                    ),
                )
                .await?;
            Ok(())
        }
    }
}

async fn handle_login_modal(
    ctx: &serenity::Context,
    interaction: &serenity::ModalInteraction,
    data: &Data,
) -> Result<(), Error> {
    interaction.defer_ephemeral(&ctx.http).await?;

    let discord_id = interaction.user.id.to_string();
    let credentials = Credentials {
        email: modal_value(interaction, "email").to_string(),
        password: modal_value(interaction, "password").to_string(),
    };

    let user = match data.auth.login(&discord_id, &credentials).await {
        Ok(user) => user,
        Err(e) => {
            interaction
                .edit_response(
                    &ctx.http,
                    serenity::EditInteractionResponse::new()
                        .content(format_error_message(&e.to_string())),
                )
                .await?;
            return Ok(());
        }
    };

    let greeting = format_success_message(&format!("{} さん、ようこそ！", user.name));
    match landing_for(user.role) {
        Landing::Manager => {
            interaction
                .edit_response(
                    &ctx.http,
                    serenity::EditInteractionResponse::new().content(format!(
                        "{}\n{}",
                        greeting,
                        format_info_message(MANAGER_NOTICE)
                    )),
                )
                .await?;
            Ok(())
        }
        Landing::Tab(tab) => {
            data.forget(&discord_id).await;
            let dashboard = data.dashboards.get(&discord_id).await;
            let outcome = data
                .prepare_tab(&discord_id, &dashboard, tab)
                .await
                .map(|_| None);
            let (edit, notice) = outcome_edit(data, &discord_id, &user, &dashboard, outcome).await;
            interaction.edit_response(&ctx.http, edit.content(greeting)).await?;
            Deferred::Modal(interaction).followup(ctx, notice).await
        }
    }
}

async fn handle_shift_modal(
    ctx: &serenity::Context,
    interaction: &serenity::ModalInteraction,
    data: &Data,
) -> Result<(), Error> {
    let discord_id = interaction.user.id.to_string();
    let user = match data.session_user(&discord_id).await {
        Ok(user) => user,
        Err(message) => return respond_modal_ephemeral(ctx, interaction, message).await,
    };
    interaction.defer(&ctx.http).await?;

    let dashboard = data.dashboards.get(&discord_id).await;
    {
        let mut state = dashboard.lock().await;
        state.shifts.form.selected_date = modal_value(interaction, "date").to_string();
        state.shifts.form.notes = modal_value(interaction, "notes").to_string();
    }

    let api = data.user_api(&discord_id);
    let outcome = Orchestrator::new(&api, &dashboard)
        .submit_availability(get_current_date_jst())
        .await
        .map(Some);
    Deferred::Modal(interaction)
        .finish(ctx, data, &discord_id, &user, &dashboard, outcome)
        .await
}

async fn handle_report_modal(
    ctx: &serenity::Context,
    interaction: &serenity::ModalInteraction,
    data: &Data,
) -> Result<(), Error> {
    let discord_id = interaction.user.id.to_string();
    let user = match data.session_user(&discord_id).await {
        Ok(user) => user,
        Err(message) => return respond_modal_ephemeral(ctx, interaction, message).await,
    };
    interaction.defer(&ctx.http).await?;

    let dashboard = data.dashboards.get(&discord_id).await;
    dashboard.lock().await.reports.form.content = modal_value(interaction, "content").to_string();

    let api = data.user_api(&discord_id);
    let outcome = Orchestrator::new(&api, &dashboard)
        .submit_daily_report(get_current_date_jst())
        .await
        .map(Some);
    Deferred::Modal(interaction)
        .finish(ctx, data, &discord_id, &user, &dashboard, outcome)
        .await
}

async fn respond_modal_ephemeral(
    ctx: &serenity::Context,
    interaction: &serenity::ModalInteraction,
    content: String,
) -> Result<(), Error> {
    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}
