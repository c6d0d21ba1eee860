pub mod commands;
pub mod handlers;
pub mod interactions;
pub mod views;

use crate::api::{ApiClient, UserApi};
use crate::auth::AuthContext;
use crate::auth::cognito::CognitoProvider;
use crate::config::Config;
use crate::dashboard::orchestrator::{Orchestrator, SubmitError};
use crate::dashboard::{Dashboard, DashboardStore};
use crate::database;
use crate::models::{HomeTab, User};
use crate::utils::format::{format_info_message, format_login_prompt};
use crate::utils::time::get_current_date_jst;
use anyhow::Result;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

pub(crate) const SESSION_LOADING: &str =
    "セッションを確認しています。少し待ってから再度お試しください";

#[derive(Clone)]
pub struct Data {
    pub auth: Arc<AuthContext>,
    pub api: ApiClient,
    pub dashboards: Arc<DashboardStore>,
}

impl Data {
    /// The signed-in user behind a Discord account, or the message to show
    /// instead of the dashboard.
    pub async fn session_user(&self, discord_id: &str) -> Result<User, String> {
        if self.auth.is_loading() {
            return Err(format_info_message(SESSION_LOADING));
        }
        self.auth
            .current_user(discord_id)
            .await
            .ok_or_else(format_login_prompt)
    }

    /// Drops what is held for a user whose session ended.
    pub async fn forget(&self, discord_id: &str) {
        self.dashboards.remove(discord_id).await;
    }

    pub fn user_api(&self, discord_id: &str) -> UserApi {
        self.api.for_user(discord_id)
    }

    /// Makes `tab` the active one and loads whatever it needs. Today's
    /// record is fetched for every tab.
    pub async fn prepare_tab(
        &self,
        discord_id: &str,
        dashboard: &Mutex<Dashboard>,
        tab: HomeTab,
    ) -> Result<(), SubmitError> {
        dashboard.lock().await.switch_tab(tab);

        let api = self.user_api(discord_id);
        let orchestrator = Orchestrator::new(&api, dashboard);
        orchestrator.load_today(get_current_date_jst()).await?;

        let (shifts_loaded, reports_loaded) = {
            let state = dashboard.lock().await;
            (state.shifts.loaded, state.reports.loaded)
        };
        match tab {
            HomeTab::Shifts if !shifts_loaded => orchestrator.load_shifts().await?,
            HomeTab::Reports if !reports_loaded => orchestrator.load_reports().await?,
            _ => {}
        }
        Ok(())
    }
}

pub async fn create_bot(config: Config) -> Result<serenity::Client> {
    let pool = database::create_connection(&config.database_url).await?;

    let provider = CognitoProvider::new(&config.cognito_region, &config.cognito_client_id)?;
    let auth = Arc::new(AuthContext::new(Arc::new(provider), pool.clone()));
    let api = ApiClient::new(&config, auth.clone())?;

    let restoring = auth.clone();
    tokio::spawn(async move {
        restoring.restore().await;
    });

    let data = Data {
        auth,
        api,
        dashboards: Arc::new(DashboardStore::new()),
    };

    let intents = serenity::GatewayIntents::non_privileged();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::login::login(),
                commands::login::logout(),
                commands::home::home(),
                commands::attendance::attendance(),
                commands::shifts::shifts(),
                commands::reports::reports(),
                commands::previous_day::previous_day(),
                commands::previous_day::previous_day_edit(),
                commands::previous_day::previous_day_withdraw(),
                commands::previous_day::previous_day_history(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(handlers::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    Ok(client)
}
