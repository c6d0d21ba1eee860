pub mod cognito;

use crate::database::queries;
use crate::models::{Credentials, User};
use chrono::Utc;
use cognito::{IdentityProvider, TokenSet, user_from_id_token};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;

/// Login failures. Every message is safe to show to the user.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("メールアドレスまたはパスワードが正しくありません")]
    InvalidCredentials,
    #[error("新しいパスワードの設定が必要です")]
    NewPasswordRequired,
    #[error("ログインに失敗しました: {0}")]
    Provider(String),
    #[error("ログインに失敗しました: {0}")]
    Http(#[from] reqwest::Error),
    #[error("トークンを読み取れませんでした: {0}")]
    InvalidToken(String),
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub tokens: TokenSet,
}

/// Who is signed in, per Discord user. Built once at startup and handed to
/// everything that needs it.
pub struct AuthContext {
    provider: Arc<dyn IdentityProvider>,
    pool: SqlitePool,
    sessions: RwLock<HashMap<String, Session>>,
    loading: AtomicBool,
}

impl AuthContext {
    pub fn new(provider: Arc<dyn IdentityProvider>, pool: SqlitePool) -> Self {
        Self {
            provider,
            pool,
            sessions: RwLock::new(HashMap::new()),
            loading: AtomicBool::new(true),
        }
    }

    /// True until the stored sessions have been restored.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Loads the session mirror. Entries that cannot be read, or whose
    /// tokens expired with no way to refresh them, count as signed out.
    pub async fn restore(&self) {
        let stored = match queries::get_all_sessions(&self.pool).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Failed to read stored sessions: {}", e);
                self.loading.store(false, Ordering::Release);
                return;
            }
        };

        let now = Utc::now();
        let mut restored = HashMap::new();
        for entry in stored {
            let (Some(access_token), Some(user_profile)) = (entry.access_token, entry.user_profile)
            else {
                continue;
            };
            let tokens: TokenSet = match serde_json::from_str(&access_token) {
                Ok(tokens) => tokens,
                Err(e) => {
                    tracing::warn!("Unreadable token set for discord_id={}: {}", entry.discord_id, e);
                    continue;
                }
            };
            let user: User = match serde_json::from_str(&user_profile) {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!("Unreadable profile for discord_id={}: {}", entry.discord_id, e);
                    continue;
                }
            };
            if tokens.is_expired(now) && tokens.refresh_token.is_none() {
                continue;
            }
            restored.insert(entry.discord_id, Session { user, tokens });
        }

        tracing::info!("Restored {} session(s)", restored.len());
        *self.sessions.write().await = restored;
        self.loading.store(false, Ordering::Release);
    }

    pub async fn current_user(&self, discord_id: &str) -> Option<User> {
        self.sessions
            .read()
            .await
            .get(discord_id)
            .map(|session| session.user.clone())
    }

    pub async fn is_authenticated(&self, discord_id: &str) -> bool {
        self.sessions.read().await.contains_key(discord_id)
    }

    pub async fn login(
        &self,
        discord_id: &str,
        credentials: &Credentials,
    ) -> Result<User, AuthError> {
        let tokens = self
            .provider
            .authenticate(credentials.email.trim(), &credentials.password)
            .await?;
        let user = user_from_id_token(&tokens.id_token)?;

        self.store(discord_id, Session {
            user: user.clone(),
            tokens,
        })
        .await;

        tracing::info!(
            "User {} ({}) signed in from discord_id={}",
            user.id,
            user.role.as_str(),
            discord_id
        );
        Ok(user)
    }

    /// Drops the session from memory and from the mirror.
    pub async fn logout(&self, discord_id: &str) {
        self.sessions.write().await.remove(discord_id);
        if let Err(e) = queries::delete_session(&self.pool, discord_id).await {
            tracing::error!("Failed to clear stored session for discord_id={}: {}", discord_id, e);
        }
    }

    /// ID token for outbound requests, refreshed when it has expired.
    /// A failed refresh signs the user out.
    pub async fn id_token(&self, discord_id: &str) -> Option<String> {
        let session = self.sessions.read().await.get(discord_id).cloned()?;
        if !session.tokens.is_expired(Utc::now()) {
            return Some(session.tokens.id_token);
        }

        let Some(refresh_token) = session.tokens.refresh_token.as_deref() else {
            self.logout(discord_id).await;
            return None;
        };

        match self.provider.refresh(refresh_token).await {
            Ok(tokens) => {
                let id_token = tokens.id_token.clone();
                self.store(discord_id, Session {
                    user: session.user,
                    tokens,
                })
                .await;
                Some(id_token)
            }
            Err(e) => {
                tracing::warn!("Token refresh failed for discord_id={}: {}", discord_id, e);
                self.logout(discord_id).await;
                None
            }
        }
    }

    async fn store(&self, discord_id: &str, session: Session) {
        match (
            serde_json::to_string(&session.tokens),
            serde_json::to_string(&session.user),
        ) {
            (Ok(access_token), Ok(user_profile)) => {
                if let Err(e) =
                    queries::save_session(&self.pool, discord_id, &access_token, &user_profile).await
                {
                    tracing::warn!("Failed to persist session for discord_id={}: {}", discord_id, e);
                }
            }
            _ => tracing::warn!("Failed to serialize session for discord_id={}", discord_id),
        }

        self.sessions
            .write()
            .await
            .insert(discord_id.to_string(), session);
    }
}
