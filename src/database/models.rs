use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct StoredSession {
    pub discord_id: String,
    pub access_token: Option<String>,
    pub user_profile: Option<String>,
    pub updated_at: DateTime<Utc>,
}
