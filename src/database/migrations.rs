use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    create_stored_sessions_table(pool).await?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// Session mirror: the serialized token set and user profile per Discord
/// user. A NULL in either column means the user is signed out.
async fn create_stored_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stored_sessions (
            discord_id TEXT PRIMARY KEY,
            access_token TEXT,
            user_profile TEXT,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
