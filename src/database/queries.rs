use crate::database::models::StoredSession;
use anyhow::Result;
use sqlx::{Row, SqlitePool};

pub async fn save_session(
    pool: &SqlitePool,
    discord_id: &str,
    access_token: &str,
    user_profile: &str,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO stored_sessions (discord_id, access_token, user_profile, updated_at)
         VALUES (?, ?, ?, CURRENT_TIMESTAMP)
         ON CONFLICT(discord_id) DO UPDATE SET
            access_token = excluded.access_token,
            user_profile = excluded.user_profile,
            updated_at = CURRENT_TIMESTAMP",
    )
    .bind(discord_id)
    .bind(access_token)
    .bind(user_profile)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_all_sessions(pool: &SqlitePool) -> Result<Vec<StoredSession>> {
    let rows = sqlx::query(
        "SELECT discord_id, access_token, user_profile, updated_at
         FROM stored_sessions
         ORDER BY updated_at DESC",
    )
    .fetch_all(pool)
    .await?;

    let sessions = rows
        .into_iter()
        .map(|row| StoredSession {
            discord_id: row.get("discord_id"),
            access_token: row.get("access_token"),
            user_profile: row.get("user_profile"),
            updated_at: row.get("updated_at"),
        })
        .collect();

    Ok(sessions)
}

pub async fn get_session(pool: &SqlitePool, discord_id: &str) -> Result<Option<StoredSession>> {
    let row = sqlx::query(
        "SELECT discord_id, access_token, user_profile, updated_at
         FROM stored_sessions WHERE discord_id = ?",
    )
    .bind(discord_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| StoredSession {
        discord_id: row.get("discord_id"),
        access_token: row.get("access_token"),
        user_profile: row.get("user_profile"),
        updated_at: row.get("updated_at"),
    }))
}

pub async fn delete_session(pool: &SqlitePool, discord_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM stored_sessions WHERE discord_id = ?")
        .bind(discord_id)
        .execute(pool)
        .await?;

    Ok(())
}
