use anyhow::Result;
use std::env;

const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_url: String,
    pub api_url: String,
    pub cognito_user_pool_id: String,
    pub cognito_client_id: String,
    pub cognito_region: String,
    pub api_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN environment variable is required"))?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:okiteru.db".to_string());

        let api_url = env::var("API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());

        let cognito_user_pool_id = env::var("COGNITO_USER_POOL_ID")
            .map_err(|_| anyhow::anyhow!("COGNITO_USER_POOL_ID environment variable is required"))?;

        let cognito_client_id = env::var("COGNITO_CLIENT_ID")
            .map_err(|_| anyhow::anyhow!("COGNITO_CLIENT_ID environment variable is required"))?;

        let cognito_region = match env::var("COGNITO_REGION") {
            Ok(region) => region,
            Err(_) => region_from_pool_id(&cognito_user_pool_id).ok_or_else(|| {
                anyhow::anyhow!("COGNITO_REGION is required when the user pool id has no region prefix")
            })?,
        };

        let api_timeout_secs = match env::var("API_TIMEOUT_SECS") {
            Ok(value) => value
                .parse()
                .map_err(|_| anyhow::anyhow!("API_TIMEOUT_SECS must be a whole number of seconds"))?,
            Err(_) => DEFAULT_API_TIMEOUT_SECS,
        };

        Ok(Config {
            discord_token,
            database_url,
            api_url,
            cognito_user_pool_id,
            cognito_client_id,
            cognito_region,
            api_timeout_secs,
        })
    }
}

/// User pool ids look like `ap-northeast-1_AbCdEf123`.
fn region_from_pool_id(pool_id: &str) -> Option<String> {
    pool_id
        .split_once('_')
        .map(|(region, _)| region)
        .filter(|region| !region.is_empty())
        .map(str::to_string)
}
