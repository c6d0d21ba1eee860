use crate::auth::AuthError;
use crate::models::{User, UserRole};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

/// Tokens issued for one signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
    pub id_token: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    /// Expired, or about to expire within a minute.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(60) <= now
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, email: &str, password: &str) -> Result<TokenSet, AuthError>;
    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, AuthError>;
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "cognito:groups", default)]
    groups: Vec<String>,
}

/// Reads the user out of an ID token's payload. The signature is not
/// checked here; the backend verifies every token it receives.
pub fn user_from_id_token(id_token: &str) -> Result<User, AuthError> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| AuthError::InvalidToken("malformed token".to_string()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    let claims: IdTokenClaims =
        serde_json::from_slice(&bytes).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    let email = claims.email.unwrap_or_default();
    Ok(User {
        id: claims.sub,
        name: claims.name.unwrap_or_else(|| email.clone()),
        email,
        role: UserRole::from_group(claims.groups.first().map(String::as_str)),
    })
}

/// Cognito user pool client speaking the `InitiateAuth` JSON API.
pub struct CognitoProvider {
    http: reqwest::Client,
    endpoint: String,
    client_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    #[serde(default)]
    authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    challenge_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    id_token: String,
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct CognitoErrorBody {
    #[serde(rename = "__type", default)]
    kind: String,
    #[serde(default)]
    message: Option<String>,
}

impl CognitoProvider {
    pub fn new(region: &str, client_id: &str) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("https://cognito-idp.{}.amazonaws.com/", region),
            client_id: client_id.to_string(),
        })
    }

    async fn initiate_auth(
        &self,
        flow: &str,
        parameters: HashMap<&str, &str>,
    ) -> Result<InitiateAuthResponse, AuthError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/x-amz-json-1.1")
            .header(
                "X-Amz-Target",
                "AWSCognitoIdentityProviderService.InitiateAuth",
            )
            .json(&json!({
                "AuthFlow": flow,
                "ClientId": self.client_id,
                "AuthParameters": parameters,
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let error: CognitoErrorBody = serde_json::from_slice(&body).unwrap_or(CognitoErrorBody {
                kind: String::new(),
                message: None,
            });
            tracing::warn!("Cognito {} rejected: {} {:?}", flow, error.kind, error.message);
            return Err(match error.kind.as_str() {
                "NotAuthorizedException" | "UserNotFoundException" => AuthError::InvalidCredentials,
                "PasswordResetRequiredException" => AuthError::NewPasswordRequired,
                _ => AuthError::Provider(error.message.unwrap_or_else(|| status.to_string())),
            });
        }

        serde_json::from_slice(&body).map_err(|e| AuthError::Provider(e.to_string()))
    }

    fn token_set(
        response: InitiateAuthResponse,
        previous_refresh_token: Option<&str>,
    ) -> Result<TokenSet, AuthError> {
        if let Some(challenge) = response.challenge_name {
            return Err(match challenge.as_str() {
                "NEW_PASSWORD_REQUIRED" => AuthError::NewPasswordRequired,
                other => AuthError::Provider(format!("unsupported challenge {}", other)),
            });
        }
        let result = response
            .authentication_result
            .ok_or_else(|| AuthError::Provider("empty authentication result".to_string()))?;

        Ok(TokenSet {
            id_token: result.id_token,
            access_token: result.access_token,
            refresh_token: result
                .refresh_token
                .or_else(|| previous_refresh_token.map(str::to_string)),
            expires_at: Utc::now() + Duration::seconds(result.expires_in),
        })
    }
}

#[async_trait]
impl IdentityProvider for CognitoProvider {
    async fn authenticate(&self, email: &str, password: &str) -> Result<TokenSet, AuthError> {
        let parameters = HashMap::from([("USERNAME", email), ("PASSWORD", password)]);
        let response = self.initiate_auth("USER_PASSWORD_AUTH", parameters).await?;
        Self::token_set(response, None)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, AuthError> {
        let parameters = HashMap::from([("REFRESH_TOKEN", refresh_token)]);
        let response = self.initiate_auth("REFRESH_TOKEN_AUTH", parameters).await?;
        Self::token_set(response, Some(refresh_token))
    }
}

#[cfg(test)]
pub(crate) fn fake_id_token(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.sig", header, payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_user_from_claims() {
        let token = fake_id_token(json!({
            "sub": "u-1",
            "email": "tanaka@example.com",
            "name": "田中 太郎",
            "cognito:groups": ["manager"],
        }));
        let user = user_from_id_token(&token).unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(user.name, "田中 太郎");
        assert_eq!(user.role, UserRole::Manager);
    }

    #[test]
    fn name_and_role_have_fallbacks() {
        let token = fake_id_token(json!({ "sub": "u-2", "email": "sato@example.com" }));
        let user = user_from_id_token(&token).unwrap();
        assert_eq!(user.name, "sato@example.com");
        assert_eq!(user.role, UserRole::Staff);
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(matches!(
            user_from_id_token("not-a-jwt"),
            Err(AuthError::InvalidToken(_))
        ));
        assert!(matches!(
            user_from_id_token("a.@@@.c"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn new_password_challenge_is_reported() {
        let response = InitiateAuthResponse {
            authentication_result: None,
            challenge_name: Some("NEW_PASSWORD_REQUIRED".to_string()),
        };
        assert!(matches!(
            CognitoProvider::token_set(response, None),
            Err(AuthError::NewPasswordRequired)
        ));
    }

    #[test]
    fn refresh_keeps_previous_refresh_token() {
        let response = InitiateAuthResponse {
            authentication_result: Some(AuthenticationResult {
                id_token: "id".into(),
                access_token: "access".into(),
                refresh_token: None,
                expires_in: 3600,
            }),
            challenge_name: None,
        };
        let tokens = CognitoProvider::token_set(response, Some("keep-me")).unwrap();
        assert_eq!(tokens.refresh_token.as_deref(), Some("keep-me"));
        assert!(!tokens.is_expired(Utc::now()));
    }
}
