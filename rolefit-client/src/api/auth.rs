//! Authentication: the only module that writes to the token store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::timestamp;
use crate::transport::ApiClient;

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
    pub refresh_token: Option<String>,
    /// Seconds until `access_token` expires.
    pub expires_in: Option<u64>,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

pub struct Auth<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Auth<'_> {
    /// Exchange credentials for a token and persist it.
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        let response: TokenResponse = self.client.post(&["auth", "login"], credentials).await?;
        self.client.tokens().save(&response.access_token)?;
        info!(user = %response.user.username, role = %response.user.role, "logged in");
        Ok(response)
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, registration: &Registration) -> Result<User, ApiError> {
        self.client.post(&["auth", "register"], registration).await
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        self.client.get(&["auth", "me"]).await
    }

    /// Trade a refresh token for a new access token and persist it.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, ApiError> {
        let response: TokenResponse = self
            .client
            .post(&["auth", "refresh"], &RefreshRequest { refresh_token })
            .await?;
        self.client.tokens().save(&response.access_token)?;
        debug!("access token refreshed");
        Ok(response)
    }

    /// Notify the backend, then drop the local token whatever it answered.
    pub async fn logout(&self) -> Result<(), ApiError> {
        match self.client.request(reqwest::Method::POST, &["auth", "logout"]) {
            Ok(builder) => {
                if let Err(e) = self.client.execute(builder).await {
                    debug!("logout notification failed: {e}");
                }
            }
            Err(e) => debug!("logout notification skipped: {e}"),
        }
        self.client.tokens().clear()?;
        info!("logged out");
        Ok(())
    }
}
