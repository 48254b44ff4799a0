//! Account API: wire types, the HTTP adapter, and the validating service
//! layered over it

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use stagecraft_common::AccountApiConfig;

use crate::error::{E2eError, E2eResult};

static UPPERCASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]").expect("valid pattern"));
static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]").expect("valid pattern"));
static SPECIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[!@#$%^&*]").expect("valid pattern"));

/// Minimum password length accepted by [`AccountService`]
pub const MIN_PASSWORD_LEN: usize = 6;

/// Credentials for a new account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "userName")]
    pub user_name: String,
    pub password: String,
}

impl User {
    pub fn new(user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            password: password.into(),
        }
    }
}

/// Body returned when an account is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreationResponse {
    #[serde(rename = "userID", default)]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub books: Vec<Value>,
}

/// Remote-call capability for account management
#[async_trait]
pub trait AccountApi: Send + Sync {
    async fn create_user(&self, user: &User) -> E2eResult<UserCreationResponse>;
}

#[async_trait]
impl<T: AccountApi + ?Sized> AccountApi for Arc<T> {
    async fn create_user(&self, user: &User) -> E2eResult<UserCreationResponse> {
        (**self).create_user(user).await
    }
}

/// HTTP adapter for the DemoQA account API
pub struct DemoQaAccountApi {
    base_url: String,
    client: reqwest::Client,
}

impl DemoQaAccountApi {
    pub fn new(config: &AccountApiConfig) -> E2eResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/User", self.base_url)
    }

    async fn post_user(&self, endpoint: &str, user: &User) -> Result<UserCreationResponse, Failure> {
        let resp = self
            .client
            .post(endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(user)
            .send()
            .await
            .map_err(|e| Failure::Unexpected(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Failure::Unexpected(e.to_string()))?;

        if !status.is_success() {
            return Err(Failure::Status {
                status: status.as_u16(),
                message: failure_message(status.as_u16(), &body),
            });
        }

        serde_json::from_str(&body).map_err(|e| Failure::Unexpected(e.to_string()))
    }
}

enum Failure {
    Status { status: u16, message: String },
    Unexpected(String),
}

/// Message for a non-success response: the body's `message` field when
/// present, otherwise the status and raw body
fn failure_message(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body))
}

#[async_trait]
impl AccountApi for DemoQaAccountApi {
    async fn create_user(&self, user: &User) -> E2eResult<UserCreationResponse> {
        let endpoint = self.endpoint();
        info!("Sending create-user request for {}", user.user_name);

        match self.post_user(&endpoint, user).await {
            Ok(created) => {
                info!(
                    "Created user {} with id {}",
                    created.username, created.user_id
                );
                Ok(created)
            }
            Err(Failure::Status { status, message }) => {
                error!("User creation failed with status {}: {}", status, message);
                Err(E2eError::Api {
                    status,
                    endpoint,
                    message,
                })
            }
            Err(Failure::Unexpected(cause)) => {
                error!("Unexpected error creating user: {}", cause);
                Err(E2eError::Api {
                    status: 0,
                    endpoint,
                    message: format!("Unexpected error: {}", cause),
                })
            }
        }
    }
}

/// Applies account business rules before delegating to another [`AccountApi`]
pub struct AccountService<A> {
    api: A,
}

impl<A: AccountApi> AccountService<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Check `user` against the account rules without calling the API
    pub fn validate(user: &User) -> E2eResult<()> {
        if user.user_name.trim().is_empty() {
            return Err(E2eError::InvalidInput("Username is required".into()));
        }

        if user.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(E2eError::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let password = &user.password;
        if !(UPPERCASE.is_match(password) && DIGIT.is_match(password) && SPECIAL.is_match(password)) {
            return Err(E2eError::InvalidInput(
                "Password must contain at least: 1 uppercase letter, 1 number, 1 special character"
                    .into(),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl<A: AccountApi> AccountApi for AccountService<A> {
    async fn create_user(&self, user: &User) -> E2eResult<UserCreationResponse> {
        Self::validate(user)?;
        let created = self.api.create_user(user).await?;
        info!("[service] Registered user {}", created.username);
        Ok(created)
    }
}
