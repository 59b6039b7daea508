use crate::application::ports::{AuthGateway, AuthUser};
use crate::shared::config::FirebaseConfig;
use crate::shared::error::{AppError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Identity Toolkit REST gateway. Provider error codes are translated into
/// the user-facing messages the shell shows verbatim.
pub struct FirebaseAuthClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FirebaseAuthClient {
    pub fn new(config: &FirebaseConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| AppError::Configuration(err.to_string()))?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn call(&self, operation: &str, body: Value) -> Result<Value> {
        let url = format!("{}/accounts:{}", self.base_url, operation);
        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let payload: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        if status.is_success() {
            return Ok(payload);
        }
        let code = payload
            .pointer("/error/message")
            .and_then(Value::as_str)
            .unwrap_or("");
        Err(AppError::Auth(auth_error_message(code)))
    }
}

#[async_trait]
impl AuthGateway for FirebaseAuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let payload = self
            .call(
                "signInWithPassword",
                json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        auth_user_from(&payload)
    }

    async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<AuthUser> {
        let payload = self
            .call(
                "signUp",
                json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        let mut user = auth_user_from(&payload)?;

        // Registration does not take a display name; set it right after,
        // as the original profile-update step does.
        let updated = self
            .call(
                "update",
                json!({
                    "idToken": user.id_token,
                    "displayName": display_name,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        if let Some(token) = updated.get("idToken").and_then(Value::as_str) {
            if !token.is_empty() {
                user.id_token = token.to_string();
            }
        }
        user.display_name = Some(display_name.to_string());
        Ok(user)
    }

    async fn sign_in_with_google(&self, google_id_token: &str) -> Result<AuthUser> {
        let payload = self
            .call(
                "signInWithIdp",
                json!({
                    "postBody": format!("id_token={}&providerId=google.com", google_id_token),
                    "requestUri": "http://localhost",
                    "returnSecureToken": true,
                    "returnIdpCredential": true,
                }),
            )
            .await?;
        auth_user_from(&payload)
    }

    async fn request_password_reset(&self, email: &str) -> Result<()> {
        self.call(
            "sendOobCode",
            json!({
                "requestType": "PASSWORD_RESET",
                "email": email,
            }),
        )
        .await
        .map(|_| ())
    }
}

fn auth_user_from(payload: &Value) -> Result<AuthUser> {
    let uid = payload
        .get("localId")
        .and_then(Value::as_str)
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| AppError::Auth("identity response carried no user id".to_string()))?;

    Ok(AuthUser {
        uid: uid.to_string(),
        email: payload
            .get("email")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        display_name: payload
            .get("displayName")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_string),
        id_token: payload
            .get("idToken")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

/// Provider error codes sometimes carry a suffix
/// (`"WEAK_PASSWORD : Password should be at least 6 characters"`); match on
/// the leading token.
fn auth_error_message(code: &str) -> String {
    let head = code.split_whitespace().next().unwrap_or("");
    let message = match head {
        "EMAIL_NOT_FOUND" => "No user found with this email address",
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => "Incorrect password",
        "EMAIL_EXISTS" => "An account with this email already exists",
        "WEAK_PASSWORD" => "Password is too weak",
        "INVALID_EMAIL" => "Invalid email address",
        "USER_DISABLED" => "This account has been disabled",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts. Please try again later",
        _ => {
            return if code.is_empty() {
                "An authentication error occurred".to_string()
            } else {
                code.to_string()
            }
        }
    };
    message.to_string()
}
