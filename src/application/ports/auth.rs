use crate::domain::entities::UserProfile;
use crate::shared::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Authenticated identity as returned by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub id_token: String,
}

/// Opaque identity provider: credential exchange only, no session state.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser>;

    async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<AuthUser>;

    /// Exchanges a Google ID token for an application identity.
    async fn sign_in_with_google(&self, google_id_token: &str) -> Result<AuthUser>;

    async fn request_password_reset(&self, email: &str) -> Result<()>;
}

/// Remote `users/{uid}` document access.
#[async_trait]
pub trait UserProfileStore: Send + Sync {
    async fn get(&self, uid: &str) -> Result<Option<UserProfile>>;

    /// Creates or replaces the profile document.
    async fn put(&self, profile: &UserProfile) -> Result<()>;

    /// Updates only the last-login timestamp.
    async fn touch_last_login(&self, uid: &str, at: DateTime<Utc>) -> Result<()>;
}
