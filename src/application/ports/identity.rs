use crate::domain::entities::CurrentUser;
use async_trait::async_trait;

/// Source of the signed-in identity, if any.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> Option<CurrentUser>;
}

/// Bearer-token source for the remote store adapters.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn id_token(&self) -> Option<String>;
}
