pub mod auth;
pub mod blob_store;
pub mod draft_store;
pub mod identity;
pub mod prompts;
pub mod recipe_store;

pub use auth::{AuthGateway, AuthUser, UserProfileStore};
pub use blob_store::BlobStore;
pub use draft_store::DraftStore;
pub use identity::{IdentityProvider, TokenProvider};
pub use prompts::{DraftChoice, PublishChoice, PublishPrompt};
pub use recipe_store::RecipeStore;
