pub mod auth_service;
pub mod editor_session;
pub mod recipe_service;

pub use auth_service::{AuthService, SessionState};
pub use editor_session::EditorSession;
pub use recipe_service::{ImageOutcome, PublishOutcome, RecipeService};
