use crate::domain::validation::MissingField;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishChoice {
    Publish,
    Cancel,
}

/// What to do with an edit that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftChoice {
    SaveAsDraft,
    KeepEditing,
}

/// Result-returning confirmation capability supplied by the shell. The
/// publication workflow asks and acts on the answer; it never takes inline
/// handlers.
#[async_trait]
pub trait PublishPrompt: Send + Sync {
    /// Final confirmation before anything is written remotely.
    async fn confirm_publish(&self, recipe_name: &str) -> PublishChoice;

    /// The edit is not publishable; decide what happens to it.
    async fn resolve_invalid(&self, missing: &[MissingField]) -> DraftChoice;
}
