use crate::domain::entities::{NewRecipe, Recipe, RecipePatch};
use crate::shared::error::Result;
use async_trait::async_trait;

/// Remote recipe document store. Implementations classify read failures into
/// `PermissionDenied` / `Network` / `NotFound` where the cause is known and
/// pass everything else through with its raw message.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Creates a record and returns its store-assigned id. The creation
    /// timestamp is assigned on the store side.
    async fn create(&self, recipe: &NewRecipe) -> Result<String>;

    /// All records by this author, newest first. Zero results is a valid
    /// empty state.
    async fn list_by_author(&self, author_id: &str) -> Result<Vec<Recipe>>;

    /// Partial update of an existing record.
    async fn update(&self, id: &str, patch: &RecipePatch) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}
