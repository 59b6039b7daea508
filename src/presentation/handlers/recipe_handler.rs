use crate::application::services::{EditorSession, PublishOutcome, RecipeService};
use crate::presentation::dto::recipe_dto::{
    DraftStatusResponse, PublishResponse, RecipeFormRequest, RecipeResponse,
};
use crate::presentation::dto::Validate;
use crate::shared::error::AppError;
use std::sync::Arc;

/// Recipe editing and publication surface for the shell.
pub struct RecipeHandler {
    session: Arc<EditorSession>,
    recipes: Arc<RecipeService>,
}

impl RecipeHandler {
    pub fn new(session: Arc<EditorSession>, recipes: Arc<RecipeService>) -> Self {
        Self { session, recipes }
    }

    /// Pushes the current form state into the edit buffer.
    pub async fn update_form(&self, request: RecipeFormRequest) -> Result<(), AppError> {
        request.validate().map_err(AppError::InvalidInput)?;
        self.session
            .edit(|draft| request.apply_to(draft))
            .await;
        Ok(())
    }

    pub async fn draft_status(&self, restored: bool) -> DraftStatusResponse {
        let draft = self.session.current_draft().await;
        DraftStatusResponse {
            restored,
            name: draft.name.clone(),
            has_content: draft.has_content(),
        }
    }

    /// Explicit "save as draft". Best-effort by contract, so there is no
    /// failure to report.
    pub async fn save_draft(&self) {
        self.session.save_now().await;
    }

    pub async fn discard_draft(&self) {
        self.session.discard().await;
    }

    pub async fn publish(&self) -> Result<PublishResponse, AppError> {
        let draft = self.session.current_draft().await;
        let outcome = self.recipes.publish(&draft).await?;
        if matches!(outcome, PublishOutcome::Published { .. }) {
            // The stored draft is already cleared; reset the buffer so the
            // next edit starts fresh.
            self.session.reset_buffer().await;
        }
        Ok(PublishResponse::from(outcome))
    }

    pub async fn list(&self) -> Result<Vec<RecipeResponse>, AppError> {
        let recipes = self.recipes.list_recipes().await?;
        Ok(recipes.into_iter().map(RecipeResponse::from).collect())
    }

    pub async fn delete(&self, recipe_id: &str) -> Result<(), AppError> {
        if recipe_id.trim().is_empty() {
            return Err(AppError::InvalidInput("recipe id is required".to_string()));
        }
        self.recipes.delete_recipe(recipe_id).await
    }
}
