use super::Validate;
use crate::application::services::{ImageOutcome, PublishOutcome};
use crate::domain::entities::{Ingredient, Recipe, RecipeDraft};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDto {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

impl From<Ingredient> for IngredientDto {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            name: ingredient.name,
            quantity: ingredient.quantity,
            unit: ingredient.unit,
        }
    }
}

impl From<IngredientDto> for Ingredient {
    fn from(dto: IngredientDto) -> Self {
        Self {
            name: dto.name,
            quantity: dto.quantity,
            unit: dto.unit,
        }
    }
}

/// Full form state pushed down from the shell on every edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeFormRequest {
    pub name: String,
    pub total_time_minutes: u32,
    pub servings: u32,
    pub difficulty: Option<String>,
    pub ingredients: Vec<IngredientDto>,
    pub instructions: String,
    pub category: Option<String>,
    pub photo: Option<String>,
}

impl Validate for RecipeFormRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(difficulty) = &self.difficulty {
            difficulty
                .parse::<crate::domain::entities::Difficulty>()
                .map_err(|_| format!("unknown difficulty: {}", difficulty))?;
        }
        for ingredient in &self.ingredients {
            if ingredient.name.trim().is_empty() {
                return Err("ingredient name is required".to_string());
            }
            if ingredient.quantity <= 0.0 {
                return Err("ingredient quantity must be positive".to_string());
            }
        }
        Ok(())
    }
}

impl RecipeFormRequest {
    /// Overwrites the edit buffer with the form state. `validate` must have
    /// accepted the request first.
    pub fn apply_to(&self, draft: &mut RecipeDraft) {
        draft.name = self.name.clone();
        draft.total_time_minutes = self.total_time_minutes;
        draft.servings = self.servings;
        draft.difficulty = self
            .difficulty
            .as_deref()
            .and_then(|value| value.parse().ok());
        draft.ingredients = self
            .ingredients
            .iter()
            .cloned()
            .map(Ingredient::from)
            .collect();
        draft.instructions = self.instructions.clone();
        draft.category = self.category.clone();
        draft.photo = self.photo.clone();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub id: String,
    pub name: String,
    pub total_time_minutes: u32,
    pub servings: u32,
    pub difficulty: String,
    pub difficulty_label: String,
    pub ingredients: Vec<IngredientDto>,
    pub instructions: String,
    pub photo_url: Option<String>,
    pub author_name: String,
    pub created_at: i64,
    pub category: Option<String>,
}

impl From<Recipe> for RecipeResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            total_time_minutes: recipe.total_time_minutes,
            servings: recipe.servings,
            difficulty: recipe.difficulty.as_str().to_string(),
            difficulty_label: recipe.difficulty.label().to_string(),
            ingredients: recipe
                .ingredients
                .into_iter()
                .map(IngredientDto::from)
                .collect(),
            instructions: recipe.instructions,
            photo_url: recipe.photo_url,
            author_name: recipe.author_name,
            created_at: recipe.created_at.timestamp(),
            category: recipe.category,
        }
    }
}

pub const IMAGE_WARNING: &str = "Recipe saved, but the image upload failed";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub status: String,
    pub recipe_id: Option<String>,
    pub image_url: Option<String>,
    pub image_warning: Option<String>,
    pub missing_fields: Vec<String>,
    pub saved_as_draft: bool,
}

impl From<PublishOutcome> for PublishResponse {
    fn from(outcome: PublishOutcome) -> Self {
        match outcome {
            PublishOutcome::Published { recipe_id, image } => {
                let (image_url, image_warning) = match image {
                    ImageOutcome::Uploaded { url } => (Some(url), None),
                    ImageOutcome::Failed { .. } => (None, Some(IMAGE_WARNING.to_string())),
                    ImageOutcome::NotAttached => (None, None),
                };
                Self {
                    status: "published".to_string(),
                    recipe_id: Some(recipe_id),
                    image_url,
                    image_warning,
                    missing_fields: Vec::new(),
                    saved_as_draft: false,
                }
            }
            PublishOutcome::Rejected {
                missing,
                saved_as_draft,
            } => Self {
                status: "rejected".to_string(),
                recipe_id: None,
                image_url: None,
                image_warning: None,
                missing_fields: missing
                    .iter()
                    .map(|field| field.label().to_string())
                    .collect(),
                saved_as_draft,
            },
            PublishOutcome::Cancelled => Self {
                status: "cancelled".to_string(),
                recipe_id: None,
                image_url: None,
                image_warning: None,
                missing_fields: Vec::new(),
                saved_as_draft: false,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftStatusResponse {
    pub restored: bool,
    pub name: String,
    pub has_content: bool,
}
