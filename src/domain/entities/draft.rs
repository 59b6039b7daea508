use super::recipe::{Difficulty, Ingredient, NewRecipe};
use super::user::CurrentUser;
use crate::domain::validation::{self, MissingField};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single in-progress recipe edit for an editing session. Remote identity
/// stays empty until the store assigns one at publication; `local_id` only
/// identifies the buffer across draft restores.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub local_id: String,
    pub name: String,
    pub total_time_minutes: u32,
    pub servings: u32,
    pub difficulty: Option<Difficulty>,
    #[serde(rename = "ingredientLines")]
    pub ingredients: Vec<Ingredient>,
    pub instructions: String,
    pub category: Option<String>,
    pub photo: Option<String>,
}

impl RecipeDraft {
    pub fn new() -> Self {
        Self {
            local_id: uuid::Uuid::new_v4().to_string(),
            name: String::new(),
            total_time_minutes: 30,
            servings: 4,
            difficulty: Some(Difficulty::Easy),
            ingredients: Vec::new(),
            instructions: String::new(),
            category: Some("other".to_string()),
            photo: None,
        }
    }

    /// Autosave gate: anything worth snapshotting?
    pub fn has_content(&self) -> bool {
        !self.name.trim().is_empty()
            || !self.instructions.trim().is_empty()
            || !self.ingredients.is_empty()
            || self.photo.is_some()
    }

    /// Adds an ingredient line, rejecting blank names and non-positive
    /// quantities. Returns whether the line was accepted.
    pub fn add_ingredient(&mut self, ingredient: Ingredient) -> bool {
        let name = ingredient.name.trim();
        if name.is_empty() || ingredient.quantity <= 0.0 {
            return false;
        }
        self.ingredients.push(Ingredient {
            name: name.to_string(),
            ..ingredient
        });
        true
    }

    pub fn remove_ingredient(&mut self, index: usize) {
        if index < self.ingredients.len() {
            self.ingredients.remove(index);
        }
    }

    /// Builds the remote create payload, with author fields taken from the
    /// identity provider. Fails with the missing-field list when the edit is
    /// not publishable.
    pub fn to_new_recipe(&self, author: &CurrentUser) -> Result<NewRecipe, Vec<MissingField>> {
        validation::validate(self)?;
        let difficulty = self.difficulty.ok_or(vec![MissingField::Difficulty])?;
        Ok(NewRecipe {
            name: self.name.trim().to_string(),
            total_time_minutes: self.total_time_minutes,
            servings: self.servings,
            difficulty,
            ingredients: self.ingredients.clone(),
            instructions: self.instructions.trim().to_string(),
            author_id: author.id.clone(),
            author_name: author.display_name.clone(),
            category: self.category.clone(),
        })
    }
}

impl Default for RecipeDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the edit buffer as persisted in the draft slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub recipe: RecipeDraft,
    pub selected_photo: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl DraftSnapshot {
    pub fn capture(recipe: &RecipeDraft) -> Self {
        Self {
            recipe: recipe.clone(),
            selected_photo: recipe.photo.clone(),
            timestamp: Utc::now(),
        }
    }
}
