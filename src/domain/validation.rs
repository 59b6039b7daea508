use crate::domain::entities::RecipeDraft;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A required field missing from an edit at publication time. Variant order is
/// the order the fields are presented to the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    Name,
    TotalTime,
    Servings,
    Difficulty,
    Ingredients,
    Instructions,
}

impl MissingField {
    pub fn label(&self) -> &'static str {
        match self {
            MissingField::Name => "Recipe name",
            MissingField::TotalTime => "Positive total time",
            MissingField::Servings => "Positive servings",
            MissingField::Difficulty => "Difficulty level",
            MissingField::Ingredients => "At least one ingredient",
            MissingField::Instructions => "Instructions",
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Publishability check. Pure: inspects the edit and reports every missing
/// required field, in presentation order.
pub fn validate(draft: &RecipeDraft) -> Result<(), Vec<MissingField>> {
    let mut missing = Vec::new();

    if draft.name.trim().is_empty() {
        missing.push(MissingField::Name);
    }
    if draft.total_time_minutes == 0 {
        missing.push(MissingField::TotalTime);
    }
    if draft.servings == 0 {
        missing.push(MissingField::Servings);
    }
    if draft.difficulty.is_none() {
        missing.push(MissingField::Difficulty);
    }
    if draft.ingredients.is_empty() {
        missing.push(MissingField::Ingredients);
    }
    if draft.instructions.trim().is_empty() {
        missing.push(MissingField::Instructions);
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}
