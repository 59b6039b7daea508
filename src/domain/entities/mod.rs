pub mod draft;
pub mod recipe;
pub mod user;

pub use draft::{DraftSnapshot, RecipeDraft};
pub use recipe::{Difficulty, Ingredient, NewRecipe, Recipe, RecipePatch};
pub use user::{CurrentUser, UserProfile};
