pub mod auth_dto;
pub mod recipe_dto;

use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};

/// Envelope the shell receives from every handler call.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub error_code: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_code: None,
        }
    }

    pub fn from_app_error(error: AppError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.user_message()),
            error_code: Some(error.error_code().to_string()),
        }
    }
}

impl<T> From<crate::shared::error::Result<T>> for ApiResponse<T> {
    fn from(result: crate::shared::error::Result<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(error) => Self::from_app_error(error),
        }
    }
}

/// Structural request checks at the boundary. Domain rules (publishability)
/// live in `domain::validation`, not here.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}
