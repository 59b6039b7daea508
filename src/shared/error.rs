use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Database(String),
    Network(String),
    Storage(String),
    Auth(String),
    Unauthorized(String),
    PermissionDenied(String),
    NotFound(String),
    InvalidInput(String),
    Validation(String),
    Serialization(String),
    Configuration(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            // The lowercase prefixes below are part of the read-path contract:
            // callers match on them when turning failures into user messages.
            AppError::Network(msg) => write!(f, "network: {}", msg),
            AppError::PermissionDenied(msg) => write!(f, "permission-denied: {}", msg),
            AppError::NotFound(msg) => write!(f, "not-found: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Auth(msg) => write!(f, "Auth error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Message suitable for direct display in the shell UI.
    pub fn user_message(&self) -> String {
        match self {
            AppError::PermissionDenied(_) => {
                "Insufficient permissions. Check that you are signed in.".to_string()
            }
            AppError::Network(_) => {
                "Connection error. Check your network and try again.".to_string()
            }
            AppError::NotFound(_) => "Database not found. Contact support.".to_string(),
            AppError::Unauthorized(_) => "You must be signed in to do this.".to_string(),
            AppError::Auth(msg) => msg.clone(),
            AppError::InvalidInput(msg) | AppError::Validation(msg) => msg.clone(),
            other => format!("Error: {}", other),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database",
            AppError::Network(_) => "network",
            AppError::Storage(_) => "storage",
            AppError::Auth(_) => "auth",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::PermissionDenied(_) => "permission_denied",
            AppError::NotFound(_) => "not_found",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Validation(_) => "validation",
            AppError::Serialization(_) => "serialization",
            AppError::Configuration(_) => "configuration",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            AppError::Network(err.to_string())
        } else {
            AppError::Internal(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_failure_messages_carry_their_classification() {
        let err = AppError::PermissionDenied("missing rule".into());
        assert!(err.to_string().contains("permission-denied"));

        let err = AppError::Network("connect refused".into());
        assert!(err.to_string().contains("network"));

        let err = AppError::NotFound("no such collection".into());
        assert!(err.to_string().contains("not-found"));
    }
}
