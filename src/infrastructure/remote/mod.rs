pub mod auth_gateway;
pub mod firestore;
pub mod storage;

pub use auth_gateway::FirebaseAuthClient;
pub use firestore::{FirestoreClient, FirestoreRecipeStore, FirestoreUserStore};
pub use storage::FirebaseStorageClient;

use crate::shared::error::AppError;
use reqwest::StatusCode;

/// Maps a failed backend response onto the error taxonomy. Known causes get
/// their dedicated variants; anything else passes through with its raw
/// message.
pub(crate) fn classify_response(status: StatusCode, code: &str, message: String) -> AppError {
    match (status.as_u16(), code) {
        (403, _) | (_, "PERMISSION_DENIED") => AppError::PermissionDenied(message),
        (404, _) | (_, "NOT_FOUND") => AppError::NotFound(message),
        (503, _) | (_, "UNAVAILABLE") => AppError::Network(message),
        (401, _) | (_, "UNAUTHENTICATED") => AppError::Unauthorized(message),
        _ => AppError::Internal(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_causes_get_their_variants() {
        let err = classify_response(StatusCode::FORBIDDEN, "", "denied".into());
        assert!(matches!(err, AppError::PermissionDenied(_)));

        let err = classify_response(StatusCode::BAD_REQUEST, "PERMISSION_DENIED", "denied".into());
        assert!(matches!(err, AppError::PermissionDenied(_)));

        let err = classify_response(StatusCode::NOT_FOUND, "", "gone".into());
        assert!(matches!(err, AppError::NotFound(_)));

        let err = classify_response(StatusCode::BAD_REQUEST, "UNAVAILABLE", "down".into());
        assert!(matches!(err, AppError::Network(_)));

        let err = classify_response(StatusCode::UNAUTHORIZED, "", "expired".into());
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn unknown_causes_pass_through_raw() {
        let err = classify_response(StatusCode::BAD_REQUEST, "FAILED_PRECONDITION", "index".into());
        match err {
            AppError::Internal(msg) => assert_eq!(msg, "index"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
