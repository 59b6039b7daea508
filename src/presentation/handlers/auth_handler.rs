use crate::application::services::AuthService;
use crate::presentation::dto::auth_dto::{
    GoogleSignInRequest, PasswordResetRequest, SignInRequest, SignUpRequest, UserResponse,
};
use crate::presentation::dto::Validate;
use crate::shared::error::AppError;
use std::sync::Arc;

/// Authentication surface for the shell.
pub struct AuthHandler {
    auth: Arc<AuthService>,
}

impl AuthHandler {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self { auth }
    }

    pub async fn sign_in(&self, request: SignInRequest) -> Result<UserResponse, AppError> {
        request.validate().map_err(AppError::InvalidInput)?;
        let profile = self.auth.sign_in(&request.email, &request.password).await?;
        Ok(UserResponse::from(profile))
    }

    pub async fn sign_up(&self, request: SignUpRequest) -> Result<UserResponse, AppError> {
        request.validate().map_err(AppError::InvalidInput)?;
        let profile = self
            .auth
            .sign_up(
                &request.email,
                &request.password,
                request.first_name.trim(),
                request.last_name.trim(),
            )
            .await?;
        Ok(UserResponse::from(profile))
    }

    pub async fn sign_in_with_google(
        &self,
        request: GoogleSignInRequest,
    ) -> Result<UserResponse, AppError> {
        request.validate().map_err(AppError::InvalidInput)?;
        let profile = self.auth.sign_in_with_google(&request.id_token).await?;
        Ok(UserResponse::from(profile))
    }

    pub async fn request_password_reset(
        &self,
        request: PasswordResetRequest,
    ) -> Result<(), AppError> {
        request.validate().map_err(AppError::InvalidInput)?;
        self.auth.request_password_reset(&request.email).await
    }

    pub async fn sign_out(&self) {
        self.auth.sign_out().await;
    }

    pub async fn current_user(&self) -> Option<UserResponse> {
        self.auth.current_profile().await.map(UserResponse::from)
    }
}
