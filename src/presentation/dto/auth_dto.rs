use super::Validate;
use crate::domain::entities::UserProfile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl Validate for SignInRequest {
    fn validate(&self) -> Result<(), String> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err("password is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl Validate for SignUpRequest {
    fn validate(&self) -> Result<(), String> {
        validate_email(&self.email)?;
        if self.password.len() < 6 {
            return Err("password must be at least 6 characters".to_string());
        }
        if self.first_name.trim().is_empty() {
            return Err("first name is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSignInRequest {
    pub id_token: String,
}

impl Validate for GoogleSignInRequest {
    fn validate(&self) -> Result<(), String> {
        if self.id_token.trim().is_empty() {
            return Err("google id token is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    pub email: String,
}

impl Validate for PasswordResetRequest {
    fn validate(&self) -> Result<(), String> {
        validate_email(&self.email)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: i64,
}

impl From<UserProfile> for UserResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            display_name: profile.display_name,
            first_name: profile.first_name,
            last_name: profile.last_name,
            created_at: profile.created_at.timestamp(),
        }
    }
}

fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err("a valid email address is required".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_up_requires_a_six_character_password() {
        let request = SignUpRequest {
            email: "anna@example.com".into(),
            password: "12345".into(),
            first_name: "Anna".into(),
            last_name: "Rossi".into(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn email_shape_is_checked() {
        let request = SignInRequest {
            email: "not-an-email".into(),
            password: "secret".into(),
        };
        assert!(request.validate().is_err());

        let request = SignInRequest {
            email: "anna@example.com".into(),
            password: "secret".into(),
        };
        assert!(request.validate().is_ok());
    }
}
