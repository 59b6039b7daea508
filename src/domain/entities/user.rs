use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in user as the publication workflow sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,
    pub display_name: String,
}

/// The `users/{uid}` document in the remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub diets: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub dislikes: Vec<String>,
    pub household_size: u32,
    pub default_portions: u32,
    pub preferred_language: String,
    pub dark_mode: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

impl UserProfile {
    /// Initial document for an email/password registration.
    pub fn new_registered(
        uid: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uid.to_string(),
            email: email.to_string(),
            display_name: format!("{} {}", first_name, last_name).trim().to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            bio: String::new(),
            photo_url: None,
            diets: Vec::new(),
            allergies: Vec::new(),
            dislikes: Vec::new(),
            household_size: 1,
            default_portions: 1,
            preferred_language: "it".to_string(),
            dark_mode: false,
            created_at: now,
            updated_at: now,
            last_login_at: now,
        }
    }

    /// Initial document materialized on first federated sign-in, where only a
    /// display name is available. The split mirrors the registration form:
    /// first word becomes the first name, the rest the last name.
    pub fn from_provider(uid: &str, email: &str, display_name: &str) -> Self {
        let mut words = display_name.split_whitespace();
        let first_name = words.next().unwrap_or_default().to_string();
        let last_name = words.collect::<Vec<_>>().join(" ");
        let mut profile = Self::new_registered(uid, email, &first_name, &last_name);
        profile.display_name = display_name.to_string();
        profile
    }

    pub fn as_current_user(&self) -> CurrentUser {
        let display_name = if self.display_name.is_empty() {
            self.email.clone()
        } else {
            self.display_name.clone()
        };
        CurrentUser {
            id: self.id.clone(),
            display_name,
        }
    }
}
