use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub firebase: FirebaseConfig,
    pub autosave: AutosaveConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub project_id: String,
    pub api_key: String,
    pub storage_bucket: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    pub interval_ms: u64,
    pub draft_slot: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: default_database_url(),
                max_connections: 5,
            },
            firebase: FirebaseConfig {
                project_id: String::new(),
                api_key: String::new(),
                storage_bucket: String::new(),
                request_timeout_secs: 30,
            },
            autosave: AutosaveConfig {
                interval_ms: 5000,
                draft_slot: "eatlyst_recipe_draft".to_string(),
            },
        }
    }
}

fn default_database_url() -> String {
    let dir = dirs::data_local_dir()
        .map(|base| base.join("eatlyst"))
        .unwrap_or_else(|| PathBuf::from("data"));
    format!("sqlite:{}/eatlyst.db", dir.display())
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("EATLYST_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v;
            }
        }
        if let Ok(v) = std::env::var("EATLYST_DB_MAX_CONNECTIONS") {
            if let Some(value) = parse_u32(&v) {
                cfg.database.max_connections = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("EATLYST_FIREBASE_PROJECT_ID") {
            cfg.firebase.project_id = v.trim().to_string();
        }
        if let Ok(v) = std::env::var("EATLYST_FIREBASE_API_KEY") {
            cfg.firebase.api_key = v.trim().to_string();
        }
        if let Ok(v) = std::env::var("EATLYST_STORAGE_BUCKET") {
            cfg.firebase.storage_bucket = v.trim().to_string();
        }
        if let Ok(v) = std::env::var("EATLYST_REQUEST_TIMEOUT_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.firebase.request_timeout_secs = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("EATLYST_AUTOSAVE_INTERVAL_MS") {
            if let Some(value) = parse_u64(&v) {
                cfg.autosave.interval_ms = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("EATLYST_DRAFT_SLOT") {
            if !v.trim().is_empty() {
                cfg.autosave.draft_slot = v.trim().to_string();
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.firebase.project_id.is_empty() {
            return Err("Firebase project_id must be set".to_string());
        }
        if self.firebase.api_key.is_empty() {
            return Err("Firebase api_key must be set".to_string());
        }
        if self.firebase.storage_bucket.is_empty() {
            return Err("Firebase storage_bucket must be set".to_string());
        }
        if self.autosave.interval_ms == 0 {
            return Err("Autosave interval_ms must be greater than 0".to_string());
        }
        if self.autosave.draft_slot.is_empty() {
            return Err("Autosave draft_slot must be set".to_string());
        }
        Ok(())
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_five_second_autosave() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.autosave.interval_ms, 5000);
        assert_eq!(cfg.autosave.draft_slot, "eatlyst_recipe_draft");
    }

    #[test]
    fn validate_rejects_missing_project() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.firebase.project_id = "demo".into();
        cfg.firebase.api_key = "key".into();
        cfg.firebase.storage_bucket = "demo.appspot.com".into();
        assert!(cfg.validate().is_ok());
    }
}
