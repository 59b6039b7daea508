use super::classify_response;
use crate::application::ports::{BlobStore, TokenProvider};
use crate::shared::config::FirebaseConfig;
use crate::shared::error::{AppError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://firebasestorage.googleapis.com/v0";

/// Firebase Storage REST adapter: media upload by object path, returning the
/// token-bearing download URL the app stores on the recipe record.
pub struct FirebaseStorageClient {
    http: reqwest::Client,
    bucket: String,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl FirebaseStorageClient {
    pub fn new(config: &FirebaseConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| AppError::Configuration(err.to_string()))?;
        Ok(Self {
            http,
            bucket: config.storage_bucket.clone(),
            base_url: DEFAULT_BASE_URL.to_string(),
            tokens,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn bearer(&self) -> Result<String> {
        self.tokens
            .id_token()
            .await
            .ok_or_else(|| AppError::Unauthorized("no signed-in user".to_string()))
    }

    fn object_url(&self, path: &str, download_token: Option<&str>) -> String {
        let encoded = url_escape::encode_component(path);
        match download_token {
            Some(token) => format!(
                "{}/b/{}/o/{}?alt=media&token={}",
                self.base_url, self.bucket, encoded, token
            ),
            None => format!("{}/b/{}/o/{}?alt=media", self.base_url, self.bucket, encoded),
        }
    }
}

#[async_trait]
impl BlobStore for FirebaseStorageClient {
    async fn upload(&self, path: &str, content: Bytes) -> Result<String> {
        let token = self.bearer().await?;
        let url = format!("{}/b/{}/o", self.base_url, self.bucket);
        let response = self
            .http
            .post(url)
            .query(&[("uploadType", "media"), ("name", path)])
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "image/jpeg")
            .body(content)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(classify(status, &body, "blob upload failed"));
        }

        // One token is minted per object; it makes the URL durable without
        // further auth.
        let download_token = body
            .get("downloadTokens")
            .and_then(Value::as_str)
            .and_then(|tokens| tokens.split(',').next())
            .filter(|token| !token.is_empty())
            .map(str::to_string);
        Ok(self.object_url(path, download_token.as_deref()))
    }

    async fn delete(&self, url: &str) -> Result<()> {
        let path = object_path_from_url(url).ok_or_else(|| {
            AppError::InvalidInput("not a storage object URL".to_string())
        })?;
        let token = self.bearer().await?;
        let delete_url = format!(
            "{}/b/{}/o/{}",
            self.base_url,
            self.bucket,
            url_escape::encode_component(&path)
        );
        let response = self.http.delete(delete_url).bearer_auth(token).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        Err(classify(status, &body, "blob deletion failed"))
    }
}

fn classify(status: StatusCode, body: &Value, fallback: &str) -> AppError {
    let message = body
        .pointer("/error/message")
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string();
    match classify_response(status, "", message) {
        AppError::Internal(msg) => AppError::Storage(msg),
        other => other,
    }
}

/// Recovers the object path from a download URL produced by `object_url`.
fn object_path_from_url(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("/o/")?;
    let encoded = rest.split('?').next()?;
    if encoded.is_empty() {
        return None;
    }
    Some(url_escape::decode(encoded).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_paths_survive_the_url_round_trip() {
        let url = "https://firebasestorage.googleapis.com/v0/b/demo.appspot.com/o/recipes%2Fuser-1%2Frecipe_rec-1_ab12cd34e.jpg?alt=media&token=tok";
        assert_eq!(
            object_path_from_url(url).as_deref(),
            Some("recipes/user-1/recipe_rec-1_ab12cd34e.jpg")
        );
    }

    #[test]
    fn foreign_urls_are_rejected() {
        assert!(object_path_from_url("https://example.com/photo.jpg").is_none());
        assert!(object_path_from_url("https://x/o/?alt=media").is_none());
    }

    #[test]
    fn storage_failures_keep_their_classification() {
        let err = classify(StatusCode::NOT_FOUND, &Value::Null, "gone");
        assert!(matches!(err, AppError::NotFound(_)));

        let err = classify(StatusCode::PAYLOAD_TOO_LARGE, &Value::Null, "too big");
        assert!(matches!(err, AppError::Storage(_)));
    }
}
