use crate::application::ports::{
    BlobStore, DraftChoice, DraftStore, IdentityProvider, PublishChoice, PublishPrompt,
    RecipeStore,
};
use crate::domain::entities::{DraftSnapshot, Recipe, RecipeDraft, RecipePatch};
use crate::domain::validation::{self, MissingField};
use crate::shared::error::{AppError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// What happened to the photo during a publication.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOutcome {
    NotAttached,
    Uploaded { url: String },
    /// The record was created but the image did not make it. Publication
    /// still counts as successful.
    Failed { detail: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PublishOutcome {
    Published {
        recipe_id: String,
        image: ImageOutcome,
    },
    /// Validation failed; nothing was written remotely.
    Rejected {
        missing: Vec<MissingField>,
        saved_as_draft: bool,
    },
    Cancelled,
}

/// Orchestrates the publication workflow and the companion read/delete paths
/// against the remote stores.
pub struct RecipeService {
    store: Arc<dyn RecipeStore>,
    blobs: Arc<dyn BlobStore>,
    identity: Arc<dyn IdentityProvider>,
    drafts: Arc<dyn DraftStore>,
    prompt: Arc<dyn PublishPrompt>,
    publish_in_flight: AtomicBool,
}

impl RecipeService {
    pub fn new(
        store: Arc<dyn RecipeStore>,
        blobs: Arc<dyn BlobStore>,
        identity: Arc<dyn IdentityProvider>,
        drafts: Arc<dyn DraftStore>,
        prompt: Arc<dyn PublishPrompt>,
    ) -> Self {
        Self {
            store,
            blobs,
            identity,
            drafts,
            prompt,
            publish_in_flight: AtomicBool::new(false),
        }
    }

    /// Runs the full publication workflow for the given edit:
    /// validate -> confirm -> create record -> (upload photo -> patch)? ->
    /// clear draft. Record creation is the only step whose failure aborts the
    /// attempt; image handling failures downgrade to a warning in the
    /// returned outcome.
    pub async fn publish(&self, draft: &RecipeDraft) -> Result<PublishOutcome> {
        if self.publish_in_flight.swap(true, Ordering::SeqCst) {
            return Err(AppError::InvalidInput(
                "a publication is already in progress".to_string(),
            ));
        }
        let result = self.publish_inner(draft).await;
        self.publish_in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn publish_inner(&self, draft: &RecipeDraft) -> Result<PublishOutcome> {
        if let Err(missing) = validation::validate(draft) {
            let choice = self.prompt.resolve_invalid(&missing).await;
            let saved_as_draft = choice == DraftChoice::SaveAsDraft;
            if saved_as_draft {
                self.drafts.save(&DraftSnapshot::capture(draft)).await;
            }
            return Ok(PublishOutcome::Rejected {
                missing,
                saved_as_draft,
            });
        }

        if self.prompt.confirm_publish(draft.name.trim()).await == PublishChoice::Cancel {
            return Ok(PublishOutcome::Cancelled);
        }

        let author = self
            .identity
            .current_user()
            .await
            .ok_or_else(|| AppError::Unauthorized("no signed-in user".to_string()))?;

        let record = draft
            .to_new_recipe(&author)
            .map_err(|missing| AppError::Validation(format_missing(&missing)))?;

        // The only required remote write. A failure here leaves the draft
        // slot untouched so the user can retry.
        let recipe_id = self.store.create(&record).await?;
        info!(recipe_id = %recipe_id, name = %record.name, "recipe record created");

        let image = match draft.photo.as_deref() {
            Some(photo) => self.attach_photo(photo, &author.id, &recipe_id).await,
            None => ImageOutcome::NotAttached,
        };

        self.drafts.clear().await;
        Ok(PublishOutcome::Published { recipe_id, image })
    }

    /// Uploads the photo and patches the record with the resulting URL. Every
    /// failure path is non-fatal: the record from the create step persists.
    async fn attach_photo(&self, photo: &str, author_id: &str, recipe_id: &str) -> ImageOutcome {
        let content = match decode_photo(photo) {
            Ok(content) => content,
            Err(err) => {
                warn!(error = %err, "photo could not be decoded, recipe saved without image");
                return ImageOutcome::Failed {
                    detail: err.to_string(),
                };
            }
        };

        let path = blob_path(author_id, Some(recipe_id));
        let url = match self.blobs.upload(&path, content).await {
            Ok(url) => url,
            Err(err) => {
                warn!(error = %err, "image upload failed, recipe saved without image");
                return ImageOutcome::Failed {
                    detail: err.to_string(),
                };
            }
        };

        match self
            .store
            .update(recipe_id, &RecipePatch::with_photo_url(url.clone()))
            .await
        {
            Ok(()) => ImageOutcome::Uploaded { url },
            Err(err) => {
                warn!(error = %err, "photo url patch failed, recipe saved without image");
                ImageOutcome::Failed {
                    detail: err.to_string(),
                }
            }
        }
    }

    /// The signed-in user's recipes, newest first. Not being signed in is the
    /// empty state, not an error.
    pub async fn list_recipes(&self) -> Result<Vec<Recipe>> {
        let Some(user) = self.identity.current_user().await else {
            return Ok(Vec::new());
        };

        let mut recipes = self.store.list_by_author(&user.id).await?;
        recipes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(recipes)
    }

    /// Deletes a record, removing its image blob first when one is
    /// referenced. Blob deletion is best-effort and never blocks the record
    /// deletion.
    pub async fn delete_recipe(&self, recipe_id: &str) -> Result<()> {
        let Some(user) = self.identity.current_user().await else {
            return Err(AppError::Unauthorized("no signed-in user".to_string()));
        };

        let recipes = self.store.list_by_author(&user.id).await?;
        let photo_url = recipes
            .iter()
            .find(|recipe| recipe.id == recipe_id)
            .and_then(|recipe| recipe.photo_url.as_deref());

        if let Some(url) = photo_url {
            if let Err(err) = self.blobs.delete(url).await {
                warn!(error = %err, recipe_id, "image deletion failed, deleting record anyway");
            }
        }

        self.store.delete(recipe_id).await
    }
}

fn format_missing(missing: &[MissingField]) -> String {
    let labels: Vec<&str> = missing.iter().map(MissingField::label).collect();
    format!("missing required fields: {}", labels.join(", "))
}

/// Decodes a `data:` URL into raw bytes.
fn decode_photo(photo: &str) -> Result<Bytes> {
    let rest = photo
        .strip_prefix("data:")
        .ok_or_else(|| AppError::InvalidInput("photo is not a data URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AppError::InvalidInput("malformed data URL".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(AppError::InvalidInput(
            "photo data URL is not base64-encoded".to_string(),
        ));
    }
    let bytes = STANDARD
        .decode(payload)
        .map_err(|err| AppError::InvalidInput(format!("invalid photo payload: {}", err)))?;
    Ok(Bytes::from(bytes))
}

/// Upload path namespaced by author and tied to the created record id, with a
/// random suffix against collisions. The timestamp fallback only applies when
/// no record id is available.
fn blob_path(author_id: &str, recipe_id: Option<&str>) -> String {
    let marker = recipe_id
        .map(str::to_string)
        .unwrap_or_else(|| Utc::now().timestamp_millis().to_string());
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect();
    format!("recipes/{}/recipe_{}_{}.jpg", author_id, marker, suffix)
}
