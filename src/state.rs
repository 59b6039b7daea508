use crate::application::ports::{
    BlobStore, DraftStore, IdentityProvider, PublishPrompt, RecipeStore, TokenProvider,
    UserProfileStore,
};
use crate::application::services::{AuthService, EditorSession, RecipeService, SessionState};
use crate::infrastructure::database::{ConnectionPool, SqliteDraftStore};
use crate::infrastructure::remote::{
    FirebaseAuthClient, FirebaseStorageClient, FirestoreClient, FirestoreRecipeStore,
    FirestoreUserStore,
};
use crate::presentation::handlers::{AuthHandler, RecipeHandler};
use crate::shared::config::AppConfig;
use crate::shared::error::{AppError, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Composition root: config -> pool -> remote adapters -> services. The
/// shell supplies its confirmation prompt implementation.
pub struct AppState {
    pub config: AppConfig,
    pub auth: Arc<AuthService>,
    pub recipes: Arc<RecipeService>,
    pub session: Arc<EditorSession>,
    pub draft_restored: bool,
    pool: ConnectionPool,
}

impl AppState {
    pub async fn new(config: AppConfig, prompt: Arc<dyn PublishPrompt>) -> Result<Self> {
        config.validate().map_err(AppError::Configuration)?;

        let pool = ConnectionPool::new(&config.database.url, config.database.max_connections)
            .await?;
        pool.migrate().await?;

        let session_state = SessionState::new();

        let firestore = FirestoreClient::new(
            &config.firebase,
            Arc::clone(&session_state) as Arc<dyn TokenProvider>,
        )?;
        let recipe_store = Arc::new(FirestoreRecipeStore::new(firestore.clone()));
        let user_store = Arc::new(FirestoreUserStore::new(firestore));
        let blob_store = Arc::new(FirebaseStorageClient::new(
            &config.firebase,
            Arc::clone(&session_state) as Arc<dyn TokenProvider>,
        )?);
        let auth_gateway = Arc::new(FirebaseAuthClient::new(&config.firebase)?);

        let auth = Arc::new(AuthService::new(
            auth_gateway,
            user_store as Arc<dyn UserProfileStore>,
            Arc::clone(&session_state),
        ));

        let draft_store: Arc<dyn DraftStore> = Arc::new(SqliteDraftStore::new(
            pool.clone(),
            config.autosave.draft_slot.clone(),
        ));
        let (session, draft_restored) = EditorSession::open(
            Arc::clone(&draft_store),
            Duration::from_millis(config.autosave.interval_ms),
        )
        .await;
        session.start_autosave();
        let session = Arc::new(session);

        let recipes = Arc::new(RecipeService::new(
            recipe_store as Arc<dyn RecipeStore>,
            blob_store as Arc<dyn BlobStore>,
            session_state as Arc<dyn IdentityProvider>,
            draft_store,
            prompt,
        ));

        info!(draft_restored, "application state initialized");

        Ok(Self {
            config,
            auth,
            recipes,
            session,
            draft_restored,
            pool,
        })
    }

    pub fn recipe_handler(&self) -> RecipeHandler {
        RecipeHandler::new(Arc::clone(&self.session), Arc::clone(&self.recipes))
    }

    pub fn auth_handler(&self) -> AuthHandler {
        AuthHandler::new(Arc::clone(&self.auth))
    }

    pub async fn shutdown(&self) {
        self.session.close();
        self.pool.close().await;
    }
}
