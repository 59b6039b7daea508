use super::connection_pool::ConnectionPool;
use crate::application::ports::DraftStore;
use crate::domain::entities::DraftSnapshot;
use async_trait::async_trait;
use sqlx::Row;
use tracing::warn;

const SAVE_DRAFT: &str = "
INSERT INTO recipe_drafts (slot, payload, saved_at)
VALUES (?1, ?2, ?3)
ON CONFLICT(slot) DO UPDATE SET payload = excluded.payload, saved_at = excluded.saved_at
";
const LOAD_DRAFT: &str = "SELECT payload FROM recipe_drafts WHERE slot = ?1";
const CLEAR_DRAFT: &str = "DELETE FROM recipe_drafts WHERE slot = ?1";

/// SQLite-backed single-slot draft store. The slot key is passed in by the
/// owning session, so concurrent sessions (or tests) each address their own
/// slot.
pub struct SqliteDraftStore {
    pool: ConnectionPool,
    slot: String,
}

impl SqliteDraftStore {
    pub fn new(pool: ConnectionPool, slot: impl Into<String>) -> Self {
        Self {
            pool,
            slot: slot.into(),
        }
    }
}

#[async_trait]
impl DraftStore for SqliteDraftStore {
    async fn save(&self, snapshot: &DraftSnapshot) {
        let payload = match serde_json::to_string(snapshot) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "draft snapshot did not serialize, write dropped");
                return;
            }
        };

        let result = sqlx::query(SAVE_DRAFT)
            .bind(&self.slot)
            .bind(payload)
            .bind(snapshot.timestamp.to_rfc3339())
            .execute(self.pool.get())
            .await;
        if let Err(err) = result {
            warn!(error = %err, slot = %self.slot, "draft save failed");
        }
    }

    async fn load(&self) -> Option<DraftSnapshot> {
        let row = match sqlx::query(LOAD_DRAFT)
            .bind(&self.slot)
            .fetch_optional(self.pool.get())
            .await
        {
            Ok(row) => row?,
            Err(err) => {
                warn!(error = %err, slot = %self.slot, "draft load failed");
                return None;
            }
        };

        let payload: String = row.try_get("payload").ok()?;
        match serde_json::from_str(&payload) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(error = %err, slot = %self.slot, "stored draft is unreadable, treating as absent");
                None
            }
        }
    }

    async fn clear(&self) {
        let result = sqlx::query(CLEAR_DRAFT)
            .bind(&self.slot)
            .execute(self.pool.get())
            .await;
        if let Err(err) = result {
            warn!(error = %err, slot = %self.slot, "draft clear failed");
        }
    }
}
