use crate::domain::entities::DraftSnapshot;
use async_trait::async_trait;

/// Single-slot, best-effort persistence for the in-progress edit. Draft I/O
/// must never block editing, so the contract is fail-open: `save` and `clear`
/// cannot surface errors (implementations log them), and anything unreadable
/// on `load` is reported as no draft.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Overwrites the slot with this snapshot. Last write wins.
    async fn save(&self, snapshot: &DraftSnapshot);

    /// Returns the last saved snapshot, or `None` when the slot is empty or
    /// its contents cannot be decoded.
    async fn load(&self) -> Option<DraftSnapshot>;

    /// Empties the slot. Clearing an absent draft is not an error.
    async fn clear(&self);
}
