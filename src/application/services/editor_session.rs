use crate::application::ports::DraftStore;
use crate::domain::entities::{DraftSnapshot, RecipeDraft};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// One editing session: owns the in-progress edit, restores the saved draft
/// at open, and snapshots the edit into the draft store on a fixed interval
/// while it has content. A closed session stays closed; editing again means
/// opening a new session.
pub struct EditorSession {
    draft: Arc<RwLock<RecipeDraft>>,
    drafts: Arc<dyn DraftStore>,
    autosave_interval: Duration,
    autosave: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl EditorSession {
    /// Opens a session, loading the saved draft when one exists. Returns the
    /// session and whether a draft was restored.
    pub async fn open(drafts: Arc<dyn DraftStore>, autosave_interval: Duration) -> (Self, bool) {
        let (draft, restored) = match drafts.load().await {
            Some(snapshot) => {
                info!(name = %snapshot.recipe.name, saved_at = %snapshot.timestamp, "draft restored");
                (snapshot.recipe, true)
            }
            None => (RecipeDraft::new(), false),
        };

        let session = Self {
            draft: Arc::new(RwLock::new(draft)),
            drafts,
            autosave_interval,
            autosave: Mutex::new(None),
            closed: AtomicBool::new(false),
        };
        (session, restored)
    }

    /// Starts the periodic snapshot task. Idempotent; a no-op on a closed
    /// session.
    pub fn start_autosave(&self) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        let Ok(mut slot) = self.autosave.lock() else {
            return;
        };
        if slot.is_some() {
            return;
        }

        let draft = Arc::clone(&self.draft);
        let drafts = Arc::clone(&self.drafts);
        let period = self.autosave_interval;
        *slot = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick of a tokio interval fires immediately; skip it
            // so the first snapshot lands one full period after start.
            interval.tick().await;
            loop {
                interval.tick().await;
                autosave_tick(&draft, drafts.as_ref()).await;
            }
        }));
        debug!(period_ms = period.as_millis() as u64, "autosave started");
    }

    /// Ends the session. The autosave task is cancelled and no further tick
    /// fires.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        if let Ok(mut slot) = self.autosave.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }

    /// Applies a mutation to the in-progress edit.
    pub async fn edit<F, T>(&self, apply: F) -> T
    where
        F: FnOnce(&mut RecipeDraft) -> T,
    {
        let mut guard = self.draft.write().await;
        apply(&mut guard)
    }

    /// A copy of the current edit, e.g. to hand to the publication workflow.
    pub async fn current_draft(&self) -> RecipeDraft {
        self.draft.read().await.clone()
    }

    /// Explicit "save as draft", regardless of content gating.
    pub async fn save_now(&self) {
        let snapshot = DraftSnapshot::capture(&*self.draft.read().await);
        self.drafts.save(&snapshot).await;
    }

    /// Drops the stored draft and resets the edit buffer.
    pub async fn discard(&self) {
        self.drafts.clear().await;
        *self.draft.write().await = RecipeDraft::new();
    }

    /// Resets the edit buffer only, e.g. after a successful publication has
    /// already cleared the stored draft.
    pub async fn reset_buffer(&self) {
        *self.draft.write().await = RecipeDraft::new();
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// One autosave pass: snapshot the edit into the store, but only when there
/// is content worth keeping.
async fn autosave_tick(draft: &RwLock<RecipeDraft>, drafts: &dyn DraftStore) {
    let snapshot = {
        let guard = draft.read().await;
        if !guard.has_content() {
            return;
        }
        DraftSnapshot::capture(&guard)
    };
    drafts.save(&snapshot).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex as AsyncMutex;
    use tokio::time::sleep;

    struct CountingDraftStore {
        saved: AsyncMutex<Vec<DraftSnapshot>>,
        cleared: AsyncMutex<u32>,
        preload: AsyncMutex<Option<DraftSnapshot>>,
    }

    impl CountingDraftStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                saved: AsyncMutex::new(Vec::new()),
                cleared: AsyncMutex::new(0),
                preload: AsyncMutex::new(None),
            })
        }

        async fn saves(&self) -> usize {
            self.saved.lock().await.len()
        }
    }

    #[async_trait]
    impl DraftStore for CountingDraftStore {
        async fn save(&self, snapshot: &DraftSnapshot) {
            self.saved.lock().await.push(snapshot.clone());
        }

        async fn load(&self) -> Option<DraftSnapshot> {
            self.preload.lock().await.clone()
        }

        async fn clear(&self) {
            *self.cleared.lock().await += 1;
        }
    }

    #[tokio::test]
    async fn tick_skips_an_edit_without_content() {
        let store = CountingDraftStore::new();
        let draft = RwLock::new(RecipeDraft::new());

        autosave_tick(&draft, store.as_ref()).await;
        assert_eq!(store.saves().await, 0);

        draft.write().await.name = "   ".into();
        autosave_tick(&draft, store.as_ref()).await;
        assert_eq!(store.saves().await, 0, "whitespace name is not content");
    }

    #[tokio::test]
    async fn tick_saves_an_edit_with_a_name() {
        let store = CountingDraftStore::new();
        let draft = RwLock::new(RecipeDraft::new());
        draft.write().await.name = "Risotto".into();

        autosave_tick(&draft, store.as_ref()).await;

        assert_eq!(store.saves().await, 1);
        assert_eq!(store.saved.lock().await[0].recipe.name, "Risotto");
    }

    #[tokio::test]
    async fn autosave_loop_runs_until_the_session_closes() {
        let store = CountingDraftStore::new();
        let (session, restored) = EditorSession::open(
            Arc::clone(&store) as Arc<dyn DraftStore>,
            Duration::from_millis(10),
        )
        .await;
        assert!(!restored);

        session.edit(|draft| draft.name = "Lasagne".into()).await;
        session.start_autosave();
        sleep(Duration::from_millis(100)).await;
        assert!(store.saves().await >= 1, "ticks snapshot the edit");

        session.close();
        // Give an aborted-but-scheduled tick a chance to show up if
        // cancellation were broken.
        sleep(Duration::from_millis(10)).await;
        let after_close = store.saves().await;
        sleep(Duration::from_millis(60)).await;
        assert_eq!(store.saves().await, after_close, "no ticks after close");

        session.start_autosave();
        sleep(Duration::from_millis(40)).await;
        assert_eq!(store.saves().await, after_close, "closed sessions stay closed");
    }

    #[tokio::test]
    async fn open_restores_a_saved_draft() {
        let store = CountingDraftStore::new();
        let mut draft = RecipeDraft::new();
        draft.name = "Tiramisu".into();
        *store.preload.lock().await = Some(DraftSnapshot::capture(&draft));

        let (session, restored) =
            EditorSession::open(Arc::clone(&store) as Arc<dyn DraftStore>, Duration::from_secs(5))
                .await;

        assert!(restored);
        assert_eq!(session.current_draft().await.name, "Tiramisu");
    }

    #[tokio::test]
    async fn discard_clears_the_store_and_resets_the_buffer() {
        let store = CountingDraftStore::new();
        let (session, _) = EditorSession::open(
            Arc::clone(&store) as Arc<dyn DraftStore>,
            Duration::from_secs(5),
        )
        .await;

        session.edit(|draft| draft.name = "Focaccia".into()).await;
        session.discard().await;

        assert_eq!(*store.cleared.lock().await, 1);
        assert!(!session.current_draft().await.has_content());
    }

    #[tokio::test]
    async fn save_now_snapshots_even_without_content() {
        let store = CountingDraftStore::new();
        let (session, _) = EditorSession::open(
            Arc::clone(&store) as Arc<dyn DraftStore>,
            Duration::from_secs(5),
        )
        .await;

        session.save_now().await;
        assert_eq!(store.saves().await, 1);
    }
}
