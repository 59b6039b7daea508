pub mod connection_pool;
pub mod sqlite_draft_store;

pub use connection_pool::ConnectionPool;
pub use sqlite_draft_store::SqliteDraftStore;
