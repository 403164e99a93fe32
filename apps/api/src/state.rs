use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::token::SessionKeys;
use crate::config::Config;
use crate::storage::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Pluggable resume store. Default: S3ResumeStore.
    pub resumes: Arc<dyn ResumeStore>,
    pub sessions: SessionKeys,
    pub config: Config,
}

#[cfg(test)]
impl AppState {
    /// State backed by a lazy pool that never connects unless a query runs.
    pub fn for_tests() -> Self {
        let config = Config::for_tests();
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool from a well-formed URL");
        Self::for_tests_with_pool(db).0
    }

    /// State over a migrated test database. The returned store handle sees every upload.
    pub fn for_tests_with_pool(
        db: PgPool,
    ) -> (Self, Arc<crate::storage::memory::MemoryResumeStore>) {
        let config = Config::for_tests();
        let store = Arc::new(crate::storage::memory::MemoryResumeStore::default());
        let state = AppState {
            db,
            resumes: store.clone(),
            sessions: SessionKeys::new(&config.auth_secret, config.session_ttl),
            config,
        };
        (state, store)
    }
}
