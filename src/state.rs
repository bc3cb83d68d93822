//! Shared application state for all routes. Built once at startup; read-only afterwards.

use crate::registry::{ContentLookup, Registry};
use crate::store::memory::MemoryStore;
use crate::store::postgres::PgLookup;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub lookup: Arc<dyn ContentLookup>,
    /// Present for the PostgreSQL backend; used by the readiness check.
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn postgres(pool: PgPool) -> Self {
        AppState {
            registry: Arc::new(Registry::postgres(pool.clone())),
            lookup: Arc::new(PgLookup::new(pool.clone())),
            pool: Some(pool),
        }
    }

    pub fn memory(store: MemoryStore) -> Self {
        AppState {
            registry: Arc::new(Registry::memory(store.clone())),
            lookup: Arc::new(store),
            pool: None,
        }
    }
}
