//! Resource registry: one five-operation bundle per resource kind, fixed at startup.

use crate::error::{ApiError, StoreError};
use crate::schema::ResourceKind;
use crate::store::memory::MemoryStore;
use crate::store::postgres::PgBundle;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Data-access contract for one resource. Entities cross this boundary as
/// JSON objects keyed by API field names.
#[async_trait]
pub trait ResourceBundle: Send + Sync {
    fn kind(&self) -> ResourceKind;

    async fn find_all(&self) -> Result<Vec<Value>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Value>, StoreError>;

    /// Fails on constraint violations.
    async fn create(&self, input: Map<String, Value>) -> Result<Value, StoreError>;

    async fn update(&self, id: Uuid, input: Map<String, Value>) -> Result<Option<Value>, StoreError>;

    /// `Ok(false)` when no row matched.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Lookups that bypass the generic router.
#[async_trait]
pub trait ContentLookup: Send + Sync {
    /// `[{name, slug}]` for every tag linked to the brand.
    async fn tags_by_brand(&self, brand_id: Uuid) -> Result<Vec<Value>, StoreError>;

    /// Article fields plus `author` and `tags` (`[{articleId, tagId, tag: {name, slug}}]`).
    async fn article_info_by_slug(&self, slug: &str) -> Result<Option<Value>, StoreError>;
}

pub struct Registry {
    bundles: [Arc<dyn ResourceBundle>; ResourceKind::COUNT],
}

impl Registry {
    /// Build the table by asking `factory` for the bundle of every kind.
    pub fn build<F>(factory: F) -> Self
    where
        F: FnMut(ResourceKind) -> Arc<dyn ResourceBundle>,
    {
        Registry {
            bundles: ResourceKind::ALL.map(factory),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::build(|kind| Arc::new(PgBundle::new(pool.clone(), kind)))
    }

    pub fn memory(store: MemoryStore) -> Self {
        Self::build(|kind| Arc::new(store.bundle(kind)))
    }

    pub fn get(&self, kind: ResourceKind) -> &dyn ResourceBundle {
        self.bundles[kind.index()].as_ref()
    }

    /// Fails with `HandlerNotFound` for names outside the registered set.
    pub fn resolve(&self, name: &str) -> Result<&dyn ResourceBundle, ApiError> {
        let kind: ResourceKind = name.parse()?;
        Ok(self.get(kind))
    }
}
