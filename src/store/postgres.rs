//! PostgreSQL-backed bundles and lookups.

use crate::error::StoreError;
use crate::registry::{ContentLookup, ResourceBundle};
use crate::schema::{ResourceKind, TableDef, ARTICLES};
use crate::service::CrudService;
use crate::sql;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

/// Forwards the five operations to one table.
pub struct PgBundle {
    pool: PgPool,
    kind: ResourceKind,
}

impl PgBundle {
    pub fn new(pool: PgPool, kind: ResourceKind) -> Self {
        PgBundle { pool, kind }
    }

    fn table(&self) -> &'static TableDef {
        self.kind.table()
    }
}

#[async_trait]
impl ResourceBundle for PgBundle {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn find_all(&self) -> Result<Vec<Value>, StoreError> {
        let rows = CrudService::list(&self.pool, self.table()).await?;
        Ok(rows.into_iter().map(|r| self.table().entity_from_row(r)).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Value>, StoreError> {
        let row = CrudService::read(&self.pool, self.table(), id).await?;
        Ok(row.map(|r| self.table().entity_from_row(r)))
    }

    async fn create(&self, input: Map<String, Value>) -> Result<Value, StoreError> {
        let values = self.table().insert_values(&input);
        let row = CrudService::create(&self.pool, self.table(), &values).await?;
        Ok(self.table().entity_from_row(row))
    }

    async fn update(&self, id: Uuid, input: Map<String, Value>) -> Result<Option<Value>, StoreError> {
        let values = self.table().update_values(&input);
        let row = CrudService::update(&self.pool, self.table(), id, &values).await?;
        Ok(row.map(|r| self.table().entity_from_row(r)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        CrudService::delete(&self.pool, self.table(), id).await
    }
}

pub struct PgLookup {
    pool: PgPool,
}

impl PgLookup {
    pub fn new(pool: PgPool) -> Self {
        PgLookup { pool }
    }
}

#[async_trait]
impl ContentLookup for PgLookup {
    async fn tags_by_brand(&self, brand_id: Uuid) -> Result<Vec<Value>, StoreError> {
        let q = sql::select_tags_by_brand(&brand_id.to_string());
        let rows = CrudService::query_many(&self.pool, &q).await?;
        Ok(rows.into_iter().map(Value::Object).collect())
    }

    async fn article_info_by_slug(&self, slug: &str) -> Result<Option<Value>, StoreError> {
        let q = sql::select_article_info_by_slug(slug);
        let row = CrudService::query_one(&self.pool, &q).await?;
        Ok(row.map(|r| ARTICLES.entity_from_row(r)))
    }
}
