//! Generic CRUD execution against PostgreSQL.

use crate::error::StoreError;
use crate::schema::{format_timestamp, TableDef};
use crate::sql::{self, PgBindValue, QueryBuf};
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

pub type Row = Map<String, Value>;

pub struct CrudService;

impl CrudService {
    pub async fn list(pool: &PgPool, table: &TableDef) -> Result<Vec<Row>, StoreError> {
        Self::query_many(pool, &sql::select_all(table)).await
    }

    /// Fetch one row by primary key.
    pub async fn read(pool: &PgPool, table: &TableDef, id: Uuid) -> Result<Option<Row>, StoreError> {
        Self::query_one(pool, &sql::select_by_id(table, &id.to_string())).await
    }

    /// Insert one row from column values. Returns the created row.
    pub async fn create(pool: &PgPool, table: &TableDef, values: &Row) -> Result<Row, StoreError> {
        Self::query_one(pool, &sql::insert(table, values))
            .await?
            .ok_or(StoreError::Db(sqlx::Error::RowNotFound))
    }

    /// Update one row by id. Returns the updated row, or None when no row matched.
    pub async fn update(
        pool: &PgPool,
        table: &TableDef,
        id: Uuid,
        values: &Row,
    ) -> Result<Option<Row>, StoreError> {
        Self::query_one(pool, &sql::update(table, &id.to_string(), values)).await
    }

    /// Delete one row by id. Returns whether a row was deleted.
    pub async fn delete(pool: &PgPool, table: &TableDef, id: Uuid) -> Result<bool, StoreError> {
        let row = Self::query_one(pool, &sql::delete(table, &id.to_string())).await?;
        Ok(row.is_some())
    }

    pub async fn query_one(pool: &PgPool, q: &QueryBuf) -> Result<Option<Row>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query.fetch_optional(pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }

    pub async fn query_many(pool: &PgPool, q: &QueryBuf) -> Result<Vec<Row>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Row {
    use sqlx::Column as _;
    use sqlx::Row as _;
    let mut map = Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    map
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row as _;
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(format_timestamp(d));
    }
    // timestamp without time zone is stored as UTC
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(format_timestamp(d.and_utc()));
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}
