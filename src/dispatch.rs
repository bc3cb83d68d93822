//! Generic resource dispatch: `{resource}/{id?}` onto the registered bundles.
//!
//! Every verb follows parse, resolve, validate, invoke, respond. Ids and bodies
//! are validated before a bundle operation runs, so malformed input never
//! reaches a store.

use crate::error::{ApiError, StoreError};
use crate::registry::Registry;
use crate::response;
use crate::service::RequestValidator;
use axum::{http::StatusCode, Json};
use serde_json::Value;
use std::fmt::Display;

pub type DispatchResult = Result<(StatusCode, Json<Value>), ApiError>;

/// The catch-all path tail split into resource name and optional id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath {
    pub resource: String,
    pub id: Option<String>,
}

impl ResourcePath {
    /// Empty segments are dropped, so `articles/` and `/articles//` name the
    /// collection. More than two segments is an error.
    pub fn parse(tail: &str) -> Result<Self, ApiError> {
        let mut segments = tail.split('/').filter(|s| !s.is_empty());
        let resource = segments.next().unwrap_or_default().to_string();
        let id = segments.next().map(str::to_string);
        if let Some(extra) = segments.next() {
            return Err(ApiError::UnexpectedSegment(extra.to_string()));
        }
        Ok(ResourcePath { resource, id })
    }
}

fn unexpected(resource: &str, action: &str, err: impl Display) -> ApiError {
    ApiError::Unexpected(format!(
        "Unexpected error: Resource '{}' could not be {}. Error: {}",
        resource, action, err
    ))
}

pub async fn handle_get(registry: &Registry, path: &ResourcePath) -> DispatchResult {
    let bundle = registry.resolve(&path.resource)?;
    let Some(id) = RequestValidator::id(path.id.as_deref(), false)? else {
        let all = bundle.find_all().await?;
        return Ok(response::ok(Value::Array(all)));
    };
    let raw_id = path.id.as_deref().unwrap_or_default();
    let found = bundle.find_by_id(id).await.map_err(|e| {
        ApiError::Unexpected(format!(
            "Unexpected error: Resource '{}' with ID '{}' could not be found. Error: {}",
            path.resource, raw_id, e
        ))
    })?;
    match found {
        Some(entity) => Ok(response::ok(entity)),
        None => Err(ApiError::entity_not_found(&path.resource, raw_id)),
    }
}

/// An id segment, if present, is ignored.
pub async fn handle_post(registry: &Registry, path: &ResourcePath, raw: &[u8]) -> DispatchResult {
    let bundle = registry.resolve(&path.resource)?;
    let input = RequestValidator::body(raw)?;
    let entity = bundle
        .create(input)
        .await
        .map_err(|e| unexpected(&path.resource, "created", e))?;
    Ok(response::created(entity))
}

/// Responds with JSON `null` when no row matched the id.
pub async fn handle_patch(registry: &Registry, path: &ResourcePath, raw: &[u8]) -> DispatchResult {
    let id = RequestValidator::id(path.id.as_deref(), true)?.ok_or(ApiError::MissingId)?;
    let bundle = registry.resolve(&path.resource)?;
    let input = RequestValidator::body(raw)?;
    let entity = bundle
        .update(id, input)
        .await
        .map_err(|e| unexpected(&path.resource, "updated", e))?;
    Ok(response::updated(entity.unwrap_or(Value::Null)))
}

/// Responds with a JSON boolean: whether a row was deleted.
pub async fn handle_delete(registry: &Registry, path: &ResourcePath) -> DispatchResult {
    let id = RequestValidator::id(path.id.as_deref(), true)?.ok_or(ApiError::MissingId)?;
    let bundle = registry.resolve(&path.resource)?;
    let deleted = bundle.delete(id).await.map_err(|e| match e {
        StoreError::Unauthorized(msg) => ApiError::Unauthorized(msg),
        other => unexpected(&path.resource, "deleted", other),
    })?;
    Ok(response::ok(Value::Bool(deleted)))
}
