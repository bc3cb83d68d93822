//! Content lookups outside the generic router.

use crate::error::ApiError;
use crate::response;
use crate::service::RequestValidator;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

/// GET /brand-tags/:id
pub async fn brand_tags(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let brand_id = Some(id.as_str())
        .filter(|s| RequestValidator::is_uuid(s))
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| ApiError::ResourceNotFound("Invalid Brand ID".into()))?;
    let tags = state.lookup.tags_by_brand(brand_id).await?;
    Ok(response::ok(Value::Array(tags)))
}

/// GET /query/*slug. Only the first segment is the slug.
pub async fn article_by_slug(
    State(state): State<AppState>,
    Path(tail): Path<String>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let slug = tail
        .split('/')
        .find(|s| !s.is_empty())
        .ok_or_else(slug_not_found)?;
    let info = state
        .lookup
        .article_info_by_slug(slug)
        .await?
        .ok_or_else(|| ApiError::ResourceNotFound("Article not found".into()))?;
    Ok(response::ok(info))
}

/// GET /query with no slug.
pub async fn missing_slug() -> ApiError {
    slug_not_found()
}

fn slug_not_found() -> ApiError {
    ApiError::ResourceNotFound("Slug not found".into())
}
