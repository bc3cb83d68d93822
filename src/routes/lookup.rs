//! Lookup routes that sit beside the generic resource router.

use crate::handlers::lookup::{article_by_slug, brand_tags, missing_slug};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn lookup_routes() -> Router<AppState> {
    Router::new()
        .route("/brand-tags/:id", get(brand_tags))
        .route("/query", get(missing_slug))
        .route("/query/*slug", get(article_by_slug))
}
