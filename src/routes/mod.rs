//! Router assembly. Everything is served under `/api`.

mod common;
mod lookup;
mod resource;

pub use common::common_routes;
pub use lookup::lookup_routes;
pub use resource::resource_routes;

use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};
use tower_http::limit::RequestBodyLimitLayer;

pub const API_PREFIX: &str = "/api";

/// The full application: common, lookup and resource routes under [`API_PREFIX`],
/// with request bodies capped at `body_limit` bytes. The extractor default cap
/// is lifted so `body_limit` is the only limit in force.
pub fn app(state: AppState, body_limit: usize) -> Router {
    let api = Router::new()
        .merge(common_routes())
        .merge(lookup_routes())
        .merge(resource_routes());
    Router::new()
        .nest(API_PREFIX, api)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}
