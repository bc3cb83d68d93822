//! The catch-all resource route. The whole tail is captured so the dispatcher
//! decides between collection, entity and malformed paths.

use crate::handlers::resource::{delete, get as get_handler, patch, post};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn resource_routes() -> Router<AppState> {
    Router::new().route(
        "/*path",
        get(get_handler).post(post).patch(patch).delete(delete),
    )
}
