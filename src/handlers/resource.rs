//! Catch-all handlers for `/api/{resource}/{id?}`. Each verb parses the path
//! tail and hands off to the dispatcher.

use crate::dispatch::{self, DispatchResult, ResourcePath};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
};

pub async fn get(State(state): State<AppState>, Path(tail): Path<String>) -> DispatchResult {
    let path = ResourcePath::parse(&tail)?;
    dispatch::handle_get(&state.registry, &path).await
}

pub async fn post(
    State(state): State<AppState>,
    Path(tail): Path<String>,
    body: Bytes,
) -> DispatchResult {
    let path = ResourcePath::parse(&tail)?;
    dispatch::handle_post(&state.registry, &path, &body).await
}

pub async fn patch(
    State(state): State<AppState>,
    Path(tail): Path<String>,
    body: Bytes,
) -> DispatchResult {
    let path = ResourcePath::parse(&tail)?;
    dispatch::handle_patch(&state.registry, &path, &body).await
}

pub async fn delete(State(state): State<AppState>, Path(tail): Path<String>) -> DispatchResult {
    let path = ResourcePath::parse(&tail)?;
    dispatch::handle_delete(&state.registry, &path).await
}
