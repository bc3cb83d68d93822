//! Common routes: health, readiness, version.

use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Serialize)]
struct HealthBody {
    message: &'static str,
    query: Map<String, Value>,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
}

/// Echoes the query string back. Repeated keys become arrays and bracketed
/// keys (`b[c]=3`, `a[]=1`) nest.
async fn health(Query(pairs): Query<Vec<(String, String)>>) -> Json<HealthBody> {
    let mut query = Map::new();
    for (key, value) in pairs {
        insert_query_value(&mut query, &key_path(&key), value);
    }
    Json(HealthBody {
        message: "The Server is healthy",
        query,
    })
}

/// `b[c][d]` -> `["b", "c", "d"]`; `a[]` -> `["a", ""]`.
fn key_path(key: &str) -> Vec<&str> {
    match key.find('[') {
        Some(i) if i > 0 && key.ends_with(']') => {
            let mut path = vec![&key[..i]];
            path.extend(key[i + 1..key.len() - 1].split("]["));
            path
        }
        _ => vec![key],
    }
}

fn push_value(slot: &mut Value, value: String) {
    match slot {
        Value::Array(items) => items.push(Value::String(value)),
        other => {
            let prev = other.take();
            *other = Value::Array(vec![prev, Value::String(value)]);
        }
    }
}

fn insert_query_value(target: &mut Map<String, Value>, path: &[&str], value: String) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };
    match rest {
        [] => match target.get_mut(*head) {
            Some(existing) => push_value(existing, value),
            None => {
                target.insert(head.to_string(), Value::String(value));
            }
        },
        [""] => {
            let slot = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            push_value(slot, value);
        }
        _ => {
            let child = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                insert_query_value(map, rest, value);
            }
        }
    }
}

async fn ready(State(state): State<AppState>) -> Result<Json<ReadyBody>, (StatusCode, Json<ReadyBody>)> {
    let Some(pool) = &state.pool else {
        return Ok(Json(ReadyBody { status: "ok", database: None }));
    };
    if sqlx::query("SELECT 1").fetch_optional(pool).await.is_err() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyBody {
                status: "degraded",
                database: Some("unavailable"),
            }),
        ));
    }
    Ok(Json(ReadyBody {
        status: "ok",
        database: Some("ok"),
    }))
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /health, GET /ready, GET /version.
pub fn common_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nest(pairs: &[(&str, &str)]) -> Value {
        let mut query = Map::new();
        for (k, v) in pairs {
            insert_query_value(&mut query, &key_path(k), v.to_string());
        }
        Value::Object(query)
    }

    #[test]
    fn repeated_keys_become_arrays() {
        assert_eq!(
            nest(&[("a", "1"), ("a", "2"), ("a", "3"), ("b", "x")]),
            json!({ "a": ["1", "2", "3"], "b": "x" })
        );
    }

    #[test]
    fn bracketed_keys_nest() {
        assert_eq!(
            nest(&[("b[c]", "3"), ("b[d][e]", "4"), ("l[]", "1"), ("l[]", "2")]),
            json!({ "b": { "c": "3", "d": { "e": "4" } }, "l": ["1", "2"] })
        );
        assert_eq!(nest(&[("[x]", "1")]), json!({ "[x]": "1" }));
    }
}
