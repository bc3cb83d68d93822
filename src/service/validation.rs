//! Request validation: entity identifiers and body shape. Field-level rules are
//! left to the database constraints.

use crate::error::ApiError;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use uuid::Uuid;

/// Hyphenated UUID, versions 1-5, RFC 4122 variant; or the nil UUID.
const UUID_PATTERN: &str = r"(?i)^(?:[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}|00000000-0000-0000-0000-000000000000)$";

fn uuid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(UUID_PATTERN).expect("UUID pattern compiles"))
}

pub struct RequestValidator;

impl RequestValidator {
    pub fn is_uuid(s: &str) -> bool {
        uuid_regex().is_match(s)
    }

    /// A required id must be present; a present id must be a UUID.
    pub fn id(id: Option<&str>, required: bool) -> Result<Option<Uuid>, ApiError> {
        match id {
            None if required => Err(ApiError::MissingId),
            None => Ok(None),
            Some(s) if !Self::is_uuid(s) => Err(ApiError::InvalidUuid),
            Some(s) => Uuid::parse_str(s).map(Some).map_err(|_| ApiError::InvalidUuid),
        }
    }

    /// The body must parse as JSON and be an object. Null, arrays, primitives,
    /// empty and malformed bodies are all rejected.
    pub fn body(raw: &[u8]) -> Result<Map<String, Value>, ApiError> {
        match serde_json::from_slice::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Err(ApiError::InvalidBody),
        }
    }
}
