//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Body text used when an error has no dedicated status mapping.
pub const FALLBACK_MESSAGE: &str = "An internal server error occurred";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Failures raised by a backing store. Callers of the dispatcher only ever see
/// these wrapped into an [`ApiError`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] sqlx::Error),
    #[error("null value in column \"{column}\" of relation \"{table}\" violates not-null constraint")]
    NotNull { table: &'static str, column: &'static str },
    #[error("duplicate key value violates unique constraint on \"{table}\".\"{column}\"")]
    Unique { table: &'static str, column: &'static str },
    #[error("update or delete on table \"{table}\" violates foreign key constraint on table \"{referencing}\"")]
    ForeignKey { table: &'static str, referencing: &'static str },
    #[error("insert or update on table \"{table}\" violates foreign key constraint: \"{column}\" references a missing row")]
    MissingReference { table: &'static str, column: &'static str },
    #[error("invalid input value for column \"{column}\": {reason}")]
    InvalidValue { column: &'static str, reason: String },
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid Input: Request body must be a valid object")]
    InvalidBody,
    #[error("Invalid Input: ID is not a valid UUID")]
    InvalidUuid,
    #[error("Invalid path: unexpected segment '{0}'")]
    UnexpectedSegment(String),
    #[error("ID is required for this action")]
    MissingId,
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    ResourceNotFound(String),
    #[error("Resource Handler '{0}' not found")]
    HandlerNotFound(String),
    #[error("{0}")]
    Unexpected(String),
    #[error(transparent)]
    Internal(#[from] StoreError),
}

impl ApiError {
    pub fn entity_not_found(resource: &str, id: &str) -> Self {
        ApiError::ResourceNotFound(format!("Resource '{}' with ID '{}' not found.", resource, id))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody | ApiError::InvalidUuid | ApiError::UnexpectedSegment(_) => {
                StatusCode::BAD_REQUEST
            }
            // Stand-in for forbidden.
            ApiError::Unauthorized(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::HandlerNotFound(_)
            | ApiError::MissingId
            | ApiError::Unexpected(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Kinds without a dedicated translation render the generic body with details.
    fn is_fallback(&self) -> bool {
        matches!(
            self,
            ApiError::HandlerNotFound(_) | ApiError::MissingId | ApiError::Internal(_)
        )
    }

    pub fn body(&self) -> ErrorBody {
        if self.is_fallback() {
            ErrorBody {
                error: FALLBACK_MESSAGE.to_string(),
                details: Some(self.to_string()),
            }
        } else {
            ErrorBody {
                error: self.to_string(),
                details: None,
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}
