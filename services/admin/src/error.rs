//! Custom error types for the admin service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::validation::ValidationErrors;

/// Custom error type for the admin service
#[derive(Error, Debug)]
pub enum AdminError {
    /// Lookup by id or slug found no row
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    /// Payload rejected by a rule set
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Unauthorized access
    #[error("Unauthorized")]
    Unauthorized,

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Password hashing or verification failed
    #[error("Password hashing error: {0}")]
    Hashing(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl AdminError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        AdminError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl From<sqlx::Error> for AdminError {
    fn from(err: sqlx::Error) -> Self {
        AdminError::Database(DatabaseError::Query(err))
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AdminError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                json!({ "error": self.to_string() }),
            ),
            AdminError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "Validation failed", "errors": errors }),
            ),
            AdminError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" }))
            }
            AdminError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AdminError::Hashing(ref msg) => {
                error!("Password hashing failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            AdminError::Database(ref e) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Database error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for admin results
pub type AdminResult<T> = Result<T, AdminError>;
