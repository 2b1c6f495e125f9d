use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::nutrition::Unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Food,
    Recipe,
    Meal,
    MealItem,
    Goal,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Food => "food",
            EntityKind::Recipe => "recipe",
            EntityKind::Meal => "meal",
            EntityKind::MealItem => "meal item",
            EntityKind::Goal => "goal",
        })
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    /// A food, recipe or meal referenced by the operation does not exist.
    #[error("{kind} {id} not found")]
    ReferenceNotFound { kind: EntityKind, id: Uuid },

    /// The meal a meal item belongs to does not exist (or is not the caller's).
    #[error("meal {0} not found")]
    ParentNotFound(Uuid),

    /// The entity addressed by the request itself does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Uuid },

    #[error("invalid reference: {0}")]
    InvalidReference(&'static str),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("quantity must be a positive number, got {0}")]
    InvalidQuantity(f64),

    #[error("servings must be positive")]
    InvalidServings,

    #[error("unit `{unit}` cannot be converted for {kind} {id}")]
    UnsupportedUnit {
        unit: Unit,
        kind: EntityKind,
        id: Uuid,
    },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::ReferenceNotFound { .. } => "REFERENCE_NOT_FOUND",
            EngineError::ParentNotFound(_) => "PARENT_NOT_FOUND",
            EngineError::NotFound { .. } => "NOT_FOUND",
            EngineError::InvalidReference(_) => "INVALID_REFERENCE",
            EngineError::InvariantViolation(_) => "INVARIANT_VIOLATION",
            EngineError::InvalidQuantity(_) => "INVALID_QUANTITY",
            EngineError::InvalidServings => "INVALID_SERVINGS",
            EngineError::UnsupportedUnit { .. } => "UNSUPPORTED_UNIT",
            EngineError::Validation(_) => "VALIDATION_ERROR",
            EngineError::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            EngineError::ReferenceNotFound { .. }
            | EngineError::ParentNotFound(_)
            | EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
            EngineError::InvalidReference(_)
            | EngineError::InvalidQuantity(_)
            | EngineError::InvalidServings
            | EngineError::UnsupportedUnit { .. }
            | EngineError::Validation(_) => StatusCode::BAD_REQUEST,
            EngineError::InvariantViolation(_) | EngineError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub(crate) fn not_found(kind: EntityKind, id: Uuid) -> Self {
        EngineError::NotFound { kind, id }
    }

    pub(crate) fn missing_ref(kind: EntityKind, id: Uuid) -> Self {
        EngineError::ReferenceNotFound { kind, id }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, code = self.code(), "request failed");
        } else {
            warn!(error = %self, code = self.code(), "request rejected");
        }

        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
