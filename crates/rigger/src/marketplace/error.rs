use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::lifecycle::InvalidTransition;
use super::policy::Action;
use super::store::StoreError;
use super::validation::{JobPatchError, ValidationErrors};

/// Error raised by the marketplace service and surfaced by the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("authentication required")]
    Unauthorized,
    #[error("not permitted to {}", .0.describe())]
    Forbidden(Action),
    #[error("job has reached its limit of {limit} applicants")]
    CapacityExceeded { limit: u32 },
    #[error("an active application for this job already exists")]
    DuplicateApplication,
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error("job store unavailable: {0}")]
    StoreUnavailable(String),
}

impl MarketplaceError {
    pub(crate) fn job_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "job",
            id: id.to_string(),
        }
    }

    pub(crate) fn application_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "application",
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code carried in error bodies.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            Self::DuplicateApplication => "DUPLICATE_APPLICATION",
            Self::InvalidTransition(_) => "INVALID_TRANSITION",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::CapacityExceeded { .. }
            | Self::DuplicateApplication
            | Self::InvalidTransition(_) => StatusCode::CONFLICT,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<JobPatchError> for MarketplaceError {
    fn from(error: JobPatchError) -> Self {
        match error {
            JobPatchError::Validation(errors) => Self::Validation(errors),
            JobPatchError::Transition(transition) => Self::InvalidTransition(transition),
        }
    }
}

/// Undecodable bodies are reported per field like any other invalid payload.
impl From<JsonRejection> for MarketplaceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(ValidationErrors::from_rejection("body", &rejection.body_text()))
    }
}

impl From<QueryRejection> for MarketplaceError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(ValidationErrors::from_rejection("query", &rejection.body_text()))
    }
}

/// Context-free mapping; callers translate `Conflict` and `NotFound` themselves
/// when they know which record was involved.
impl From<StoreError> for MarketplaceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound {
                entity: "record",
                id: String::new(),
            },
            StoreError::Duplicate => Self::DuplicateApplication,
            StoreError::CapacityReached { limit } => Self::CapacityExceeded { limit },
            StoreError::Conflict => Self::InvalidTransition(InvalidTransition {
                entity: "record",
                from: "STALE",
                to: "CURRENT",
                detail: Some("record changed concurrently"),
            }),
            StoreError::Unavailable(reason) => Self::StoreUnavailable(reason),
        }
    }
}

impl IntoResponse for MarketplaceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let payload = match &self {
            Self::Validation(errors) => json!({
                "error": self.to_string(),
                "kind": self.kind(),
                "fields": errors,
            }),
            _ => json!({
                "error": self.to_string(),
                "kind": self.kind(),
            }),
        };
        (status, axum::Json(payload)).into_response()
    }
}
