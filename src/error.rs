use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::repository::StoreError;

/// Entity
///
/// Names the kind of record a `NotFound` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Entity {
    Account,
    Roadmap,
    Section,
    Upcoming,
    Poll,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Account => "User",
            Entity::Roadmap => "Roadmap",
            Entity::Section => "Section",
            Entity::Upcoming => "Upcoming roadmap",
            Entity::Poll => "Poll",
        };
        f.write_str(name)
    }
}

/// ApiError
///
/// Every business rule fails with exactly one of these kinds. The message is safe to
/// show to end users; infrastructure failures (`Store`, `Credential`) are logged and
/// replaced by a generic message in the response.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Admin privileges required")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(Entity),

    #[error("Username already exists")]
    AlreadyExists,

    #[error("User already enrolled in this roadmap")]
    AlreadyEnrolled,

    #[error("Section already completed")]
    AlreadyCompleted,

    #[error("Roadmap is already published")]
    AlreadyPublished,

    #[error("User is already in list")]
    AlreadyListed,

    #[error("Username not added to system")]
    NotWhitelisted,

    #[error("User is not enrolled in this roadmap")]
    NotEnrolled,

    #[error("Missing or invalid field: {0}")]
    InvalidInput(&'static str),

    #[error("Cannot enroll in a draft roadmap")]
    DraftRoadmap,

    #[error("Section not found in the roadmap")]
    SectionNotInRoadmap,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid password")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Credential error: {0}")]
    Credential(String),
}

/// Convenience alias for service and handler return values.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Stable machine-readable code, sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated => "UNAUTHENTICATED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::AlreadyExists => "ALREADY_EXISTS",
            ApiError::AlreadyEnrolled => "ALREADY_ENROLLED",
            ApiError::AlreadyCompleted => "ALREADY_COMPLETED",
            ApiError::AlreadyPublished => "ALREADY_PUBLISHED",
            ApiError::AlreadyListed => "ALREADY_LISTED",
            ApiError::NotWhitelisted => "NOT_WHITELISTED",
            ApiError::NotEnrolled => "NOT_ENROLLED",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::DraftRoadmap => "DRAFT_ROADMAP",
            ApiError::SectionNotInRoadmap => "SECTION_NOT_IN_ROADMAP",
            ApiError::InvalidToken => "INVALID_TOKEN",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Store(_) | ApiError::Credential(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated | ApiError::InvalidToken | ApiError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden | ApiError::NotWhitelisted => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadyExists
            | ApiError::AlreadyEnrolled
            | ApiError::AlreadyCompleted
            | ApiError::AlreadyPublished
            | ApiError::AlreadyListed => StatusCode::CONFLICT,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotEnrolled | ApiError::DraftRoadmap | ApiError::SectionNotInRoadmap => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Store(_) | ApiError::Credential(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Store(err) => {
                tracing::error!(error = %err, "Store failure");
                "An internal error occurred".to_string()
            }
            ApiError::Credential(msg) => {
                tracing::error!(error = %msg, "Credential failure");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "error": message,
            "code": self.code(),
        });

        (self.status(), Json(body)).into_response()
    }
}
