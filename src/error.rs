/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - RepoError / TokenError / PatchError を統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::TokenError;
use crate::services::patch::PatchError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("{0}")]
    Validation(String),
    #[error("{resource} already exists")]
    UniqueConstraint { resource: &'static str },
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("forbidden")]
    Forbidden,
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("database error")]
    Database,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn unique(resource: &'static str) -> Self {
        Self::UniqueConstraint { resource }
    }

    /// `From<RepoError>`, but names the resource on a unique violation.
    pub fn from_repo(e: RepoError, resource: &'static str) -> Self {
        match e {
            RepoError::Conflict => AppError::unique(resource),
            other => other.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. }
            | AppError::Validation(_)
            | AppError::UniqueConstraint { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Database | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            AppError::BadRequest { code, message } => (code, message),
            AppError::Validation(message) => ("VALIDATION_ERROR", message),
            AppError::UniqueConstraint { resource } => {
                ("UNIQUE_CONSTRAINT", format!("{resource} already exists."))
            }
            AppError::Unauthorized => ("UNAUTHORIZED", "unauthorized".into()),
            AppError::InvalidCredentials => (
                "INVALID_CREDENTIALS",
                "invalid username or password".into(),
            ),
            AppError::Forbidden => ("FORBIDDEN", "forbidden".into()),
            AppError::NotFound { resource } => ("NOT_FOUND", format!("{resource} not found.")),
            // Never leak driver/database details.
            AppError::Database | AppError::Internal => (
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::unique("resource"),
            RepoError::Db(err) => {
                tracing::error!(error = %err, "database error");
                AppError::Database
            }
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            // Server-side key/encoding problems
            TokenError::EmptySecret | TokenError::Sign(_) | TokenError::ExpiryOutOfRange(_) => {
                AppError::Internal
            }
            _ => AppError::Unauthorized,
        }
    }
}

impl From<PatchError> for AppError {
    fn from(e: PatchError) -> Self {
        match e {
            PatchError::Empty => AppError::bad_request("EMPTY_PATCH", "no fields to update"),
        }
    }
}
