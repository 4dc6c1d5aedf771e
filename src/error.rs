//! Error taxonomy shared by every handler, plus the single boundary that
//! turns errors into `{ message, stack }` JSON bodies.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::state::AppState;
use crate::users::repo::StoreError;
use crate::users::validation::FieldError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    /// Every token or session failure collapses into this one message.
    #[error("Not authorized, please login.")]
    Unauthorized,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("{0}")]
    Unimplemented(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::Conflict(_)
            | AppError::NotFound(_)
            | AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Unimplemented(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub const DUPLICATE_EMAIL: &str = "This email address is already registered.";

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => AppError::Conflict(DUPLICATE_EMAIL.into()),
            StoreError::NotFound => AppError::NotFound("User not found.".into()),
            StoreError::Backend(e) => AppError::Internal(e),
        }
    }
}

impl From<Vec<FieldError>> for AppError {
    fn from(errors: Vec<FieldError>) -> Self {
        let msg = errors
            .iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join(", ");
        AppError::Validation(msg)
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub stack: Option<String>,
}

/// Debug rendering of the error, carried on the response until the boundary
/// decides whether clients may see it.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub message: String,
    pub trace: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Internal(e) = &self {
            error!(error = ?e, "internal error");
        }

        let message = self.to_string();
        let report = ErrorReport {
            message: message.clone(),
            trace: format!("{:?}", self),
        };

        let mut response = (
            status,
            Json(ErrorBody {
                message,
                stack: None,
            }),
        )
            .into_response();
        response.extensions_mut().insert(report);
        response
    }
}

/// Global error boundary. Re-renders error bodies with their trace when the
/// service runs in development.
pub async fn error_boundary(State(state): State<AppState>, mut response: Response) -> Response {
    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };
    if !state.config.environment.is_development() {
        return response;
    }

    let status = if response.status().is_success() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        response.status()
    };
    (
        status,
        Json(ErrorBody {
            message: report.message,
            stack: Some(report.trace),
        }),
    )
        .into_response()
}
