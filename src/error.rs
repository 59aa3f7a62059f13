// src/error.rs
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

use crate::schema::ValidationFailure;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation Error: {0}")]
    Validation(#[from] ValidationFailure),
    #[error("DATABASE Error: {0}")]
    Database(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Unexpected Error: {0}")]
    Unexpected(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Database(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn category(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Validation Error",
            AppError::Database(_) => "DATABASE Error",
            AppError::NotFound(_) => "Not Found",
            AppError::Unexpected(_) => "Unexpected Error",
        }
    }

    fn message(&self) -> Value {
        match self {
            AppError::Validation(ValidationFailure::Fields(errors)) => json!(errors),
            AppError::Validation(failure) => json!(failure.to_string()),
            AppError::Database(msg) | AppError::NotFound(msg) | AppError::Unexpected(msg) => {
                json!(msg)
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::NotFound(err.to_string()),
            StoreError::Persistence(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, "request rejected");
        }

        let body = json!({
            "error": self.category(),
            "message": self.message(),
        });
        (status, Json(body)).into_response()
    }
}
