//! Error type returned by HTTP handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::remote::RemoteError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Admin client not configured")]
    NotConfigured,

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<redb::Error> for AppError {
    fn from(e: redb::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

macro_rules! storage_error {
    ($($ty:ty),*) => {
        $(impl From<$ty> for AppError {
            fn from(e: $ty) -> Self {
                AppError::Storage(e.to_string())
            }
        })*
    };
}

storage_error!(
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError
);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Remote(RemoteError::InvalidToken) => StatusCode::UNAUTHORIZED,
            AppError::Remote(RemoteError::NotFound) => StatusCode::NOT_FOUND,
            AppError::NotConfigured
            | AppError::Remote(_)
            | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
