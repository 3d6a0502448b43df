use crate::generator::ReviewGenerator;
use crate::storage::ReviewStore;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ReviewStore>,
    pub generator: Arc<ReviewGenerator>,
}

/// Response after submitting a file for review.
///
/// `id` is absent when the review could not be persisted; the review text is
/// returned regardless.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub review: String,
    pub id: Option<i64>,
}

/// Response after deleting a history item
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub total_reviews: usize,
}

/// Error body for submission and history fetches
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error body for failed deletions
#[derive(Debug, Serialize)]
pub struct DeleteErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// No `file` field in the request (or the body was not multipart at all).
    MissingFile,
    /// A `file` field arrived without a filename.
    EmptyFilename,
    /// The upload could not be read or decoded as text.
    InvalidUpload(String),
    /// The history listing could not be fetched from storage.
    HistoryUnavailable,
    /// The deletion statement failed in storage.
    DeleteFailed,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::MissingFile => error_body(StatusCode::BAD_REQUEST, "No file part"),
            AppError::EmptyFilename => error_body(StatusCode::BAD_REQUEST, "No selected file"),
            AppError::InvalidUpload(message) => error_body(StatusCode::BAD_REQUEST, &message),
            AppError::HistoryUnavailable => {
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Could not fetch history")
            }
            AppError::DeleteFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DeleteErrorResponse {
                    success: false,
                    error: "Could not delete item".to_string(),
                }),
            )
                .into_response(),
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
