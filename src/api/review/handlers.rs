use crate::api::models::*;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::{extract::State, Json};
use tracing::{error, info};

/// Accept an uploaded source file, generate a review for it, and persist
/// the result.
pub async fn submit_review_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ReviewResponse>, AppError> {
    // A request without a multipart body carries no file part at all.
    let mut multipart = multipart.map_err(|_| AppError::MissingFile)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidUpload(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidUpload(e.to_string()))?;
            upload = Some((filename, data));
            break;
        }
    }

    let Some((filename, data)) = upload else {
        return Err(AppError::MissingFile);
    };
    let filename = filename.unwrap_or_default();
    if filename.is_empty() {
        return Err(AppError::EmptyFilename);
    }

    let code = std::str::from_utf8(&data).map_err(|_| {
        AppError::InvalidUpload("Uploaded file is not valid UTF-8 text".to_string())
    })?;

    info!(filename = %filename, bytes = data.len(), "Generating review");

    let review = state.generator.generate(code).await;

    // A storage failure never fails the request: the caller still gets the
    // review text, just without an id.
    let id = match state.store.insert(&filename, &review).await {
        Ok(id) => Some(id),
        Err(e) => {
            error!(error = %e, "Failed to save review");
            None
        }
    };

    info!(filename = %filename, id = ?id, "Review complete");

    Ok(Json(ReviewResponse { review, id }))
}
