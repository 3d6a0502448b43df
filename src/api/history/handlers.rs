use crate::api::models::*;
use crate::storage::ReviewRecord;
use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{error, info};

/// Fetch all past reviews, newest first.
pub async fn history_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReviewRecord>>, AppError> {
    let records = state.store.list_all().await.map_err(|e| {
        error!(error = %e, "Failed to fetch history");
        AppError::HistoryUnavailable
    })?;

    Ok(Json(records))
}

/// Delete a single review from the history. Reports success whether or not
/// a matching record existed.
pub async fn delete_history_handler(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.store.delete(item_id).await.map_err(|e| {
        error!(item_id, error = %e, "Failed to delete history item");
        AppError::DeleteFailed
    })?;

    info!(item_id, "History item deleted");

    Ok(Json(DeleteResponse {
        success: true,
        message: format!("Item {item_id} deleted."),
    }))
}
