use crate::api::history::handlers::{delete_history_handler, history_handler};
use crate::api::models::AppState;
use axum::{
    routing::{delete, get},
    Router,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(history_handler))
        .route("/history/{id}", delete(delete_history_handler))
}
