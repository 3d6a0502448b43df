pub mod history;
pub mod models;
pub mod review;

// Re-exports
pub use models::*;

use axum::{extract::State, routing::get, Json, Router};

/// Assemble the full API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(review::routes())
        .merge(history::routes())
        .with_state(state)
}

// Health handler (simple, keep here)
pub async fn health_handler(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let total_reviews = state.store.count().await.unwrap_or(0);
    Json(models::HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        total_reviews,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{ReviewGenerator, GENERATION_FALLBACK};
    use crate::storage::ReviewStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "review-api-test-boundary";

    /// Router over an in-memory store and an unconfigured generator, so
    /// every generation call deterministically yields the fallback text.
    fn test_router() -> Router {
        let store = ReviewStore::open_in_memory().expect("open in-memory store");
        let generator = ReviewGenerator::new(None, "gemini-pro-latest");
        router(AppState {
            store: Arc::new(store),
            generator: Arc::new(generator),
        })
    }

    fn multipart_body(field_name: &str, filename: Option<&str>, payload: &[u8]) -> Vec<u8> {
        let disposition = match filename {
            Some(name) => format!(
                "Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{name}\"\r\n"
            ),
            None => format!("Content-Disposition: form-data; name=\"{field_name}\"\r\n"),
        };

        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn submit_request(field_name: &str, filename: Option<&str>, payload: &[u8]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/review")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(field_name, filename, payload)))
            .unwrap()
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn history(app: &Router) -> Vec<serde_json::Value> {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/history")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response_json(response).await.as_array().unwrap().clone()
    }

    #[tokio::test]
    async fn submit_persists_review_and_returns_its_id() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(submit_request("file", Some("main.rs"), b"fn main() {}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        let id = body["id"].as_i64().expect("id assigned");
        assert_eq!(body["review"], GENERATION_FALLBACK);

        let records = history(&app).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"].as_i64(), Some(id));
        assert_eq!(records[0]["filename"], "main.rs");
        assert_eq!(records[0]["review_content"], GENERATION_FALLBACK);
        assert!(records[0]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn failed_generation_is_persisted_as_ordinary_content() {
        // The test generator has no API key, so the generation call fails;
        // the request must still succeed with the fallback text as review.
        let app = test_router();

        let response = app
            .clone()
            .oneshot(submit_request("file", Some("lib.rs"), b"pub fn f() {}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body["review"], GENERATION_FALLBACK);
        assert!(body["id"].as_i64().is_some());

        let records = history(&app).await;
        assert_eq!(records[0]["review_content"], GENERATION_FALLBACK);
    }

    #[tokio::test]
    async fn missing_file_field_is_rejected() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(submit_request("attachment", Some("main.rs"), b"fn main() {}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response_json(response).await["error"], "No file part");

        assert!(history(&app).await.is_empty());
    }

    #[tokio::test]
    async fn non_multipart_submit_is_rejected() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/review")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response_json(response).await["error"], "No file part");
    }

    #[tokio::test]
    async fn empty_filename_is_rejected() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(submit_request("file", Some(""), b"fn main() {}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response_json(response).await["error"], "No selected file");

        assert!(history(&app).await.is_empty());
    }

    #[tokio::test]
    async fn file_field_without_filename_is_rejected() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(submit_request("file", None, b"fn main() {}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response_json(response).await["error"], "No selected file");
    }

    #[tokio::test]
    async fn non_utf8_upload_is_rejected() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(submit_request("file", Some("blob.bin"), &[0xff, 0xfe, 0x00]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert!(history(&app).await.is_empty());
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let app = test_router();

        for name in ["a.rs", "b.rs", "c.rs"] {
            let response = app
                .clone()
                .oneshot(submit_request("file", Some(name), b"fn main() {}"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let filenames: Vec<String> = history(&app)
            .await
            .iter()
            .map(|r| r["filename"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(filenames, vec!["c.rs", "b.rs", "a.rs"]);
    }

    #[tokio::test]
    async fn delete_removes_item_from_history() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(submit_request("file", Some("gone.rs"), b"fn main() {}"))
            .await
            .unwrap();
        let id = response_json(response).await["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/history/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], format!("Item {id} deleted."));

        assert!(history(&app).await.is_empty());
    }

    #[tokio::test]
    async fn deleting_unknown_id_reports_success() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/history/424242")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Item 424242 deleted.");
    }

    #[tokio::test]
    async fn submitting_then_deleting_everything_empties_history() {
        let app = test_router();

        let mut ids = Vec::new();
        for i in 0..4 {
            let response = app
                .clone()
                .oneshot(submit_request(
                    "file",
                    Some(&format!("file{i}.rs")),
                    b"fn main() {}",
                ))
                .await
                .unwrap();
            ids.push(response_json(response).await["id"].as_i64().unwrap());
        }
        assert_eq!(history(&app).await.len(), 4);

        for id in ids {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method("DELETE")
                        .uri(format!("/history/{id}"))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert!(history(&app).await.is_empty());
    }

    #[tokio::test]
    async fn health_reports_review_count() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(submit_request("file", Some("main.rs"), b"fn main() {}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["total_reviews"], 1);
    }
}
