use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

pub mod events;
pub mod history;
pub mod recommendations;
pub mod state;

pub use state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recommendations", post(recommendations::recommend))
        .route("/events/upcoming", get(events::upcoming))
        .route("/users/:user_id/search-history", get(history::search_history))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue, Method};
    use axum_test::TestServer;

    use crate::services::store::MemoryEventStore;

    fn server() -> TestServer {
        let app = create_router(AppState::with_store(Arc::new(MemoryEventStore::new())));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_cors_preflight_is_allowed() {
        let response = server()
            .method(Method::OPTIONS, "/api/v1/recommendations")
            .add_header(
                HeaderName::from_static("origin"),
                HeaderValue::from_static("http://localhost:8081"),
            )
            .add_header(
                HeaderName::from_static("access-control-request-method"),
                HeaderValue::from_static("POST"),
            )
            .await;

        assert!(response.status_code().is_success());
        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let response = server()
            .post("/api/v1/recommendations")
            .text("{not json")
            .content_type("application/json")
            .await;

        assert!(response.status_code().is_client_error());
    }
}
