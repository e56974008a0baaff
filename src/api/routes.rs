//! API Routes
//!
//! Configures the Axum router with all cache endpoints.

use axum::{
    routing::{delete, get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_edit_handler, delete_tile_handler, get_tile_handler, health_handler,
    list_edits_handler, put_edit_handler, put_tile_handler, stats_handler, AppState,
};
use crate::storage::StorageEngine;

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin, so browser-based map clients can call it
/// - Tracing: Logs all requests for debugging
pub fn create_router<E: StorageEngine>(state: AppState<E>) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/tiles", put(put_tile_handler::<E>))
        .route(
            "/tiles/:src",
            get(get_tile_handler::<E>).delete(delete_tile_handler::<E>),
        )
        .route(
            "/edits",
            put(put_edit_handler::<E>).get(list_edits_handler::<E>),
        )
        .route("/edits/:key", delete(delete_edit_handler::<E>))
        .route("/stats", get(stats_handler::<E>))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::OfflineCache;
    use crate::storage::MemoryEngine;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    async fn create_test_app() -> Router {
        let mut cache = OfflineCache::new(MemoryEngine::new(), "routes", None);
        cache.open().await.unwrap();
        create_router(AppState::new(cache))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_put_tile_endpoint() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/tiles")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"src":"a1","data":"d2"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_tile_not_found() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/tiles/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
