use axum::{middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Recommendations
        .route("/recommendations/:kind/:id", get(handlers::recommendations))
        // Titles
        .route("/titles/:kind/:id", get(handlers::title_details))
        .route("/titles/:kind/:id/trailer", get(handlers::trailer))
        .route("/titles/:kind/:id/similar", get(handlers::similar))
        .route(
            "/series/:id/seasons/:season/episodes",
            get(handlers::season_episodes),
        )
        // Discovery
        .route("/search", get(handlers::search))
        .route("/genres/:kind", get(handlers::genres))
        .route("/genres/:kind/:genre_id", get(handlers::genre_page))
        .route("/browse/:category", get(handlers::browse))
        .route("/trending/:scope", get(handlers::trending))
        // User
        .route(
            "/me/last-watched",
            get(handlers::get_last_watched).put(handlers::put_last_watched),
        )
        // Diagnostics
        .route(
            "/metrics",
            get(handlers::get_metrics).delete(handlers::clear_metrics),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        providers::MockCatalogProvider, watched::MockWatchedStore, CatalogProvider,
        PerformanceMonitor, RecommendationAggregator, RecommendationSettings,
    };
    use axum::{body::Body, http::Request, http::StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router(catalog: MockCatalogProvider) -> Router {
        let catalog: Arc<dyn CatalogProvider> = Arc::new(catalog);
        let aggregator =
            RecommendationAggregator::new(catalog.clone(), RecommendationSettings::default());
        create_router(AppState::new(
            catalog,
            Arc::new(aggregator),
            Arc::new(MockWatchedStore::new()),
            Arc::new(PerformanceMonitor::default()),
        ))
    }

    #[tokio::test]
    async fn test_routes_are_nested_under_api_v1() {
        let mut catalog = MockCatalogProvider::new();
        catalog.expect_fetch_genres().times(1).returning(|_| Ok(vec![]));

        let response = router(catalog)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/genres/tv")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = router(MockCatalogProvider::new())
            .oneshot(Request::builder().uri("/genres/tv").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
