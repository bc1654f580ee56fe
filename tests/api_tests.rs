use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use binge_cinema::api::{create_router, AppState};
use binge_cinema::error::{AppError, AppResult};
use binge_cinema::models::{
    CastMember, CatalogItem, Credits, DiscoverQuery, Episode, Genre, Listing, MediaKind,
    RawCatalogItem,
};
use binge_cinema::services::{
    CatalogProvider, InMemoryWatchedStore, PerformanceMonitor, RecommendationAggregator,
    RecommendationSettings,
};

/// Canned catalog: id 404 is missing, id 550 has a cast and genres, anything else is bare
struct StubCatalog;

fn item(id: u64, kind: MediaKind, date: &str, rating: f64) -> CatalogItem {
    let raw = match kind {
        MediaKind::Movie => RawCatalogItem {
            title: Some(format!("Title {}", id)),
            release_date: Some(date.to_string()),
            ..Default::default()
        },
        MediaKind::Series => RawCatalogItem {
            name: Some(format!("Title {}", id)),
            first_air_date: Some(date.to_string()),
            ..Default::default()
        },
    };
    RawCatalogItem {
        id,
        vote_average: Some(rating),
        ..raw
    }
    .resolve(kind)
}

fn missing(endpoint: &str) -> AppError {
    AppError::Request {
        endpoint: endpoint.to_string(),
        status: 404,
    }
}

#[async_trait::async_trait]
impl CatalogProvider for StubCatalog {
    async fn fetch_details(&self, kind: MediaKind, id: u64) -> AppResult<CatalogItem> {
        if id == 404 {
            return Err(missing("movie_details"));
        }
        let mut subject = item(id, kind, "1999-10-15", 8.4);
        if id == 550 {
            subject.genres = vec![Genre {
                id: 18,
                name: "Drama".to_string(),
            }];
        }
        Ok(subject)
    }

    async fn fetch_credits(&self, _kind: MediaKind, id: u64) -> AppResult<Credits> {
        let cast = if id == 550 {
            vec![CastMember {
                id: 287,
                name: "Brad Pitt".to_string(),
                character: Some("Tyler Durden".to_string()),
                order: Some(0),
            }]
        } else {
            vec![]
        };
        Ok(Credits { cast })
    }

    async fn fetch_similar(&self, kind: MediaKind, id: u64) -> AppResult<Vec<CatalogItem>> {
        if id == 550 {
            Ok(vec![item(807, kind, "1995-09-22", 8.3)])
        } else {
            Ok(vec![])
        }
    }

    async fn fetch_trailer(&self, _kind: MediaKind, id: u64) -> AppResult<Option<String>> {
        Ok((id == 550).then(|| "https://www.youtube.com/embed/SUXWAEX2jlg".to_string()))
    }

    async fn fetch_person_credits(&self, _person_id: u64) -> AppResult<Vec<CatalogItem>> {
        Ok(vec![
            item(1422, MediaKind::Movie, "2009-08-18", 8.2),
            item(297, MediaKind::Movie, "1988-01-01", 9.0),
        ])
    }

    async fn discover(
        &self,
        kind: MediaKind,
        _query: &DiscoverQuery,
    ) -> AppResult<Vec<CatalogItem>> {
        Ok(vec![item(680, kind, "1994-09-10", 8.5)])
    }

    async fn search(&self, query: &str) -> AppResult<Vec<CatalogItem>> {
        Ok(vec![item(27205, MediaKind::Movie, "2010-07-15", 8.4)]
            .into_iter()
            .filter(|_| query.contains("incep"))
            .collect())
    }

    async fn fetch_genres(&self, _kind: MediaKind) -> AppResult<Vec<Genre>> {
        Ok(vec![Genre {
            id: 28,
            name: "Action".to_string(),
        }])
    }

    async fn fetch_season_episodes(
        &self,
        _series_id: u64,
        _season: u32,
    ) -> AppResult<Vec<Episode>> {
        Ok(vec![])
    }

    async fn fetch_listing(&self, listing: Listing, page: u32) -> AppResult<Vec<CatalogItem>> {
        if page > 1 {
            return Ok(vec![]);
        }
        Ok(vec![
            item(1, listing.fallback_kind(), "2022-01-01", 7.0),
            item(2, listing.fallback_kind(), "1970-01-01", 7.0),
        ])
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn create_test_server() -> TestServer {
    let catalog: Arc<dyn CatalogProvider> = Arc::new(StubCatalog);
    let state = AppState::new(
        catalog.clone(),
        Arc::new(RecommendationAggregator::new(
            catalog,
            RecommendationSettings::default(),
        )),
        Arc::new(InMemoryWatchedStore::new()),
        Arc::new(PerformanceMonitor::default()),
    );
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn user_header() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-user-id"),
        HeaderValue::from_static("user-1"),
    )
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_response_carries_request_id() {
    let server = create_test_server();

    let response = server.get("/health").await;
    assert!(response.headers().contains_key("x-request-id"));

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("client-trace-7"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "client-trace-7");
}

#[tokio::test]
async fn test_recommendations_buckets() {
    let server = create_test_server();

    let response = server.get("/api/v1/recommendations/movie/550").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let from_cast = body["fromCast"].as_array().unwrap();
    assert_eq!(from_cast.len(), 1);
    assert_eq!(from_cast[0]["id"], 1422);
    assert_eq!(from_cast[0]["year"], "2009");
    assert_eq!(from_cast[0]["ratingText"], "8.2");

    assert_eq!(body["fromGenre"][0]["id"], 680);
    assert_eq!(body["others"][0]["id"], 807);
}

#[tokio::test]
async fn test_recommendations_for_bare_title_are_empty() {
    let server = create_test_server();

    let response = server.get("/api/v1/recommendations/tv/1399").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "fromCast": [], "fromGenre": [], "others": [] }));
}

#[tokio::test]
async fn test_recommendations_missing_subject() {
    let server = create_test_server();

    let response = server.get("/api/v1/recommendations/movie/404").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_recommendations_rejects_unknown_kind() {
    let server = create_test_server();
    let response = server.get("/api/v1/recommendations/podcast/550").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_title_details_with_trailer() {
    let server = create_test_server();

    let response = server.get("/api/v1/titles/movie/550").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["item"]["id"], 550);
    assert_eq!(body["display"]["genreLabel"], "Drama");
    assert_eq!(
        body["trailerUrl"],
        "https://www.youtube.com/embed/SUXWAEX2jlg"
    );

    let response = server.get("/api/v1/titles/series/12/trailer").await;
    response.assert_json(&json!({ "url": null }));
}

#[tokio::test]
async fn test_search() {
    let server = create_test_server();

    let response = server.get("/api/v1/search").add_query_param("q", "inception").await;
    response.assert_status_ok();
    let results: Vec<Value> = response.json();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["title"], "Title 27205");

    let response = server.get("/api/v1/search").await;
    response.assert_json(&json!([]));
}

#[tokio::test]
async fn test_trending_applies_recency() {
    let server = create_test_server();

    let response = server.get("/api/v1/trending/all").await;
    response.assert_status_ok();
    let results: Vec<Value> = response.json();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], 1);
}

#[tokio::test]
async fn test_browse_keeps_older_titles() {
    let server = create_test_server();

    let response = server.get("/api/v1/browse/top_rated").await;
    let results: Vec<Value> = response.json();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_genre_page() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/genres/movie/18")
        .add_query_param("page", 2)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["nextPage"], 3);
    assert_eq!(body["results"][0]["id"], 680);

    let response = server.get("/api/v1/genres/movie/0").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_season_zero_is_bad_request() {
    let server = create_test_server();
    let response = server.get("/api/v1/series/1399/seasons/0/episodes").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_last_watched_requires_user() {
    let server = create_test_server();

    let response = server.get("/api/v1/me/last-watched").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    response.assert_json(&json!({ "error": "Not authenticated" }));
}

#[tokio::test]
async fn test_last_watched_merge_write() {
    let server = create_test_server();
    let (name, value) = user_header();

    let response = server
        .get("/api/v1/me/last-watched")
        .add_header(name.clone(), value.clone())
        .await;
    response.assert_json(&Value::Null);

    server
        .put("/api/v1/me/last-watched")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "movieId": "550", "title": "Fight Club", "poster_path": "/fc.jpg" }))
        .await
        .assert_status_ok();

    let response = server
        .put("/api/v1/me/last-watched")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "movieId": "680" }))
        .await;
    response.assert_json(&json!({
        "movieId": "680",
        "title": "Fight Club",
        "poster_path": "/fc.jpg"
    }));

    let response = server
        .get("/api/v1/me/last-watched")
        .add_header(name, value)
        .await;
    let body: Value = response.json();
    assert_eq!(body["movieId"], "680");
}

#[tokio::test]
async fn test_metrics_snapshot_and_clear() {
    let server = create_test_server();

    server.get("/api/v1/metrics").await.assert_json(&json!({}));
    server
        .delete("/api/v1/metrics")
        .await
        .assert_status(StatusCode::NO_CONTENT);
}
