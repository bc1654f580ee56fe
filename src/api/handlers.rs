use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::{
    CatalogItem, DisplayItem, Episode, Genre, LastWatched, MediaKind, RecommendationBuckets,
    TrendingScope,
};
use crate::services::{
    catalog::{BROWSE_LIMIT, SIMILAR_LIMIT},
    monitor::MetricSample,
    normalizer::{normalize, normalize_all, normalize_buckets},
};

use super::AppState;

/// Header carrying the caller's user id
pub const USER_ID_HEADER: &str = "x-user-id";

// Request/Response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleResponse {
    pub item: CatalogItem,
    pub display: DisplayItem,
    pub trailer_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrailerResponse {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenrePageResponse {
    pub results: Vec<DisplayItem>,
    pub next_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

/// Caller identity taken from the `x-user-id` header
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

#[async_trait::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| CurrentUser(s.to_string()))
            .ok_or(AppError::Unauthorized)
    }
}

// Handlers

pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

pub async fn recommendations(
    State(state): State<AppState>,
    Path((kind, id)): Path<(MediaKind, u64)>,
) -> AppResult<Json<RecommendationBuckets<DisplayItem>>> {
    let buckets = state.aggregator.recommend(kind, id).await?;
    Ok(Json(normalize_buckets(&buckets)))
}

pub async fn title_details(
    State(state): State<AppState>,
    Path((kind, id)): Path<(MediaKind, u64)>,
) -> AppResult<Json<TitleResponse>> {
    let details = state.catalog_service().title_details(kind, id).await?;
    Ok(Json(TitleResponse {
        display: normalize(&details.item),
        item: details.item,
        trailer_url: details.trailer_url,
    }))
}

pub async fn trailer(
    State(state): State<AppState>,
    Path((kind, id)): Path<(MediaKind, u64)>,
) -> AppResult<Json<TrailerResponse>> {
    let url = state.catalog_service().trailer(kind, id).await?;
    Ok(Json(TrailerResponse { url }))
}

pub async fn similar(
    State(state): State<AppState>,
    Path((kind, id)): Path<(MediaKind, u64)>,
) -> AppResult<Json<Vec<DisplayItem>>> {
    let items = state
        .catalog_service()
        .similar(kind, id, SIMILAR_LIMIT)
        .await?;
    Ok(Json(normalize_all(&items)))
}

pub async fn season_episodes(
    State(state): State<AppState>,
    Path((series_id, season)): Path<(u64, u32)>,
) -> AppResult<Json<Vec<Episode>>> {
    let episodes = state
        .catalog_service()
        .season_episodes(series_id, season)
        .await?;
    Ok(Json(episodes))
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<DisplayItem>>> {
    let items = state.catalog_service().search(&params.q).await?;
    Ok(Json(normalize_all(&items)))
}

pub async fn genres(
    State(state): State<AppState>,
    Path(kind): Path<MediaKind>,
) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.catalog_service().genres(kind).await?;
    Ok(Json(genres))
}

pub async fn genre_page(
    State(state): State<AppState>,
    Path((kind, genre_id)): Path<(MediaKind, u32)>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<GenrePageResponse>> {
    let page = state
        .catalog_service()
        .genre_page(genre_id, kind, params.page.unwrap_or(1))
        .await?;
    Ok(Json(GenrePageResponse {
        results: normalize_all(&page.results),
        next_page: page.next_page,
    }))
}

pub async fn browse(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Json<Vec<DisplayItem>>> {
    let items = state
        .catalog_service()
        .browse_category(&category, BROWSE_LIMIT)
        .await?;
    Ok(Json(normalize_all(&items)))
}

pub async fn trending(
    State(state): State<AppState>,
    Path(scope): Path<TrendingScope>,
) -> AppResult<Json<Vec<DisplayItem>>> {
    let items = state.catalog_service().trending(scope).await?;
    Ok(Json(normalize_all(&items)))
}

pub async fn get_last_watched(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<Json<Option<LastWatched>>> {
    let entry = state.watched.last_watched(&user_id).await?;
    Ok(Json(entry))
}

pub async fn put_last_watched(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(entry): Json<LastWatched>,
) -> AppResult<Json<LastWatched>> {
    let saved = state.watched.save_last_watched(&user_id, entry).await?;
    Ok(Json(saved))
}

pub async fn get_metrics(State(state): State<AppState>) -> Json<HashMap<String, MetricSample>> {
    Json(state.monitor.metrics().await)
}

pub async fn clear_metrics(State(state): State<AppState>) -> StatusCode {
    state.monitor.clear().await;
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        providers::MockCatalogProvider, watched::MockWatchedStore, PerformanceMonitor,
        RecommendationAggregator, RecommendationSettings,
    };
    use axum::http::{HeaderValue, Request};
    use std::sync::Arc;

    fn state_with(watched: MockWatchedStore) -> AppState {
        let catalog: Arc<dyn crate::services::CatalogProvider> =
            Arc::new(MockCatalogProvider::new());
        AppState::new(
            catalog.clone(),
            Arc::new(RecommendationAggregator::new(
                catalog,
                RecommendationSettings::default(),
            )),
            Arc::new(watched),
            Arc::new(PerformanceMonitor::default()),
        )
    }

    async fn extract_user(header: Option<&str>) -> Result<CurrentUser, AppError> {
        let mut builder = Request::builder().uri("/api/v1/me/last-watched");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, HeaderValue::from_str(value).unwrap());
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CurrentUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_current_user_from_header() {
        let user = extract_user(Some(" user-42 ")).await.unwrap();
        assert_eq!(user.0, "user-42");
    }

    #[tokio::test]
    async fn test_current_user_missing_or_blank() {
        assert!(matches!(extract_user(None).await, Err(AppError::Unauthorized)));
        assert!(matches!(extract_user(Some("  ")).await, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut watched = MockWatchedStore::new();
        watched
            .expect_last_watched()
            .returning(|_| Err(AppError::Internal("store down".to_string())));

        let result = get_last_watched(
            State(state_with(watched)),
            CurrentUser("u1".to_string()),
        )
        .await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
