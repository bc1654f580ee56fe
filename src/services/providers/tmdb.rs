//! TMDB v3 provider
//!
//! Talks to api.themoviedb.org with a read-access bearer token. Each call is timed
//! through the shared `PerformanceMonitor`; the client itself enforces the
//! configured per-request timeout.
//!
//! Endpoints used:
//! - `/{movie|tv}/{id}`, `/{movie|tv}/{id}/credits`, `/{movie|tv}/{id}/similar`,
//!   `/{movie|tv}/{id}/videos`
//! - `/person/{id}/combined_credits`
//! - `/discover/{movie|tv}`, `/search/multi`, `/genre/{movie|tv}/list`
//! - `/tv/{id}/season/{n}` and the curated lists in [`Listing`]
use crate::{
    error::{AppError, AppResult},
    models::{
        resolve_all, CatalogItem, CombinedCredits, Credits, DiscoverQuery, Episode, Genre,
        GenreList, Listing, MediaKind, PagedResults, RawCatalogItem, SeasonDetails, Video,
    },
    services::{monitor::PerformanceMonitor, providers::CatalogProvider},
};
use reqwest::{header, Client as HttpClient};
use serde::de::DeserializeOwned;
use std::{sync::Arc, time::Duration};

const LANGUAGE: &str = "en-US";
const YOUTUBE_EMBED: &str = "https://www.youtube.com/embed";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    access_token: String,
    api_url: String,
    monitor: Arc<PerformanceMonitor>,
}

impl TmdbProvider {
    pub fn new(
        access_token: String,
        api_url: String,
        timeout: Duration,
        monitor: Arc<PerformanceMonitor>,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            access_token,
            api_url: api_url.trim_end_matches('/').to_string(),
            monitor,
        })
    }

    /// GETs `path` and decodes the JSON body.
    ///
    /// `endpoint` names the call in logs, metrics and `AppError::Request`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);
        tracing::debug!(endpoint = %endpoint, url = %url, "Catalog request");

        self.monitor
            .measure(endpoint, async {
                let response = self
                    .http_client
                    .get(&url)
                    .bearer_auth(&self.access_token)
                    .header(header::ACCEPT, "application/json")
                    .query(&[("language", LANGUAGE)])
                    .query(params)
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    tracing::error!(
                        endpoint = %endpoint,
                        status = %status,
                        body = %body,
                        "Catalog request failed"
                    );
                    return Err(AppError::Request {
                        endpoint: endpoint.to_string(),
                        status: status.as_u16(),
                    });
                }

                let response_text = response.text().await?;
                serde_json::from_str(&response_text).map_err(|e| {
                    tracing::error!(
                        endpoint = %endpoint,
                        error = %e,
                        "Failed to deserialize catalog response"
                    );
                    AppError::ExternalApi(format!("Failed to parse {} response: {}", endpoint, e))
                })
            })
            .await
    }

    async fn get_items(
        &self,
        endpoint: &str,
        path: &str,
        params: &[(&str, String)],
        fallback: MediaKind,
    ) -> AppResult<Vec<CatalogItem>> {
        let page: PagedResults<RawCatalogItem> = self.get_json(endpoint, path, params).await?;
        Ok(resolve_all(page.results, fallback))
    }
}

/// Embed URL of the first YouTube trailer
pub fn pick_trailer(videos: &[Video]) -> Option<String> {
    videos
        .iter()
        .find(|v| v.video_type == "Trailer" && v.site == "YouTube")
        .map(|v| format!("{}/{}", YOUTUBE_EMBED, v.key))
}

fn endpoint_name(kind: MediaKind, call: &str) -> String {
    format!("{}_{}", kind.api_segment(), call)
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn fetch_details(&self, kind: MediaKind, id: u64) -> AppResult<CatalogItem> {
        let raw: RawCatalogItem = self
            .get_json(
                &endpoint_name(kind, "details"),
                &format!("/{}/{}", kind.api_segment(), id),
                &[],
            )
            .await?;

        Ok(raw.resolve(kind))
    }

    async fn fetch_credits(&self, kind: MediaKind, id: u64) -> AppResult<Credits> {
        let credits: Credits = self
            .get_json(
                &endpoint_name(kind, "credits"),
                &format!("/{}/{}/credits", kind.api_segment(), id),
                &[],
            )
            .await?;

        tracing::debug!(kind = %kind, id = id, cast = credits.cast.len(), "Credits fetched");
        Ok(credits)
    }

    async fn fetch_similar(&self, kind: MediaKind, id: u64) -> AppResult<Vec<CatalogItem>> {
        self.get_items(
            &endpoint_name(kind, "similar"),
            &format!("/{}/{}/similar", kind.api_segment(), id),
            &[("page", "1".to_string())],
            kind,
        )
        .await
    }

    async fn fetch_trailer(&self, kind: MediaKind, id: u64) -> AppResult<Option<String>> {
        let videos: PagedResults<Video> = self
            .get_json(
                &endpoint_name(kind, "videos"),
                &format!("/{}/{}/videos", kind.api_segment(), id),
                &[],
            )
            .await?;

        Ok(pick_trailer(&videos.results))
    }

    async fn fetch_person_credits(&self, person_id: u64) -> AppResult<Vec<CatalogItem>> {
        let credits: CombinedCredits = self
            .get_json(
                "person_credits",
                &format!("/person/{}/combined_credits", person_id),
                &[],
            )
            .await?;

        let items: Vec<CatalogItem> = credits
            .cast
            .into_iter()
            .filter_map(|raw| {
                let kind = raw.media_type.as_deref().and_then(MediaKind::from_api_marker)?;
                Some(raw.resolve(kind))
            })
            .collect();

        tracing::debug!(person_id = person_id, credits = items.len(), "Person credits fetched");
        Ok(items)
    }

    async fn discover(
        &self,
        kind: MediaKind,
        query: &DiscoverQuery,
    ) -> AppResult<Vec<CatalogItem>> {
        self.get_items(
            &endpoint_name(kind, "discover"),
            &format!("/discover/{}", kind.api_segment()),
            &query.to_params(),
            kind,
        )
        .await
    }

    async fn search(&self, query: &str) -> AppResult<Vec<CatalogItem>> {
        let page: PagedResults<RawCatalogItem> = self
            .get_json(
                "search",
                "/search/multi",
                &[
                    ("query", query.to_string()),
                    ("include_adult", "false".to_string()),
                ],
            )
            .await?;

        // Multi search mixes in people; keep only explicitly marked titles
        let items: Vec<CatalogItem> = page
            .results
            .into_iter()
            .filter_map(|raw| {
                let kind = raw.media_type.as_deref().and_then(MediaKind::from_api_marker)?;
                Some(raw.resolve(kind))
            })
            .collect();

        tracing::info!(
            query = %query,
            results = items.len(),
            provider = "tmdb",
            "Title search completed"
        );

        Ok(items)
    }

    async fn fetch_genres(&self, kind: MediaKind) -> AppResult<Vec<Genre>> {
        let list: GenreList = self
            .get_json(
                &endpoint_name(kind, "genres"),
                &format!("/genre/{}/list", kind.api_segment()),
                &[],
            )
            .await?;
        Ok(list.genres)
    }

    async fn fetch_season_episodes(&self, series_id: u64, season: u32) -> AppResult<Vec<Episode>> {
        let details: SeasonDetails = self
            .get_json(
                "tv_season",
                &format!("/tv/{}/season/{}", series_id, season),
                &[],
            )
            .await?;
        Ok(details.episodes)
    }

    async fn fetch_listing(&self, listing: Listing, page: u32) -> AppResult<Vec<CatalogItem>> {
        let (path, mut params) = listing.path();
        params.push(("page", page.to_string()));

        self.get_items(
            &format!("listing_{}", listing),
            &path,
            &params,
            listing.fallback_kind(),
        )
        .await
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
