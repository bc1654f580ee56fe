//! Redis-backed response cache in front of any catalog provider
//!
//! Keeps the provider itself cache-free. TTLs follow how quickly each kind of
//! catalog data goes stale: searches and trending lists turn over fast, genre
//! lists almost never change.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::AppResult,
    models::{CatalogItem, Credits, DiscoverQuery, Episode, Genre, Listing, MediaKind},
    services::providers::CatalogProvider,
};
use std::sync::Arc;

const DEFAULT_TTL: u64 = 300; // 5 minutes
const SEARCH_TTL: u64 = 120; // 2 minutes
const TRENDING_TTL: u64 = 600; // 10 minutes
const GENRES_TTL: u64 = 86400; // 1 day

#[derive(Clone)]
pub struct CachedCatalog {
    inner: Arc<dyn CatalogProvider>,
    cache: Cache,
}

impl CachedCatalog {
    pub fn new(inner: Arc<dyn CatalogProvider>, cache: Cache) -> Self {
        tracing::info!(provider = inner.name(), "Catalog response cache enabled");
        Self { inner, cache }
    }
}

fn listing_ttl(listing: &Listing) -> u64 {
    match listing {
        Listing::Trending(_) => TRENDING_TTL,
        _ => DEFAULT_TTL,
    }
}

#[async_trait::async_trait]
impl CatalogProvider for CachedCatalog {
    async fn fetch_details(&self, kind: MediaKind, id: u64) -> AppResult<CatalogItem> {
        cached!(self.cache, CacheKey::Details(kind, id), DEFAULT_TTL, async move {
            self.inner.fetch_details(kind, id).await
        })
    }

    async fn fetch_credits(&self, kind: MediaKind, id: u64) -> AppResult<Credits> {
        cached!(self.cache, CacheKey::Credits(kind, id), DEFAULT_TTL, async move {
            self.inner.fetch_credits(kind, id).await
        })
    }

    async fn fetch_similar(&self, kind: MediaKind, id: u64) -> AppResult<Vec<CatalogItem>> {
        cached!(self.cache, CacheKey::Similar(kind, id), DEFAULT_TTL, async move {
            self.inner.fetch_similar(kind, id).await
        })
    }

    async fn fetch_trailer(&self, kind: MediaKind, id: u64) -> AppResult<Option<String>> {
        cached!(self.cache, CacheKey::Trailer(kind, id), DEFAULT_TTL, async move {
            self.inner.fetch_trailer(kind, id).await
        })
    }

    async fn fetch_person_credits(&self, person_id: u64) -> AppResult<Vec<CatalogItem>> {
        cached!(
            self.cache,
            CacheKey::PersonCredits(person_id),
            DEFAULT_TTL,
            async move { self.inner.fetch_person_credits(person_id).await }
        )
    }

    async fn discover(
        &self,
        kind: MediaKind,
        query: &DiscoverQuery,
    ) -> AppResult<Vec<CatalogItem>> {
        cached!(
            self.cache,
            CacheKey::Discover(kind, query.clone()),
            DEFAULT_TTL,
            async move { self.inner.discover(kind, query).await }
        )
    }

    async fn search(&self, query: &str) -> AppResult<Vec<CatalogItem>> {
        cached!(
            self.cache,
            CacheKey::Search(query.to_string()),
            SEARCH_TTL,
            async move { self.inner.search(query).await }
        )
    }

    async fn fetch_genres(&self, kind: MediaKind) -> AppResult<Vec<Genre>> {
        cached!(self.cache, CacheKey::Genres(kind), GENRES_TTL, async move {
            self.inner.fetch_genres(kind).await
        })
    }

    async fn fetch_season_episodes(&self, series_id: u64, season: u32) -> AppResult<Vec<Episode>> {
        cached!(
            self.cache,
            CacheKey::Season(series_id, season),
            DEFAULT_TTL,
            async move { self.inner.fetch_season_episodes(series_id, season).await }
        )
    }

    async fn fetch_listing(&self, listing: Listing, page: u32) -> AppResult<Vec<CatalogItem>> {
        cached!(
            self.cache,
            CacheKey::Listing(listing, page),
            listing_ttl(&listing),
            async move { self.inner.fetch_listing(listing, page).await }
        )
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrendingScope;

    #[test]
    fn test_listing_ttl() {
        assert_eq!(listing_ttl(&Listing::Trending(TrendingScope::Movie)), 600);
        assert_eq!(listing_ttl(&Listing::Upcoming), 300);
    }
}
