//! Catalog metadata provider abstraction
//!
//! Typed access to the external movie/TV catalog. Implementations resolve every
//! item's media kind before returning it, so callers never look at raw payload
//! shapes. Providers do not retry and do not cache; a failed call surfaces as an
//! `AppError` (a non-2xx answer becomes `AppError::Request` with its status).
//! Caching is layered on top by [`cached::CachedCatalog`].
use crate::{
    error::AppResult,
    models::{CatalogItem, Credits, DiscoverQuery, Episode, Genre, Listing, MediaKind},
};

pub mod cached;
pub mod tmdb;

pub use cached::CachedCatalog;
pub use tmdb::TmdbProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Full record for one movie or series
    async fn fetch_details(&self, kind: MediaKind, id: u64) -> AppResult<CatalogItem>;

    /// Cast list in billing order
    async fn fetch_credits(&self, kind: MediaKind, id: u64) -> AppResult<Credits>;

    /// First page of the API's "similar" list; items default to `kind`
    async fn fetch_similar(&self, kind: MediaKind, id: u64) -> AppResult<Vec<CatalogItem>>;

    /// YouTube embed URL of the first trailer, if any
    async fn fetch_trailer(&self, kind: MediaKind, id: u64) -> AppResult<Option<String>>;

    /// Movies and series a person appeared in. Only entries the API marks as
    /// `movie` or `tv` are returned.
    async fn fetch_person_credits(&self, person_id: u64) -> AppResult<Vec<CatalogItem>>;

    /// Genre-filtered discovery
    async fn discover(&self, kind: MediaKind, query: &DiscoverQuery)
        -> AppResult<Vec<CatalogItem>>;

    /// Multi search over movies and series
    async fn search(&self, query: &str) -> AppResult<Vec<CatalogItem>>;

    async fn fetch_genres(&self, kind: MediaKind) -> AppResult<Vec<Genre>>;

    async fn fetch_season_episodes(&self, series_id: u64, season: u32) -> AppResult<Vec<Episode>>;

    /// One page of a curated listing (trending, popular, ...)
    async fn fetch_listing(&self, listing: Listing, page: u32) -> AppResult<Vec<CatalogItem>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
