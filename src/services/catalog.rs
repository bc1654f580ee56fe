use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogItem, DiscoverQuery, Episode, Genre, Listing, MediaKind, TrendingScope},
    services::{providers::CatalogProvider, recency::retain_modern},
};

/// Most items a category browse returns
pub const BROWSE_LIMIT: usize = 60;
/// Pages a category browse may walk through
pub const BROWSE_MAX_PAGES: u32 = 6;
/// Default cap on a detail page's "similar" strip
pub const SIMILAR_LIMIT: usize = 18;
/// Last page offered by the genre explorer
pub const GENRE_MAX_PAGE: u32 = 5;

/// One page of the genre explorer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenrePage {
    pub results: Vec<CatalogItem>,
    pub next_page: Option<u32>,
}

/// Detail page payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleDetails {
    pub item: CatalogItem,
    pub trailer_url: Option<String>,
}

/// Read-side catalog operations behind the browse, search and detail pages
pub struct CatalogService<'a> {
    provider: &'a dyn CatalogProvider,
}

impl<'a> CatalogService<'a> {
    pub fn new(provider: &'a dyn CatalogProvider) -> Self {
        Self { provider }
    }

    /// Weekly trending titles, modern only
    pub async fn trending(&self, scope: TrendingScope) -> AppResult<Vec<CatalogItem>> {
        self.modern_listing(Listing::Trending(scope)).await
    }

    pub async fn popular(&self, kind: MediaKind) -> AppResult<Vec<CatalogItem>> {
        self.modern_listing(Listing::Popular(kind)).await
    }

    pub async fn top_rated(&self, kind: MediaKind) -> AppResult<Vec<CatalogItem>> {
        self.modern_listing(Listing::TopRated(kind)).await
    }

    pub async fn upcoming(&self) -> AppResult<Vec<CatalogItem>> {
        self.modern_listing(Listing::Upcoming).await
    }

    pub async fn now_playing(&self) -> AppResult<Vec<CatalogItem>> {
        self.modern_listing(Listing::NowPlaying).await
    }

    async fn modern_listing(&self, listing: Listing) -> AppResult<Vec<CatalogItem>> {
        let items = self.provider.fetch_listing(listing, 1).await?;
        Ok(retain_modern(items))
    }

    /// Walks a category's pages in order until `limit` items are collected.
    ///
    /// Browse pages show the full catalog, so no recency filter applies here.
    pub async fn browse_category(
        &self,
        category: &str,
        limit: usize,
    ) -> AppResult<Vec<CatalogItem>> {
        let listing = Listing::from_category(category);
        let mut results = Vec::new();
        let mut page = 1;

        while results.len() < limit && page <= BROWSE_MAX_PAGES {
            let items = self.provider.fetch_listing(listing, page).await?;
            if items.is_empty() {
                break;
            }
            results.extend(items);
            page += 1;
        }

        results.truncate(limit);
        tracing::debug!(
            category = %category,
            listing = %listing,
            pages = page - 1,
            results = results.len(),
            "Category browsed"
        );
        Ok(results)
    }

    /// Modern titles similar to `(kind, id)`, at most `limit`
    pub async fn similar(
        &self,
        kind: MediaKind,
        id: u64,
        limit: usize,
    ) -> AppResult<Vec<CatalogItem>> {
        let mut items = retain_modern(self.provider.fetch_similar(kind, id).await?);
        items.truncate(limit);
        Ok(items)
    }

    /// One page of modern titles in a genre
    pub async fn genre_page(
        &self,
        genre_id: u32,
        kind: MediaKind,
        page: u32,
    ) -> AppResult<GenrePage> {
        if genre_id == 0 {
            return Err(AppError::InvalidInput("Genre id must be positive".to_string()));
        }
        if page == 0 || page > GENRE_MAX_PAGE {
            return Err(AppError::InvalidInput(format!(
                "Page must be between 1 and {}",
                GENRE_MAX_PAGE
            )));
        }

        let query = DiscoverQuery::by_genres(vec![genre_id]).page(page);
        let results = retain_modern(self.provider.discover(kind, &query).await?);

        Ok(GenrePage {
            results,
            next_page: (page < GENRE_MAX_PAGE).then_some(page + 1),
        })
    }

    /// Movies and series matching `query`; a blank query matches nothing
    pub async fn search(&self, query: &str) -> AppResult<Vec<CatalogItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.provider.search(query).await
    }

    pub async fn genres(&self, kind: MediaKind) -> AppResult<Vec<Genre>> {
        self.provider.fetch_genres(kind).await
    }

    pub async fn season_episodes(&self, series_id: u64, season: u32) -> AppResult<Vec<Episode>> {
        if season == 0 {
            return Err(AppError::InvalidInput(
                "Season number must be positive".to_string(),
            ));
        }
        self.provider.fetch_season_episodes(series_id, season).await
    }

    /// Details and trailer together; a failed trailer lookup only drops the trailer
    pub async fn title_details(&self, kind: MediaKind, id: u64) -> AppResult<TitleDetails> {
        let (item, trailer) = tokio::join!(
            self.provider.fetch_details(kind, id),
            self.provider.fetch_trailer(kind, id),
        );

        let trailer_url = trailer.unwrap_or_else(|e| {
            tracing::warn!(kind = %kind, id = id, error = %e, "Trailer lookup failed");
            None
        });

        Ok(TitleDetails {
            item: item?,
            trailer_url,
        })
    }

    pub async fn trailer(&self, kind: MediaKind, id: u64) -> AppResult<Option<String>> {
        self.provider.fetch_trailer(kind, id).await
    }
}
