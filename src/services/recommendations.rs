//! "More like this" suggestions for a title, gathered from three independent sources.
//!
//! ## Pipeline
//! 1. Subject details and credits are fetched concurrently. Either failing aborts
//!    with `AppError::Aggregation`.
//! 2. The cast bucket, genre bucket and similar bucket are then built concurrently:
//!    - **from cast**: the top billed performers' combined credits, each reduced to
//!      their best rated modern titles, merged in billing order
//!    - **from genre**: a rating-sorted discover over the subject's leading genres
//!    - **others**: the catalog's own "similar" list
//! 3. Every bucket is recency filtered, de-duplicated by identity and capped.
//!
//! Failures inside step 2 only empty (or thin out) the affected bucket.

use futures::future::join_all;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::{
        CastMember, CatalogItem, DiscoverQuery, DiscoverSort, ItemKey, MediaKind,
        RecommendationBuckets,
    },
    services::{providers::CatalogProvider, recency::is_modern_item},
};

/// Tunables for the aggregator
#[derive(Debug, Clone)]
pub struct RecommendationSettings {
    /// Maximum items per bucket
    pub bucket_size: usize,
    /// How many billed performers feed the cast bucket
    pub cast_members: usize,
    /// Best titles kept per performer
    pub credits_per_person: usize,
    /// Leading genres used for discovery
    pub genres: usize,
    /// Vote-count floor for the genre bucket
    pub min_vote_count: u32,
    /// Bound on every catalog call made while aggregating
    pub request_timeout: Duration,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            bucket_size: 6,
            cast_members: 5,
            credits_per_person: 3,
            genres: 2,
            min_vote_count: 100,
            request_timeout: Duration::from_secs(8),
        }
    }
}

pub struct RecommendationAggregator {
    provider: Arc<dyn CatalogProvider>,
    settings: RecommendationSettings,
}

impl RecommendationAggregator {
    pub fn new(provider: Arc<dyn CatalogProvider>, settings: RecommendationSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &RecommendationSettings {
        &self.settings
    }

    /// Builds the three suggestion buckets for the subject `(kind, id)`.
    ///
    /// All three buckets empty is a valid answer. The call only fails when the
    /// subject itself cannot be loaded.
    pub async fn recommend(
        &self,
        kind: MediaKind,
        id: u64,
    ) -> AppResult<RecommendationBuckets> {
        if id == 0 {
            return Err(AppError::InvalidInput(
                "Subject id must be a positive integer".to_string(),
            ));
        }

        let (details, credits) = tokio::try_join!(
            self.bounded("subject_details", self.provider.fetch_details(kind, id)),
            self.bounded("subject_credits", self.provider.fetch_credits(kind, id)),
        )
        .map_err(|e| {
            tracing::error!(kind = %kind, id = id, error = %e, "Subject lookup failed");
            AppError::Aggregation {
                kind,
                id,
                source: Box::new(e),
            }
        })?;

        let genre_ids: Vec<u32> = details
            .all_genre_ids()
            .into_iter()
            .take(self.settings.genres)
            .collect();

        let (from_cast, from_genre, others) = tokio::join!(
            self.from_cast(&credits.cast),
            self.from_genre(kind, genre_ids),
            self.others(kind, id),
        );

        let buckets = RecommendationBuckets {
            from_cast,
            from_genre,
            others,
        };

        tracing::info!(
            kind = %kind,
            id = id,
            from_cast = buckets.from_cast.len(),
            from_genre = buckets.from_genre.len(),
            others = buckets.others.len(),
            "Recommendations aggregated"
        );

        Ok(buckets)
    }

    /// Top rated modern titles of the leading billed cast, merged in billing order
    async fn from_cast(&self, cast: &[CastMember]) -> Vec<CatalogItem> {
        let billed = &cast[..cast.len().min(self.settings.cast_members)];

        let lookups = billed.iter().map(|member| async move {
            let result = self
                .bounded("person_credits", self.provider.fetch_person_credits(member.id))
                .await;
            (member, result)
        });

        let mut merged = Vec::new();
        let mut skipped = 0usize;

        for (member, result) in join_all(lookups).await {
            match result {
                Ok(credits) => {
                    merged.extend(top_rated_modern(credits, self.settings.credits_per_person))
                }
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(
                        person_id = member.id,
                        person = %member.name,
                        error = %e,
                        "Skipping cast member credits"
                    );
                }
            }
        }

        if skipped > 0 {
            tracing::warn!(
                billed = billed.len(),
                skipped = skipped,
                "Partial cast credits"
            );
        }

        dedupe_and_cap(merged, self.settings.bucket_size)
    }

    /// Best rated modern titles sharing the subject's leading genres
    async fn from_genre(&self, kind: MediaKind, genre_ids: Vec<u32>) -> Vec<CatalogItem> {
        if genre_ids.is_empty() {
            return Vec::new();
        }

        let query = DiscoverQuery::by_genres(genre_ids)
            .sorted_by(DiscoverSort::Rating)
            .min_votes(self.settings.min_vote_count);

        match self
            .bounded("genre_discover", self.provider.discover(kind, &query))
            .await
        {
            Ok(items) => dedupe_and_cap(
                items.into_iter().filter(is_modern_item).collect(),
                self.settings.bucket_size,
            ),
            Err(e) => {
                tracing::warn!(kind = %kind, genres = ?query.genre_ids, error = %e, "Genre suggestions unavailable");
                Vec::new()
            }
        }
    }

    /// The catalog's own similar-titles list
    async fn others(&self, kind: MediaKind, id: u64) -> Vec<CatalogItem> {
        match self
            .bounded("similar", self.provider.fetch_similar(kind, id))
            .await
        {
            Ok(items) => dedupe_and_cap(
                items.into_iter().filter(is_modern_item).collect(),
                self.settings.bucket_size,
            ),
            Err(e) => {
                tracing::warn!(kind = %kind, id = id, error = %e, "Similar titles unavailable");
                Vec::new()
            }
        }
    }

    /// Applies the per-call timeout; expiry becomes `AppError::Timeout`
    async fn bounded<T>(
        &self,
        endpoint: &str,
        call: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        let limit = self.settings.request_timeout;
        tokio::time::timeout(limit, call)
            .await
            .map_err(|_| AppError::Timeout {
                endpoint: endpoint.to_string(),
                after_ms: limit.as_millis() as u64,
            })?
    }
}

/// One performer's contribution: modern titles, best rated first, at most `limit`
fn top_rated_modern(credits: Vec<CatalogItem>, limit: usize) -> Vec<CatalogItem> {
    let mut modern: Vec<CatalogItem> = credits.into_iter().filter(is_modern_item).collect();
    modern.sort_by(|a, b| b.rating().total_cmp(&a.rating()));
    modern.truncate(limit);
    modern
}

/// Keeps the first occurrence of each identity, then caps the length
fn dedupe_and_cap(items: Vec<CatalogItem>, cap: usize) -> Vec<CatalogItem> {
    let mut seen: HashSet<ItemKey> = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.key()))
        .take(cap)
        .collect()
}
