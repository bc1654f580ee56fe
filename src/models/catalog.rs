use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Discriminator between movie and series records.
///
/// TMDB reuses numeric ids across the two, so a kind always travels with an id.
/// Deserializes from `movie`, `series` or the API's own `tv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    #[serde(alias = "tv")]
    Series,
}

impl MediaKind {
    /// Path segment used by the catalog API (`movie` / `tv`)
    pub fn api_segment(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "tv",
        }
    }

    /// Maps the API's `media_type` marker. Anything else (e.g. `person`) is `None`.
    pub fn from_api_marker(marker: &str) -> Option<Self> {
        match marker {
            "movie" => Some(MediaKind::Movie),
            "tv" => Some(MediaKind::Series),
            _ => None,
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Series => write!(f, "series"),
        }
    }
}

/// Identity of a catalog entry
pub type ItemKey = (u64, MediaKind);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

// ============================================================================
// Catalog API wire types
// ============================================================================

/// Item as the catalog API returns it, in either movie or series shape.
///
/// Only ever read at the provider boundary; see [`RawCatalogItem::resolve`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCatalogItem {
    pub id: u64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub media_type: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u32>,
    pub popularity: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub runtime: Option<u32>,
    pub number_of_seasons: Option<u32>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl RawCatalogItem {
    /// `true` when the API tagged this entry as something other than a movie or series
    pub fn is_foreign(&self) -> bool {
        self.media_type
            .as_deref()
            .is_some_and(|m| MediaKind::from_api_marker(m).is_none())
    }

    /// Resolves the media kind: a `tv` marker or an air date means series,
    /// a `movie` marker or a release date means movie, otherwise `fallback`.
    pub fn resolve_kind(&self, fallback: MediaKind) -> MediaKind {
        let marker = self.media_type.as_deref().and_then(MediaKind::from_api_marker);

        if marker == Some(MediaKind::Series) || present(&self.first_air_date) {
            MediaKind::Series
        } else if marker == Some(MediaKind::Movie) || present(&self.release_date) {
            MediaKind::Movie
        } else {
            fallback
        }
    }

    /// Converts the wire shape into a [`CatalogItem`] with its kind fixed
    pub fn resolve(self, fallback: MediaKind) -> CatalogItem {
        let kind = self.resolve_kind(fallback);
        let title = non_empty(self.title).or(non_empty(self.name));
        let date = match kind {
            MediaKind::Movie => non_empty(self.release_date).or(non_empty(self.first_air_date)),
            MediaKind::Series => non_empty(self.first_air_date).or(non_empty(self.release_date)),
        };

        CatalogItem {
            id: self.id,
            kind,
            title,
            date,
            overview: non_empty(self.overview),
            poster_path: non_empty(self.poster_path),
            backdrop_path: non_empty(self.backdrop_path),
            vote_average: self.vote_average,
            vote_count: self.vote_count,
            popularity: self.popularity,
            genre_ids: self.genre_ids,
            genres: self.genres,
            runtime: self.runtime,
            number_of_seasons: self.number_of_seasons,
        }
    }
}

/// Resolves a page of raw results, dropping entries of foreign media types
pub fn resolve_all(raw: Vec<RawCatalogItem>, fallback: MediaKind) -> Vec<CatalogItem> {
    raw.into_iter()
        .filter(|item| !item.is_foreign())
        .map(|item| item.resolve(fallback))
        .collect()
}

/// Paged list envelope (`{"results": [...]}`)
#[derive(Debug, Deserialize)]
pub struct PagedResults<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct GenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

/// Cast side of `/person/{id}/combined_credits`
#[derive(Debug, Deserialize)]
pub struct CombinedCredits {
    #[serde(default)]
    pub cast: Vec<RawCatalogItem>,
}

#[derive(Debug, Deserialize)]
pub struct SeasonDetails {
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

// ============================================================================
// Resolved catalog types
// ============================================================================

/// A movie or series with its kind resolved once at the API boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: u64,
    pub kind: MediaKind,
    /// `title` when present, else `name`
    pub title: Option<String>,
    /// Release date for movies, first air date for series (`YYYY-MM-DD`)
    pub date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u32>,
    pub popularity: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub runtime: Option<u32>,
    pub number_of_seasons: Option<u32>,
}

impl CatalogItem {
    pub fn key(&self) -> ItemKey {
        (self.id, self.kind)
    }

    /// Rating used for ranking; unrated items sort last
    pub fn rating(&self) -> f64 {
        self.vote_average.unwrap_or(0.0)
    }

    /// Genre ids from either the detail payload (`genres`) or a list payload (`genre_ids`)
    pub fn all_genre_ids(&self) -> Vec<u32> {
        if self.genres.is_empty() {
            self.genre_ids.clone()
        } else {
            self.genres.iter().map(|g| g.id).collect()
        }
    }
}

/// Billed performer; the join key into their combined credits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
}

/// `/{kind}/{id}/credits`. The cast list is already in billing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub key: String,
    #[serde(default)]
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: u64,
    pub name: String,
    pub episode_number: u32,
    #[serde(default)]
    pub still_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
}

// ============================================================================
// Query types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendingScope {
    All,
    Movie,
    #[serde(alias = "series")]
    Tv,
}

impl TrendingScope {
    fn segment(&self) -> &'static str {
        match self {
            TrendingScope::All => "all",
            TrendingScope::Movie => "movie",
            TrendingScope::Tv => "tv",
        }
    }
}

/// Curated lists the catalog API exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Trending(TrendingScope),
    Popular(MediaKind),
    TopRated(MediaKind),
    Upcoming,
    NowPlaying,
    /// Popularity-sorted discover over all titles of a kind
    Discover(MediaKind),
}

impl Listing {
    /// Maps a browse category name to a listing; unknown names fall back to movie discover
    pub fn from_category(category: &str) -> Self {
        match category {
            "top_rated" => Listing::TopRated(MediaKind::Movie),
            "latest" => Listing::NowPlaying,
            "popular" => Listing::Popular(MediaKind::Movie),
            "upcoming" => Listing::Upcoming,
            "tv" => Listing::Popular(MediaKind::Series),
            _ => Listing::Discover(MediaKind::Movie),
        }
    }

    /// API path plus any fixed query parameters
    pub fn path(&self) -> (String, Vec<(&'static str, String)>) {
        match self {
            Listing::Trending(scope) => (format!("/trending/{}/week", scope.segment()), vec![]),
            Listing::Popular(kind) => (format!("/{}/popular", kind.api_segment()), vec![]),
            Listing::TopRated(kind) => (format!("/{}/top_rated", kind.api_segment()), vec![]),
            Listing::Upcoming => ("/movie/upcoming".to_string(), vec![]),
            Listing::NowPlaying => ("/movie/now_playing".to_string(), vec![]),
            Listing::Discover(kind) => (
                format!("/discover/{}", kind.api_segment()),
                vec![("sort_by", "popularity.desc".to_string())],
            ),
        }
    }

    /// Kind assumed for entries that carry no marker of their own
    pub fn fallback_kind(&self) -> MediaKind {
        match self {
            Listing::Trending(TrendingScope::Tv) => MediaKind::Series,
            Listing::Trending(_) | Listing::Upcoming | Listing::NowPlaying => MediaKind::Movie,
            Listing::Popular(kind) | Listing::TopRated(kind) | Listing::Discover(kind) => *kind,
        }
    }
}

impl Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Listing::Trending(scope) => write!(f, "trending:{}", scope.segment()),
            Listing::Popular(kind) => write!(f, "popular:{}", kind.api_segment()),
            Listing::TopRated(kind) => write!(f, "top_rated:{}", kind.api_segment()),
            Listing::Upcoming => write!(f, "upcoming"),
            Listing::NowPlaying => write!(f, "now_playing"),
            Listing::Discover(kind) => write!(f, "discover:{}", kind.api_segment()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscoverSort {
    Popularity,
    Rating,
}

impl DiscoverSort {
    pub fn as_param(&self) -> &'static str {
        match self {
            DiscoverSort::Popularity => "popularity.desc",
            DiscoverSort::Rating => "vote_average.desc",
        }
    }
}

/// Genre-filtered discover request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverQuery {
    /// Required genres (all of them must match)
    pub genre_ids: Vec<u32>,
    pub sort: DiscoverSort,
    pub min_vote_count: Option<u32>,
    pub page: u32,
}

impl DiscoverQuery {
    pub fn by_genres(genre_ids: Vec<u32>) -> Self {
        Self {
            genre_ids,
            sort: DiscoverSort::Popularity,
            min_vote_count: None,
            page: 1,
        }
    }

    pub fn sorted_by(mut self, sort: DiscoverSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn min_votes(mut self, count: u32) -> Self {
        self.min_vote_count = Some(count);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Query parameters in the catalog API's vocabulary
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let genres = self
            .genre_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let mut params = vec![
            ("with_genres", genres),
            ("sort_by", self.sort.as_param().to_string()),
            ("page", self.page.to_string()),
        ];
        if let Some(count) = self.min_vote_count {
            params.push(("vote_count.gte", count.to_string()));
        }
        params
    }
}
