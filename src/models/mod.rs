pub mod catalog;
pub mod recommendation;
pub mod watched;

pub use catalog::{
    resolve_all, CastMember, CatalogItem, CombinedCredits, Credits, DiscoverQuery, DiscoverSort,
    Episode, Genre, GenreList, ItemKey, Listing, MediaKind, PagedResults, RawCatalogItem,
    SeasonDetails, TrendingScope, Video,
};
pub use recommendation::{DisplayItem, RecommendationBuckets};
pub use watched::LastWatched;
