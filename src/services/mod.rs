pub mod catalog;
pub mod monitor;
pub mod normalizer;
pub mod providers;
pub mod recency;
pub mod recommendations;
pub mod watched;

pub use catalog::{CatalogService, GenrePage, TitleDetails};
pub use monitor::PerformanceMonitor;
pub use providers::{CachedCatalog, CatalogProvider, TmdbProvider};
pub use recommendations::{RecommendationAggregator, RecommendationSettings};
pub use watched::{InMemoryWatchedStore, RedisWatchedStore, WatchedStore};
