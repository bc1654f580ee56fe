use std::sync::Arc;

use crate::services::{
    CatalogProvider, CatalogService, PerformanceMonitor, RecommendationAggregator, WatchedStore,
};

/// Shared application state
///
/// Everything is behind an `Arc`, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogProvider>,
    pub aggregator: Arc<RecommendationAggregator>,
    pub watched: Arc<dyn WatchedStore>,
    pub monitor: Arc<PerformanceMonitor>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        aggregator: Arc<RecommendationAggregator>,
        watched: Arc<dyn WatchedStore>,
        monitor: Arc<PerformanceMonitor>,
    ) -> Self {
        Self {
            catalog,
            aggregator,
            watched,
            monitor,
        }
    }

    pub fn catalog_service(&self) -> CatalogService<'_> {
        CatalogService::new(self.catalog.as_ref())
    }
}
