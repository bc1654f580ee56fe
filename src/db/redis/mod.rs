pub mod cache;

mod macros;

pub use cache::create_connection_manager;
pub use cache::Cache;
pub use cache::CacheKey;
pub use cache::CacheWriterHandle;
