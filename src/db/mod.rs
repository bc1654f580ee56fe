pub mod redis;

pub use self::redis::{create_connection_manager, Cache, CacheKey, CacheWriterHandle};
