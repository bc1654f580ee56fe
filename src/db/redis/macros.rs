/// Read-through caching for provider calls.
///
/// Returns the cached value for `$key` when there is one. Otherwise awaits
/// `$block`, queues the result for a background write with `$ttl` seconds to
/// live, and returns it. A failing cache read is logged and treated as a miss,
/// so an unreachable Redis only costs latency.
///
/// # Example
/// ```rust,ignore
/// cached!(self.cache, CacheKey::Genres(kind), GENRES_TTL, async move {
///     self.inner.fetch_genres(kind).await
/// })
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => Ok(cached),
            lookup => {
                if let Err(e) = lookup {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, bypassing cache");
                }
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
