/// Serves a value from the Redis cache, computing and storing it on a miss.
///
/// A failed cache read is logged and treated as a miss, so an unavailable
/// Redis degrades to calling the block every time instead of failing.
///
/// # Arguments
/// * `$cache`: a [`Cache`](crate::db::Cache) (anything with `get_from_cache` and
///   `set_in_background`).
/// * `$key`: the [`CacheKey`](crate::db::CacheKey) to read and write.
/// * `$ttl`: time-to-live of a stored value in seconds.
/// * `$block`: a future producing `AppResult<T>` on a miss.
///
/// # Example
/// ```rust,ignore
/// let events = cached!(self.cache, CacheKey::UpcomingEvents(from), self.ttl, async move {
///     self.inner.upcoming_events(from).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        match $cache.get_from_cache(&$key).await {
            Ok(Some(cached)) => Ok(cached),
            lookup => {
                if let Err(e) = lookup {
                    tracing::warn!(error = %e, key = %$key, "Cache read failed, computing value");
                }
                let value = $block.await?;
                $cache.set_in_background(&$key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
