use chrono::NaiveDate;
use std::sync::Arc;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::AppResult,
    models::Event,
    services::store::EventStore,
};

/// Caches the upcoming-events listing of another store in Redis
///
/// Only the candidate-event fetch is cached; it is the same for every user on
/// a given day. Per-user reads and the history append go straight through.
#[derive(Clone)]
pub struct CachedEventStore {
    inner: Arc<dyn EventStore>,
    cache: Cache,
    ttl: u64,
}

impl CachedEventStore {
    pub fn new(inner: Arc<dyn EventStore>, cache: Cache, ttl: u64) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait::async_trait]
impl EventStore for CachedEventStore {
    async fn upcoming_events(&self, from: NaiveDate) -> AppResult<Vec<Event>> {
        cached!(
            self.cache,
            CacheKey::UpcomingEvents(from),
            self.ttl,
            async move { self.inner.upcoming_events(from).await }
        )
    }

    async fn all_events_reduced(&self) -> AppResult<Vec<Event>> {
        self.inner.all_events_reduced().await
    }

    async fn recent_searches(&self, user_id: &str, limit: usize) -> AppResult<Vec<String>> {
        self.inner.recent_searches(user_id, limit).await
    }

    async fn registered_events(&self, user_id: &str) -> AppResult<Vec<Event>> {
        self.inner.registered_events(user_id).await
    }

    async fn record_search(&self, user_id: &str, query: &str) -> AppResult<()> {
        self.inner.record_search(user_id, query).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
