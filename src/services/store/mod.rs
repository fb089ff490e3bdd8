//! Event store abstraction
//!
//! Persistence lives in an external backend. The recommendation service only
//! needs a handful of read paths plus one append, captured by [`EventStore`].
//! Backends: an in-process store, a PostgREST-style backend-as-a-service over
//! HTTP, a direct PostgreSQL connection, and a Redis-cached decorator.

use chrono::NaiveDate;

use crate::{error::AppResult, models::Event};

pub mod cached;
pub mod memory;
pub mod postgres;
pub mod rest;

pub use cached::CachedEventStore;
pub use memory::MemoryEventStore;
pub use postgres::PgEventStore;
pub use rest::RestEventStore;

/// Trait for event storage backends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    /// Events dated on or after `from`, sorted by ascending date
    async fn upcoming_events(&self, from: NaiveDate) -> AppResult<Vec<Event>>;

    /// Every event with only the fields needed to display it
    ///
    /// Last-ditch source used when [`EventStore::upcoming_events`] fails: no
    /// date filter and fewer columns, so it succeeds in more situations.
    async fn all_events_reduced(&self) -> AppResult<Vec<Event>>;

    /// Most recent search queries of a user, newest first
    async fn recent_searches(&self, user_id: &str, limit: usize) -> AppResult<Vec<String>>;

    /// Events the user has registered for, past or upcoming
    async fn registered_events(&self, user_id: &str) -> AppResult<Vec<Event>>;

    /// Appends a query to the user's search history
    async fn record_search(&self, user_id: &str, query: &str) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
