use chrono::NaiveDate;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{Event, EventId},
    services::store::EventStore,
};

/// In-process event store
///
/// Backs local development and the HTTP tests. Searches are kept in
/// insertion order per user; reads return them newest first.
#[derive(Default)]
pub struct MemoryEventStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    events: Vec<Event>,
    searches: HashMap<String, Vec<String>>,
    registrations: HashMap<String, Vec<EventId>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with events
    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                events,
                ..MemoryStoreInner::default()
            }),
        }
    }

    /// Adds or replaces an event
    pub async fn upsert_event(&self, event: Event) {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.events.iter_mut().find(|e| e.id == event.id) {
            *existing = event;
        } else {
            inner.events.push(event);
        }
    }

    /// Registers a user for an event
    pub async fn register(&self, user_id: &str, event_id: EventId) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.events.iter().any(|e| e.id == event_id) {
            return Err(AppError::NotFound(format!("Event {}", event_id)));
        }

        let registrations = inner.registrations.entry(user_id.to_string()).or_default();
        if !registrations.contains(&event_id) {
            registrations.push(event_id);
        }
        Ok(())
    }

    fn sorted_by_date(mut events: Vec<Event>) -> Vec<Event> {
        events.sort_by_key(|e| e.date);
        events
    }
}

#[async_trait::async_trait]
impl EventStore for MemoryEventStore {
    async fn upcoming_events(&self, from: NaiveDate) -> AppResult<Vec<Event>> {
        let inner = self.inner.read().await;
        let events = inner
            .events
            .iter()
            .filter(|e| e.date >= from)
            .cloned()
            .collect();
        Ok(Self::sorted_by_date(events))
    }

    async fn all_events_reduced(&self) -> AppResult<Vec<Event>> {
        let inner = self.inner.read().await;
        let events = inner
            .events
            .iter()
            .map(|e| Event {
                description: String::new(),
                image_url: None,
                ..e.clone()
            })
            .collect();
        Ok(Self::sorted_by_date(events))
    }

    async fn recent_searches(&self, user_id: &str, limit: usize) -> AppResult<Vec<String>> {
        let inner = self.inner.read().await;
        Ok(inner
            .searches
            .get(user_id)
            .map(|queries| queries.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn registered_events(&self, user_id: &str) -> AppResult<Vec<Event>> {
        let inner = self.inner.read().await;
        let Some(ids) = inner.registrations.get(user_id) else {
            return Ok(Vec::new());
        };

        Ok(inner
            .events
            .iter()
            .filter(|e| ids.contains(&e.id))
            .cloned()
            .collect())
    }

    async fn record_search(&self, user_id: &str, query: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .searches
            .entry(user_id.to_string())
            .or_default()
            .push(query.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
