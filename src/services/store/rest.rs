//! Backend-as-a-service event store
//!
//! Talks to a PostgREST-style HTTP interface (`/rest/v1/{table}`), filtering
//! with `column=op.value` query parameters and embedding the joined event row
//! of a registration via `select=event:events(...)`.
//!
//! Tables used:
//! - `events`: id, title, description, location, category, date, image_url
//! - `search_history`: user_id, query, created_at
//! - `registrations`: user_id, event_id

use chrono::NaiveDate;
use reqwest::{Client as HttpClient, Response};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::Event,
    services::store::EventStore,
};

const EVENT_COLUMNS: &str = "id,title,description,location,category,date,image_url";
const REDUCED_EVENT_COLUMNS: &str = "id,title,location,category,date";

#[derive(Clone)]
pub struct RestEventStore {
    http_client: HttpClient,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchRow {
    query: String,
}

#[derive(Debug, Deserialize)]
struct RegistrationRow {
    event: Option<Event>,
}

#[derive(Debug, Serialize)]
struct NewSearchRow<'a> {
    user_id: &'a str,
    query: &'a str,
}

impl RestEventStore {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn get(&self, table: &str) -> reqwest::RequestBuilder {
        self.http_client
            .get(self.endpoint(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Converts a non-success status into an upstream error
    async fn check_status(response: Response, operation: &str) -> AppResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(
            operation = %operation,
            status = %status,
            body = %body,
            "Event store request failed"
        );
        Err(AppError::Upstream(format!(
            "{} returned status {}",
            operation, status
        )))
    }
}

#[async_trait::async_trait]
impl EventStore for RestEventStore {
    async fn upcoming_events(&self, from: NaiveDate) -> AppResult<Vec<Event>> {
        let response = self
            .get("events")
            .query(&[
                ("select", EVENT_COLUMNS.to_string()),
                ("date", format!("gte.{}", from)),
                ("order", "date.asc".to_string()),
            ])
            .send()
            .await?;

        let events: Vec<Event> = Self::check_status(response, "upcoming events")
            .await?
            .json()
            .await?;

        tracing::debug!(count = events.len(), from = %from, "Fetched upcoming events");
        Ok(events)
    }

    async fn all_events_reduced(&self) -> AppResult<Vec<Event>> {
        let response = self
            .get("events")
            .query(&[("select", REDUCED_EVENT_COLUMNS), ("order", "date.asc")])
            .send()
            .await?;

        let events: Vec<Event> = Self::check_status(response, "reduced events")
            .await?
            .json()
            .await?;
        Ok(events)
    }

    async fn recent_searches(&self, user_id: &str, limit: usize) -> AppResult<Vec<String>> {
        let response = self
            .get("search_history")
            .query(&[
                ("select", "query".to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        let rows: Vec<SearchRow> = Self::check_status(response, "search history")
            .await?
            .json()
            .await?;
        Ok(rows.into_iter().map(|row| row.query).collect())
    }

    async fn registered_events(&self, user_id: &str) -> AppResult<Vec<Event>> {
        let response = self
            .get("registrations")
            .query(&[
                ("select", format!("event:events({})", EVENT_COLUMNS)),
                ("user_id", format!("eq.{}", user_id)),
            ])
            .send()
            .await?;

        let rows: Vec<RegistrationRow> = Self::check_status(response, "registrations")
            .await?
            .json()
            .await?;
        Ok(rows.into_iter().filter_map(|row| row.event).collect())
    }

    async fn record_search(&self, user_id: &str, query: &str) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.endpoint("search_history"))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(&NewSearchRow { user_id, query })
            .send()
            .await?;

        Self::check_status(response, "record search").await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let store = RestEventStore::new("https://project.example.co/".to_string(), "key".into());
        assert_eq!(
            store.endpoint("events"),
            "https://project.example.co/rest/v1/events"
        );
    }

    #[test]
    fn test_event_row_deserialization() {
        let json = r#"{
            "id": "0b9c4c1e-8a55-4c1b-9d0a-3f1f0e6f1a2b",
            "title": "Beach Cleanup",
            "description": "Help clean the beach",
            "location": "Santa Monica",
            "category": "Environment",
            "date": "2026-11-02",
            "image_url": null
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.title, "Beach Cleanup");
        assert_eq!(event.category.as_deref(), Some("Environment"));
        assert_eq!(event.image_url, None);
    }

    #[test]
    fn test_reduced_event_row_deserialization() {
        let json = r#"{
            "id": "42",
            "title": "Food Drive",
            "location": "Main St",
            "category": null,
            "date": "2026-12-01"
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.description, "");
        assert_eq!(event.category, None);
    }

    #[test]
    fn test_registration_rows_with_missing_event() {
        let json = r#"[
            { "event": { "id": "1", "title": "Blood Drive", "category": "Health", "date": "2026-01-05" } },
            { "event": null }
        ]"#;

        let rows: Vec<RegistrationRow> = serde_json::from_str(json).unwrap();
        let events: Vec<Event> = rows.into_iter().filter_map(|row| row.event).collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].category.as_deref(), Some("Health"));
    }

    #[test]
    fn test_new_search_row_serialization() {
        let row = NewSearchRow {
            user_id: "user-1",
            query: "beach cleanup",
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["user_id"], "user-1");
        assert_eq!(json["query"], "beach cleanup");
    }
}
