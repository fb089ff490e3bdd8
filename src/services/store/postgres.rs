use chrono::NaiveDate;
use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{Event, EventId},
    services::store::EventStore,
};

/// Event store reading the backend's PostgreSQL database directly
#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: String,
    title: String,
    description: String,
    location: String,
    category: Option<String>,
    date: NaiveDate,
    image_url: Option<String>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: EventId(row.id),
            title: row.title,
            description: row.description,
            location: row.location,
            category: row.category,
            date: row.date,
            image_url: row.image_url,
        }
    }
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EventStore for PgEventStore {
    async fn upcoming_events(&self, from: NaiveDate) -> AppResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id::text AS id, title,
                   COALESCE(description, '') AS description,
                   COALESCE(location, '') AS location,
                   category, date, image_url
            FROM events
            WHERE date >= $1
            ORDER BY date ASC
            "#,
        )
        .bind(from)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn all_events_reduced(&self) -> AppResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id::text AS id, title,
                   '' AS description,
                   COALESCE(location, '') AS location,
                   category, date, NULL::text AS image_url
            FROM events
            ORDER BY date ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn recent_searches(&self, user_id: &str, limit: usize) -> AppResult<Vec<String>> {
        let queries = sqlx::query_scalar::<_, String>(
            r#"
            SELECT query
            FROM search_history
            WHERE user_id::text = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(queries)
    }

    async fn registered_events(&self, user_id: &str) -> AppResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT e.id::text AS id, e.title,
                   COALESCE(e.description, '') AS description,
                   COALESCE(e.location, '') AS location,
                   e.category, e.date, e.image_url
            FROM registrations r
            JOIN events e ON e.id = r.event_id
            WHERE r.user_id::text = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn record_search(&self, user_id: &str, query: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO search_history (user_id, query)
            VALUES ($1::uuid, $2)
            "#,
        )
        .bind(user_id)
        .bind(query)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
