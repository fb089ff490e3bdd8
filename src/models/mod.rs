use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod category_synonyms;

pub use category_synonyms::CategorySynonyms;

/// Opaque identifier of an event as assigned by the backing store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A volunteer event posted by an organization
///
/// Only the fields the recommendation engine reads are modelled here; the
/// store may hold more (organizer, capacity, coordinates) that are never
/// needed to rank events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default)]
    pub category: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Event {
    /// Category label if present and not blank
    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Backends send `null` for empty text columns
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A recommended event returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub id: EventId,
    pub title: String,
    pub date: NaiveDate,
    pub location: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Human readable explanation, never empty
    pub reason: String,
}

impl Recommendation {
    pub fn from_event(event: &Event, reason: String) -> Self {
        Self {
            id: event.id.clone(),
            title: event.title.clone(),
            date: event.date,
            location: event.location.clone(),
            description: event.description.clone(),
            image_url: event.image_url.clone(),
            category: event.category.clone(),
            reason,
        }
    }
}

/// Request body for the recommendations endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    /// Free-text interests; blank input routes to the fallback tiers
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Prior queries, most recent first. Fetched from the store when omitted.
    #[serde(default)]
    pub search_history: Option<Vec<String>>,
}

/// Response body for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub recommended_events: Vec<Recommendation>,
}

/// Recent searches of one user, newest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryResponse {
    pub user_id: String,
    pub searches: Vec<String>,
}
