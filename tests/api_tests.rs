use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::{Days, NaiveDate, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

use helping_hands_api::{
    error::{AppError, AppResult},
    models::{Event, EventId},
    routes::{create_router, AppState},
    services::store::{EventStore, MemoryEventStore},
};

fn days_from_now(days: u64) -> NaiveDate {
    Utc::now().date_naive() + Days::new(days)
}

fn event(id: &str, title: &str, description: &str, category: Option<&str>, days: u64) -> Event {
    Event {
        id: EventId::from(id),
        title: title.to_string(),
        description: description.to_string(),
        location: "Santa Monica".to_string(),
        category: category.map(str::to_string),
        date: days_from_now(days),
        image_url: None,
    }
}

fn sample_events() -> Vec<Event> {
    vec![
        event("1", "Beach Cleanup", "Help clean the beach", Some("Environment"), 3),
        event("2", "Tutoring Session", "Teach kids math", Some("Education"), 5),
        event("3", "Food Bank Shift", "Sort donations", Some("Community"), 7),
        event("4", "Shelter Dog Walk", "Walk rescue dogs", Some("Animal Welfare"), 9),
        event("5", "Park Picnic", "Bring a friend", None, 11),
    ]
}

fn create_test_app(store: Arc<dyn EventStore>) -> (TestServer, Arc<AppState>) {
    let state = AppState::with_store(store);
    let app = create_router(state.clone());
    (TestServer::new(app).unwrap(), state)
}

fn create_test_server(store: Arc<dyn EventStore>) -> TestServer {
    create_test_app(store).0
}

fn create_seeded_server() -> (TestServer, Arc<MemoryEventStore>) {
    let store = Arc::new(MemoryEventStore::with_events(sample_events()));
    (create_test_server(store.clone()), store)
}

/// Store whose every call fails, as when the backend is down
struct UnavailableStore;

#[async_trait::async_trait]
impl EventStore for UnavailableStore {
    async fn upcoming_events(&self, _from: NaiveDate) -> AppResult<Vec<Event>> {
        Err(AppError::Upstream("connection refused".to_string()))
    }

    async fn all_events_reduced(&self) -> AppResult<Vec<Event>> {
        Err(AppError::Upstream("connection refused".to_string()))
    }

    async fn recent_searches(&self, _user_id: &str, _limit: usize) -> AppResult<Vec<String>> {
        Err(AppError::Upstream("connection refused".to_string()))
    }

    async fn registered_events(&self, _user_id: &str) -> AppResult<Vec<Event>> {
        Err(AppError::Upstream("connection refused".to_string()))
    }

    async fn record_search(&self, _user_id: &str, _query: &str) -> AppResult<()> {
        Err(AppError::Upstream("connection refused".to_string()))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = create_seeded_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_recommendations_rank_direct_match_first() {
    let (server, _) = create_seeded_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "interests": "environment beach" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let events = body["recommendedEvents"].as_array().unwrap();
    assert!(!events.is_empty());
    assert_eq!(events[0]["title"], "Beach Cleanup");
    assert!(events[0]["reason"]
        .as_str()
        .unwrap()
        .contains("Matched: beach, environment"));
}

#[tokio::test]
async fn test_recommendation_shape() {
    let (server, _) = create_seeded_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "interests": "tutoring" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let first = &body["recommendedEvents"][0];
    assert_eq!(first["id"], "2");
    assert_eq!(first["title"], "Tutoring Session");
    assert_eq!(first["date"], days_from_now(5).to_string());
    assert_eq!(first["location"], "Santa Monica");
    assert_eq!(first["description"], "Teach kids math");
    assert_eq!(first["category"], "Education");
    assert!(first.get("imageUrl").is_none() && first.get("image_url").is_none());
}

#[tokio::test]
async fn test_empty_interests_still_returns_events() {
    let (server, _) = create_seeded_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "interests": "" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let events = body["recommendedEvents"].as_array().unwrap();
    assert_eq!(events.len(), 3);
    for event in events {
        assert!(!event["reason"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_missing_body_fields_default_to_empty_query() {
    let (server, _) = create_seeded_server();

    let response = server.post("/api/v1/recommendations").json(&json!({})).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["recommendedEvents"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_never_more_than_three_recommendations() {
    let store = Arc::new(MemoryEventStore::with_events(
        (0..10)
            .map(|i| {
                event(
                    &i.to_string(),
                    &format!("Beach Cleanup {}", i),
                    "Help clean the beach",
                    Some("Environment"),
                    i + 1,
                )
            })
            .collect(),
    ));
    let server = create_test_server(store);

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "interests": "beach" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["recommendedEvents"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_no_events_returns_empty_list() {
    let server = create_test_server(Arc::new(MemoryEventStore::new()));

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "interests": "beach" }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "recommendedEvents": [] }));
}

#[tokio::test]
async fn test_request_id_header_is_generated() {
    let (server, _) = create_seeded_server();
    let response = server.get("/health").await;
    let header = response.header("x-request-id");
    assert!(!header.to_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_request_id_header_is_propagated() {
    let (server, _) = create_seeded_server();
    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("mobile-42"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "mobile-42");
}

#[tokio::test]
async fn test_upcoming_events_sorted_by_date() {
    let (server, store) = create_seeded_server();
    let mut past = event("0", "Past Event", "Already happened", None, 0);
    past.date = Utc::now().date_naive() - Days::new(1);
    store.upsert_event(past).await;

    let response = server.get("/api/v1/events/upcoming").await;

    response.assert_status_ok();
    let events: Vec<Event> = response.json();
    assert_eq!(events.len(), 5);
    assert!(events.iter().all(|e| e.title != "Past Event"));
    assert!(events.windows(2).all(|w| w[0].date <= w[1].date));
}

#[tokio::test]
async fn test_search_is_recorded_and_read_back() {
    let store = Arc::new(MemoryEventStore::with_events(sample_events()));
    let (server, state) = create_test_app(store);

    server
        .post("/api/v1/recommendations")
        .json(&json!({ "interests": "animal shelter", "userId": "user-1" }))
        .await
        .assert_status_ok();

    // The history append runs in the background
    state.recommendations.flush_history_writes().await;

    let response = server.get("/api/v1/users/user-1/search-history").await;
    response.assert_status_ok();
    response.assert_json(&json!({
        "userId": "user-1",
        "searches": ["animal shelter"]
    }));
}

#[tokio::test]
async fn test_history_boosts_related_events() {
    // Only categorized events, so synonym inference cannot lift an open event
    let store = Arc::new(MemoryEventStore::with_events(
        sample_events()
            .into_iter()
            .filter(|e| e.category.is_some())
            .collect(),
    ));
    let server = create_test_server(store.clone());
    store.record_search("user-2", "rescue dogs").await.unwrap();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "interests": "weekend", "userId": "user-2" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let first = &body["recommendedEvents"][0];
    assert_eq!(first["title"], "Shelter Dog Walk");
    // History keywords never appear as matched labels
    let reason = first["reason"].as_str().unwrap();
    assert!(!reason.contains("rescue") && !reason.contains("dogs"));
}

#[tokio::test]
async fn test_unavailable_store_returns_error_payload() {
    let server = create_test_server(Arc::new(UnavailableStore));

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "interests": "beach", "userId": "user-1" }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(
        body["error"],
        "Unable to load events right now. Please try again later."
    );
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let (server, _) = create_seeded_server();
    let response = server.get("/api/v1/unknown").await;
    response.assert_status(StatusCode::NOT_FOUND);
}
