use chrono::{NaiveDate, Utc};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::task::TaskTracker;

use crate::{
    error::{AppError, AppResult},
    models::{Event, RecommendationRequest, RecommendationResponse},
    services::{
        engine::{RecommendationEngine, Recommendations},
        scoring::QueryContext,
        store::EventStore,
    },
};

/// Where the candidate events came from
enum Candidates {
    /// Regular fetch of today-or-later events
    Upcoming(Vec<Event>),
    /// Reduced fetch after the regular one failed
    Reduced(Vec<Event>),
}

/// Generates personalized event recommendations
///
/// Gathers candidate events, search history and past registrations from the
/// store, runs the engine, then records the query. Store failures degrade the
/// result rather than failing it, except when no events can be loaded at all.
pub struct RecommendationService {
    store: Arc<dyn EventStore>,
    engine: RecommendationEngine,
    history_limit: usize,
    rng_seed: Option<u64>,
    history_writes: TaskTracker,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn EventStore>, engine: RecommendationEngine, history_limit: usize) -> Self {
        Self {
            store,
            engine,
            history_limit,
            rng_seed: None,
            history_writes: TaskTracker::new(),
        }
    }

    /// Makes the random fallback tiers reproducible
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Waits until every history write spawned so far has finished
    pub async fn flush_history_writes(&self) {
        self.history_writes.close();
        self.history_writes.wait().await;
        self.history_writes.reopen();
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    pub async fn recommend(&self, request: RecommendationRequest) -> AppResult<RecommendationResponse> {
        self.recommend_on(request, Utc::now().date_naive()).await
    }

    /// Same as [`Self::recommend`] with an explicit "today"
    pub async fn recommend_on(
        &self,
        request: RecommendationRequest,
        today: NaiveDate,
    ) -> AppResult<RecommendationResponse> {
        let start = Instant::now();
        let user_id = request.user_id.as_deref();

        let (candidates, history, past_registrations) = tokio::join!(
            self.load_candidates(today),
            self.load_history(user_id, request.search_history.clone()),
            self.load_past_registrations(user_id),
        );
        let candidates = candidates?;

        let context = QueryContext::new(request.interests.clone())
            .with_search_history(history)
            .with_past_registrations(past_registrations);

        let result = {
            let mut rng = match self.rng_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            match &candidates {
                Candidates::Upcoming(events) => self.engine.recommend(events, &context, &mut rng),
                Candidates::Reduced(events) => self.engine.popular(events, &mut rng),
            }
        };

        self.log_result(&result, &candidates, start);

        if let Some(user_id) = user_id {
            self.record_search_in_background(user_id, &request.interests);
        }

        Ok(RecommendationResponse {
            recommended_events: result.items,
        })
    }

    /// Candidate events for the recommendation endpoint's clients
    pub async fn upcoming_events(&self) -> AppResult<Vec<Event>> {
        self.store.upcoming_events(Utc::now().date_naive()).await
    }

    /// Most recent searches of a user, newest first
    pub async fn search_history(&self, user_id: &str) -> AppResult<Vec<String>> {
        if user_id.trim().is_empty() {
            return Err(AppError::InvalidInput("User id cannot be empty".to_string()));
        }
        self.store.recent_searches(user_id, self.history_limit).await
    }

    /// Fetches eligible events, falling back to a reduced fetch
    async fn load_candidates(&self, today: NaiveDate) -> AppResult<Candidates> {
        let error = match self.store.upcoming_events(today).await {
            Ok(events) => return Ok(Candidates::Upcoming(events)),
            Err(e) => e,
        };

        tracing::warn!(
            store = self.store.name(),
            error = %error,
            "Upcoming events fetch failed, trying reduced fetch"
        );

        match self.store.all_events_reduced().await {
            Ok(events) => {
                let upcoming: Vec<Event> =
                    events.iter().filter(|e| e.date >= today).cloned().collect();
                // Past events beat an empty panel
                let events = if upcoming.is_empty() { events } else { upcoming };
                Ok(Candidates::Reduced(events))
            }
            Err(e) => {
                tracing::error!(
                    store = self.store.name(),
                    error = %e,
                    "Reduced events fetch failed"
                );
                Err(AppError::Upstream(
                    "Unable to load events right now. Please try again later.".to_string(),
                ))
            }
        }
    }

    async fn load_history(&self, user_id: Option<&str>, supplied: Option<Vec<String>>) -> Vec<String> {
        if let Some(history) = supplied {
            return history.into_iter().take(self.history_limit).collect();
        }

        let Some(user_id) = user_id else {
            return Vec::new();
        };

        match self.store.recent_searches(user_id, self.history_limit).await {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Search history fetch failed");
                Vec::new()
            }
        }
    }

    async fn load_past_registrations(&self, user_id: Option<&str>) -> Vec<Event> {
        let Some(user_id) = user_id else {
            return Vec::new();
        };

        match self.store.registered_events(user_id).await {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Registration fetch failed");
                Vec::new()
            }
        }
    }

    /// Appends the query to the user's history without holding up the response
    fn record_search_in_background(&self, user_id: &str, interests: &str) {
        let store = self.store.clone();
        let user_id = user_id.to_string();
        let query = interests.to_string();

        self.history_writes.spawn(async move {
            if let Err(e) = store.record_search(&user_id, &query).await {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to record search history");
            }
        });
    }

    fn log_result(&self, result: &Recommendations, candidates: &Candidates, start: Instant) {
        let (source, candidate_count) = match candidates {
            Candidates::Upcoming(events) => ("upcoming", events.len()),
            Candidates::Reduced(events) => ("reduced", events.len()),
        };

        tracing::info!(
            tier = %result.tier,
            source,
            candidate_count,
            recommended = result.items.len(),
            processing_time_ms = start.elapsed().as_millis(),
            "Recommendations generated"
        );
    }
}
