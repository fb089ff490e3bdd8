use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{error::AppResult, models::Event, routes::AppState};

/// Handler listing today-or-later events, soonest first
pub async fn upcoming(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Event>>> {
    let events = state.recommendations.upcoming_events().await?;
    Ok(Json(events))
}
