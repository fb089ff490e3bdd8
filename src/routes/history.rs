use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{error::AppResult, models::SearchHistoryResponse, routes::AppState};

/// Handler for a user's most recent searches
pub async fn search_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> AppResult<Json<SearchHistoryResponse>> {
    let searches = state.recommendations.search_history(&user_id).await?;
    Ok(Json(SearchHistoryResponse { user_id, searches }))
}
