use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{RecommendationRequest, RecommendationResponse},
    routes::AppState,
};

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        has_user = request.user_id.is_some(),
        history_supplied = request.search_history.is_some(),
        "Processing recommendation request"
    );

    let response = state.recommendations.recommend(request).await?;

    tracing::info!(
        request_id = %request_id,
        count = response.recommended_events.len(),
        "Recommendation request completed"
    );

    Ok(Json(response))
}
