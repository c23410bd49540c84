use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{RecommendationRequest, RecommendationResponse},
    routes::AppState,
};

/// Handler for recommendations endpoint
///
/// Unknown titles are not an error: the response is empty and carries an
/// informational message.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let top_n = request.top_n.unwrap_or(state.default_top_n);
    if top_n == 0 {
        return Err(AppError::InvalidInput(
            "top_n must be a positive integer".to_string(),
        ));
    }

    tracing::info!(
        request_id = %request_id,
        title = %request.title,
        top_n,
        "Processing recommendation request"
    );

    let recommendations = state
        .engine
        .recommend(&state.metadata, &request.title, top_n)
        .await;

    tracing::info!(
        request_id = %request_id,
        count = recommendations.len(),
        "Recommendations completed"
    );

    Ok(Json(RecommendationResponse::new(request.title, recommendations)))
}
