use axum::{
    Extension, Json,
    extract::{Query, State},
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::validate_keyword;
use super::{ApiError, ApiResponse, AppState, KeywordQuery, PopularQuery};
use crate::db::{HistoryRecord, PopularSearch};

/// GET /history
pub async fn list_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<HistoryRecord>>>, ApiError> {
    let records = state.history_service().get_history(user.user_id).await?;
    Ok(Json(ApiResponse::success(records)))
}

/// GET /history/popular?limit=
pub async fn popular_searches(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<PopularQuery>,
) -> Result<Json<ApiResponse<Vec<PopularSearch>>>, ApiError> {
    let popular = state
        .history_service()
        .top_searches(user.user_id, query.limit)
        .await?;

    Ok(Json(ApiResponse::success(popular)))
}

/// GET /history/search?keyword=
pub async fn search_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<KeywordQuery>,
) -> Result<Json<ApiResponse<Vec<HistoryRecord>>>, ApiError> {
    let keyword = validate_keyword(&query.keyword)?;

    let matches = state
        .history_service()
        .search_by_keyword(user.user_id, keyword)
        .await?;

    Ok(Json(ApiResponse::success(matches)))
}
