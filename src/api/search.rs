use axum::{Json, extract::State};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::session_user_id;
use super::{ApiError, ApiResponse, AppState, CategoryDto, SearchOptionsDto};
use crate::constants::categories::CATALOG;
use crate::services::{AuthError, SearchOutcome, SearchRequest};

/// GET /search/options
/// Category filters and radius choices for building a search form
pub async fn options(State(state): State<Arc<AppState>>) -> Json<ApiResponse<SearchOptionsDto>> {
    let search = &state.config().search;

    Json(ApiResponse::success(SearchOptionsDto {
        categories: CATALOG.iter().map(CategoryDto::from).collect(),
        radius_options: search.radius_options.clone(),
        default_radius: search.default_radius,
    }))
}

/// POST /search
/// Signed-in users get the found places appended to their history
pub async fn search(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(request): Json<SearchRequest>,
) -> Result<Json<ApiResponse<SearchOutcome>>, ApiError> {
    let user_id = match session_user_id(&session).await? {
        Some(user_id) => match state.auth_service().get_user_info(user_id).await {
            Ok(user) => Some(user.user_id),
            // Account deleted elsewhere; search on as a guest.
            Err(AuthError::UserNotFound) => {
                let _ = session.flush().await;
                None
            }
            Err(e) => return Err(e.into()),
        },
        None => None,
    };

    let outcome = state.search_service().search(&request, user_id).await?;

    Ok(Json(ApiResponse::success(outcome)))
}
