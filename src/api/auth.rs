use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tower_sessions::Session;

use super::validation::validate_credentials;
use super::{ApiError, ApiResponse, AppState, CredentialsRequest, MessageResponse};
use crate::services::UserInfo;

const USER_ID_KEY: &str = "user_id";
const USERNAME_KEY: &str = "username";

/// The signed-in user, placed in request extensions by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: i32,
    pub username: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Rejects requests without a session. The session must still point at an
/// existing user; a session for a deleted account is flushed.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let Some(user_id) = session_user_id(&session).await? else {
        return Err(ApiError::Unauthorized("Not authenticated".to_string()));
    };

    let user = match state.auth_service().get_user_info(user_id).await {
        Ok(user) => user,
        Err(crate::services::AuthError::UserNotFound) => {
            let _ = session.flush().await;
            return Err(ApiError::Unauthorized("Not authenticated".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::Span::current().record("user_id", user.user_id);
    request.extensions_mut().insert(CurrentUser {
        user_id: user.user_id,
        username: user.username,
    });

    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create an account and sign it in
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let (username, password) = validate_credentials(&payload.username, &payload.password)?;

    let user = state.auth_service().register(username, password).await?;
    start_session(&session, &user).await?;

    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let (username, password) = validate_credentials(&payload.username, &payload.password)?;

    let user = state.auth_service().login(username, password).await?;
    start_session(&session, &user).await?;

    tracing::info!(user_id = user.user_id, "User logged in");

    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/logout
/// Invalidate the current session
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    Json(ApiResponse::success(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

/// GET /auth/me
pub async fn get_current_user(
    axum::Extension(user): axum::Extension<CurrentUser>,
) -> Json<ApiResponse<UserInfo>> {
    Json(ApiResponse::success(UserInfo {
        user_id: user.user_id,
        username: user.username,
    }))
}

/// DELETE /auth/account
/// Delete the account and all of its search history, then end the session
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    session: Session,
    axum::Extension(user): axum::Extension<CurrentUser>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.history_service().delete_account(user.user_id).await?;
    let _ = session.flush().await;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Account '{}' deleted", user.username),
    })))
}

// ============================================================================
// Helpers
// ============================================================================

/// Signed-in user id, if any. Used by routes where signing in is optional.
pub async fn session_user_id(session: &Session) -> Result<Option<i32>, ApiError> {
    session
        .get::<i32>(USER_ID_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))
}

async fn start_session(session: &Session, user: &UserInfo) -> Result<(), ApiError> {
    // New id on sign-in so a pre-login cookie cannot be reused.
    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
    session
        .insert(USER_ID_KEY, user.user_id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
    session
        .insert(USERNAME_KEY, &user.username)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
    Ok(())
}
