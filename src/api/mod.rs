use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod error;
mod history;
mod observability;
mod search;
mod system;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn crate::services::AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn history_service(&self) -> &Arc<dyn crate::services::HistoryService> {
        &self.shared.history_service
    }

    #[must_use]
    pub fn search_service(&self) -> &Arc<crate::services::LocationSearchService> {
        &self.shared.search_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let server = state.config().server.clone();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )));

    let api_router = Router::new()
        .merge(create_protected_router(state.clone()))
        .route("/health", get(system::health))
        .route("/search/options", get(search::options))
        .route("/search", post(search::search))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if server.cors_allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = server
            .cors_allowed_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .route(
            "/metrics",
            get(observability::get_metrics).with_state(state),
        )
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::track_metrics))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/account", delete(auth::delete_account))
        .route("/history", get(history::list_history))
        .route("/history/popular", get(history::popular_searches))
        .route("/history/search", get(history::search_history))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
