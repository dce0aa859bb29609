use std::sync::Arc;

use crate::clients::foursquare::FoursquareClient;
use crate::clients::opencage::OpenCageClient;
use crate::clients::{Geocoder, PlacesProvider};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, HistoryService, LocationSearchService, SeaOrmAuthService, SeaOrmHistoryService,
};

/// One HTTP client for both upstream lookups so they share a connection pool.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(concat!("DestinationFinder/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub history_service: Arc<dyn HistoryService>,

    pub search_service: Arc<LocationSearchService>,
}

impl SharedState {
    /// Connects to the database and wires the production HTTP clients.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.geocoding.request_timeout_seconds)?;

        let geocoder = Arc::new(OpenCageClient::with_shared_client(
            http_client.clone(),
            config.geocoding.base_url.clone(),
            config.geocoding.api_key.clone(),
        ));
        let places = Arc::new(FoursquareClient::with_shared_client(
            http_client,
            config.places.base_url.clone(),
            config.places.api_key.clone(),
        ));

        Self::with_collaborators(config, geocoder, places).await
    }

    /// Same wiring as [`SharedState::new`] with caller-supplied lookups.
    pub async fn with_collaborators(
        config: Config,
        geocoder: Arc<dyn Geocoder>,
        places: Arc<dyn PlacesProvider>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let history_service = Arc::new(SeaOrmHistoryService::new(
            store.clone(),
            config.search.clone(),
        )) as Arc<dyn HistoryService>;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let search_service = Arc::new(LocationSearchService::new(
            geocoder,
            places,
            history_service.clone(),
            config.search.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service,
            history_service,
            search_service,
        })
    }
}
