use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clients::{
    Coordinates, GeocodeError, Geocoder, Place, PlacesError, PlacesProvider, PlacesQuery,
};
use crate::config::SearchConfig;
use crate::constants::{categories, search::NO_RESULTS_MESSAGE};
use crate::db::HistoryEntryInput;
use crate::services::history_service::{HistoryError, HistoryService};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Geocoding(#[from] GeocodeError),

    #[error(transparent)]
    Places(#[from] PlacesError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

impl SearchError {
    const fn outcome(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid",
            Self::Geocoding(GeocodeError::NotFound | GeocodeError::Ambiguous) => "unresolved",
            Self::Geocoding(_) => "geocoding_error",
            Self::Places(_) => "places_error",
            Self::History(_) => "history_error",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Metres; `None` picks the configured default
    #[serde(default)]
    pub radius: Option<u32>,
    /// Category ids from the catalog; empty means every category
    #[serde(default)]
    pub categories: Vec<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub coordinates: Coordinates,
    pub radius: u32,
    pub places: Vec<Place>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// History rows written for the signed-in user
    pub saved: u64,
}

/// Validated search parameters, ready for the upstream calls.
#[derive(Debug, Clone, PartialEq)]
struct ValidatedRequest {
    query: String,
    radius: u32,
    categories: String,
}

pub struct LocationSearchService {
    geocoder: Arc<dyn Geocoder>,
    places: Arc<dyn PlacesProvider>,
    history: Arc<dyn HistoryService>,
    config: SearchConfig,
}

impl LocationSearchService {
    #[must_use]
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        places: Arc<dyn PlacesProvider>,
        history: Arc<dyn HistoryService>,
        config: SearchConfig,
    ) -> Self {
        Self {
            geocoder,
            places,
            history,
            config,
        }
    }

    /// Geocodes the query, looks up places around it and, when `user_id` is
    /// set and something was found, appends the places to that user's history.
    pub async fn search(
        &self,
        request: &SearchRequest,
        user_id: Option<i32>,
    ) -> Result<SearchOutcome, SearchError> {
        let result = self.run(request, user_id).await;

        let outcome = match &result {
            Ok(found) if found.places.is_empty() => "empty",
            Ok(_) => "success",
            Err(e) => e.outcome(),
        };
        metrics::counter!("location_searches_total", "outcome" => outcome).increment(1);

        if let Err(e) = &result {
            warn!(query = %request.query.trim(), outcome, error = %e, "Location search failed");
        }

        result
    }

    async fn run(
        &self,
        request: &SearchRequest,
        user_id: Option<i32>,
    ) -> Result<SearchOutcome, SearchError> {
        let validated = self.validate(request)?;

        let coordinates = self.geocoder.geocode(&validated.query).await?;
        debug!(
            query = %validated.query,
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            "Geocoded query"
        );

        let places = self
            .places
            .search_nearby(&PlacesQuery {
                coordinates,
                radius: validated.radius,
                categories: validated.categories.clone(),
            })
            .await?;

        let saved = match user_id {
            Some(user_id) if !places.is_empty() => {
                let entries: Vec<HistoryEntryInput> = places
                    .iter()
                    .map(|p| HistoryEntryInput {
                        place_name: p.name.clone(),
                        address: p.address.clone(),
                    })
                    .collect();
                self.history.record_places(user_id, &entries).await?
            }
            _ => 0,
        };

        info!(
            query = %validated.query,
            radius = validated.radius,
            found = places.len(),
            saved,
            "Location search finished"
        );

        let message = places.is_empty().then(|| NO_RESULTS_MESSAGE.to_string());

        Ok(SearchOutcome {
            query: validated.query,
            coordinates,
            radius: validated.radius,
            places,
            message,
            saved,
        })
    }

    fn validate(&self, request: &SearchRequest) -> Result<ValidatedRequest, SearchError> {
        let query = request.query.trim();
        if query.chars().count() < self.config.min_query_length {
            return Err(SearchError::Validation(format!(
                "query is too short ({}+ characters needed)",
                self.config.min_query_length
            )));
        }

        let radius = request.radius.unwrap_or(self.config.default_radius);
        if !self.config.radius_options.contains(&radius) {
            return Err(SearchError::Validation(format!(
                "radius must be one of {:?} metres",
                self.config.radius_options
            )));
        }

        if let Some(unknown) = request
            .categories
            .iter()
            .find(|id| categories::find(**id).is_none())
        {
            return Err(SearchError::Validation(format!("unknown category: {unknown}")));
        }

        Ok(ValidatedRequest {
            query: query.to_string(),
            radius,
            categories: categories::join_ids(&request.categories),
        })
    }
}
