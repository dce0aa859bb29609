use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{Place, PlacesError, PlacesProvider, PlacesQuery};

#[derive(Debug, Deserialize)]
struct FoursquareResponse {
    #[serde(default)]
    results: Vec<FoursquarePlace>,
}

#[derive(Debug, Deserialize)]
struct FoursquareErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct FoursquarePlace {
    name: String,
    #[serde(default)]
    location: FoursquareLocation,
    geocodes: Option<FoursquareGeocodes>,
    distance: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct FoursquareLocation {
    formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FoursquareGeocodes {
    main: Option<FoursquarePoint>,
}

#[derive(Debug, Deserialize)]
struct FoursquarePoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Clone)]
pub struct FoursquareClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FoursquareClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_shared_client(Client::new(), base_url, api_key)
    }

    #[must_use]
    pub fn with_shared_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn request_url(&self, query: &PlacesQuery) -> Result<url::Url, PlacesError> {
        let ll = format!(
            "{},{}",
            query.coordinates.latitude, query.coordinates.longitude
        );
        let radius = query.radius.to_string();

        let mut params = vec![
            ("ll", ll.as_str()),
            ("sort", "DISTANCE"),
            ("radius", radius.as_str()),
        ];
        if !query.categories.is_empty() {
            params.push(("categories", query.categories.as_str()));
        }

        url::Url::parse_with_params(&self.base_url, &params)
            .map_err(|e| PlacesError::Decode(format!("invalid places URL: {e}")))
    }
}

#[async_trait::async_trait]
impl PlacesProvider for FoursquareClient {
    async fn search_nearby(&self, query: &PlacesQuery) -> Result<Vec<Place>, PlacesError> {
        let url = self.request_url(query)?;

        let response = self
            .client
            .get(url)
            .header("accept", "application/json")
            .header("Authorization", &self.api_key)
            .send()
            .await
            .map_err(|e| PlacesError::Connection(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlacesError::Connection(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<FoursquareErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or_default();
            return Err(PlacesError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: FoursquareResponse =
            serde_json::from_str(&body).map_err(|e| PlacesError::Decode(e.to_string()))?;

        let places = with_addresses(parsed);
        debug!(count = places.len(), radius = query.radius, "Places response");

        Ok(places)
    }
}

/// Drops results without a formatted address; they are useless to the user.
fn with_addresses(response: FoursquareResponse) -> Vec<Place> {
    response
        .results
        .into_iter()
        .filter_map(|p| {
            let address = p.location.formatted_address?;
            let point = p.geocodes.and_then(|g| g.main);
            Some(Place {
                name: p.name,
                address,
                latitude: point.as_ref().map(|pt| pt.latitude),
                longitude: point.as_ref().map(|pt| pt.longitude),
                distance: p.distance,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::Coordinates;
    use serde_json::json;

    #[test]
    fn test_results_without_address_are_dropped() {
        let response: FoursquareResponse = serde_json::from_value(json!({
            "results": [
                {
                    "name": "Test Place",
                    "location": {"formatted_address": "123 Main St"},
                    "geocodes": {"main": {"latitude": 40.71, "longitude": -74.0}},
                    "distance": 120
                },
                {"name": "Nowhere", "location": {}},
                {"name": "No Location"}
            ]
        }))
        .unwrap();

        let places = with_addresses(response);
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Test Place");
        assert_eq!(places[0].address, "123 Main St");
        assert_eq!(places[0].latitude, Some(40.71));
        assert_eq!(places[0].distance, Some(120));
    }

    #[test]
    fn test_missing_results_key_is_empty() {
        let response: FoursquareResponse = serde_json::from_value(json!({})).unwrap();
        assert!(with_addresses(response).is_empty());
    }

    #[test]
    fn test_request_url_omits_empty_categories() {
        let client = FoursquareClient::new("https://places.example/search", "key");
        let mut query = PlacesQuery {
            coordinates: Coordinates {
                latitude: 51.5,
                longitude: -0.1,
            },
            radius: 1000,
            categories: String::new(),
        };

        let url = client.request_url(&query).unwrap();
        assert_eq!(
            url.as_str(),
            "https://places.example/search?ll=51.5%2C-0.1&sort=DISTANCE&radius=1000"
        );

        query.categories = "13000,19009".to_string();
        let url = client.request_url(&query).unwrap();
        assert!(url.as_str().ends_with("&categories=13000%2C19009"));
    }
}
