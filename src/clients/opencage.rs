use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{Coordinates, GeocodeError, Geocoder};

#[derive(Debug, Deserialize)]
struct OpenCageResponse {
    status: OpenCageStatus,
    #[serde(default)]
    total_results: u64,
    #[serde(default)]
    results: Vec<OpenCageResult>,
}

#[derive(Debug, Deserialize)]
struct OpenCageStatus {
    code: u16,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct OpenCageResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    lat: f64,
    lng: f64,
}

#[derive(Clone)]
pub struct OpenCageClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenCageClient {
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

    fn request_url(&self, query: &str) -> Result<url::Url, GeocodeError> {
        url::Url::parse_with_params(&self.base_url, &[("q", query), ("key", self.api_key.as_str())])
            .map_err(|e| GeocodeError::Decode(format!("invalid geocoding URL: {e}")))
    }
}

#[async_trait::async_trait]
impl Geocoder for OpenCageClient {
    async fn geocode(&self, query: &str) -> Result<Coordinates, GeocodeError> {
        let url = self.request_url(query)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GeocodeError::Connection(e.to_string()))?;

        let http_status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GeocodeError::Connection(e.to_string()))?;

        // OpenCage reports failures in the JSON status block, but a proxy in
        // between may answer with something that is not JSON at all.
        let parsed: OpenCageResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) if http_status.is_success() => return Err(GeocodeError::Decode(e.to_string())),
            Err(_) => {
                return Err(GeocodeError::Upstream {
                    status: http_status.as_u16(),
                    message: body.chars().take(200).collect(),
                });
            }
        };

        debug!(
            query,
            status = parsed.status.code,
            total_results = parsed.total_results,
            "Geocoding response"
        );

        interpret(parsed)
    }
}

fn interpret(response: OpenCageResponse) -> Result<Coordinates, GeocodeError> {
    if response.status.code != 200 {
        return Err(GeocodeError::Upstream {
            status: response.status.code,
            message: response.status.message,
        });
    }

    match response.total_results {
        0 => Err(GeocodeError::NotFound),
        1 => response
            .results
            .into_iter()
            .next()
            .map(|r| Coordinates {
                latitude: r.geometry.lat,
                longitude: r.geometry.lng,
            })
            .ok_or_else(|| GeocodeError::Decode("total_results was 1 but results is empty".into())),
        _ => Err(GeocodeError::Ambiguous),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> OpenCageResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_single_result_yields_coordinates() {
        let response = parse(json!({
            "status": {"code": 200, "message": "OK"},
            "total_results": 1,
            "results": [{"geometry": {"lat": 37.7749, "lng": -122.4194}}]
        }));

        let coords = interpret(response).unwrap();
        assert_eq!(coords.latitude, 37.7749);
        assert_eq!(coords.longitude, -122.4194);
    }

    #[test]
    fn test_zero_results_is_not_found() {
        let response = parse(json!({"status": {"code": 200}, "total_results": 0}));
        assert!(matches!(interpret(response), Err(GeocodeError::NotFound)));
    }

    #[test]
    fn test_many_results_is_ambiguous() {
        let response = parse(json!({
            "status": {"code": 200},
            "total_results": 2,
            "results": [
                {"geometry": {"lat": 1.0, "lng": 2.0}},
                {"geometry": {"lat": 3.0, "lng": 4.0}}
            ]
        }));
        assert!(matches!(interpret(response), Err(GeocodeError::Ambiguous)));
    }

    #[test]
    fn test_error_status_is_upstream_error() {
        let response = parse(json!({"status": {"code": 404, "message": "Not Found"}}));
        let err = interpret(response).unwrap_err();
        assert_eq!(err.to_string(), "Error 404: Not Found");
    }

    #[test]
    fn test_request_url_encodes_query() {
        let client = OpenCageClient::new("https://geo.example/v1/json", "secret");
        let url = client.request_url("12345 United States").unwrap();
        assert_eq!(
            url.as_str(),
            "https://geo.example/v1/json?q=12345+United+States&key=secret"
        );
    }
}
