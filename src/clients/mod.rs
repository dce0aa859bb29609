//! Upstream lookups used by location search.
//!
//! Both collaborators sit behind traits so the search flow can run against
//! fakes in tests and against the HTTP clients in production.

pub mod foursquare;
pub mod opencage;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A point of interest as returned by the places lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Metres from the searched coordinates, when the upstream reports it
    pub distance: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacesQuery {
    pub coordinates: Coordinates,
    pub radius: u32,
    /// Comma-joined category ids; empty means no filter
    pub categories: String,
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("location not found - please use a valid location")]
    NotFound,

    #[error(
        "multiple locations or invalid location found - check for misspellings or provide a more specific location"
    )]
    Ambiguous,

    #[error("Error {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("connection failure - check your internet connection")]
    Connection(String),

    #[error("failed to read geocoding response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("Error {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("connection failure - check your internet connection")]
    Connection(String),

    #[error("failed to retrieve destinations: {0}")]
    Decode(String),
}

#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves free text to a single coordinate pair.
    async fn geocode(&self, query: &str) -> Result<Coordinates, GeocodeError>;
}

#[async_trait::async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Places near the coordinates that carry a formatted address, nearest first.
    async fn search_nearby(&self, query: &PlacesQuery) -> Result<Vec<Place>, PlacesError>;
}
