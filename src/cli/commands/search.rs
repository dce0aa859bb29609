use anyhow::Context;

use crate::config::Config;
use crate::constants::categories;
use crate::services::{SearchOutcome, SearchRequest};
use crate::state::SharedState;

use super::{open_state, read_password};

pub async fn cmd_search(
    config: &Config,
    query: &str,
    radius: Option<u32>,
    category_ids: Vec<u32>,
    username: Option<&str>,
) -> anyhow::Result<()> {
    let state = open_state(config).await?;

    let user_id = match username {
        Some(username) => {
            let password = read_password(username)?;
            let user = state.auth_service.login(username, &password).await?;
            Some(user.user_id)
        }
        None => None,
    };

    let filter: Vec<&str> = category_ids
        .iter()
        .filter_map(|id| categories::find(*id).map(|c| c.name))
        .collect();
    if filter.is_empty() {
        println!("Searching around: {query}");
    } else {
        println!("Searching around: {query} ({})", filter.join(", "));
    }

    let request = SearchRequest {
        query: query.to_string(),
        radius,
        categories: category_ids,
    };

    let outcome = run_search(&state, &request, user_id).await?;
    print_outcome(&outcome, user_id.is_some());

    Ok(())
}

async fn run_search(
    state: &SharedState,
    request: &SearchRequest,
    user_id: Option<i32>,
) -> anyhow::Result<SearchOutcome> {
    state
        .search_service
        .search(request, user_id)
        .await
        .context("Search failed")
}

fn print_outcome(outcome: &SearchOutcome, signed_in: bool) {
    println!(
        "Location: {:.5}, {:.5} | Radius: {} m",
        outcome.coordinates.latitude, outcome.coordinates.longitude, outcome.radius
    );
    println!("{:-<60}", "");

    if let Some(message) = &outcome.message {
        println!("{message}");
        return;
    }

    for place in &outcome.places {
        println!("• {}", place.name);
        match place.distance {
            Some(distance) => println!("  {} ({distance} m)", place.address),
            None => println!("  {}", place.address),
        }
    }

    println!();
    println!("{} places found", outcome.places.len());
    if signed_in {
        println!("✓ {} saved to history", outcome.saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{
        Coordinates, GeocodeError, Geocoder, Place, PlacesError, PlacesProvider, PlacesQuery,
    };
    use std::sync::Arc;

    struct ParisGeocoder;

    #[async_trait::async_trait]
    impl Geocoder for ParisGeocoder {
        async fn geocode(&self, _: &str) -> Result<Coordinates, GeocodeError> {
            Ok(Coordinates {
                latitude: 48.8566,
                longitude: 2.3522,
            })
        }
    }

    struct TwoPlaces;

    #[async_trait::async_trait]
    impl PlacesProvider for TwoPlaces {
        async fn search_nearby(&self, query: &PlacesQuery) -> Result<Vec<Place>, PlacesError> {
            if query.radius == 10000 {
                return Err(PlacesError::Connection("reset by peer".into()));
            }
            Ok(["Louvre", "Cafe de Flore"]
                .into_iter()
                .map(|name| Place {
                    name: name.to_string(),
                    address: "Paris".to_string(),
                    latitude: None,
                    longitude: None,
                    distance: None,
                })
                .collect())
        }
    }

    async fn state() -> SharedState {
        let mut config = Config::default();
        config.general.database_path = "sqlite::memory:".to_string();
        config.security.argon2_memory_cost_kib = 1024;
        config.security.argon2_time_cost = 1;

        let state =
            SharedState::with_collaborators(config, Arc::new(ParisGeocoder), Arc::new(TwoPlaces))
                .await
                .unwrap();
        state.store.migrate().await.unwrap();
        state
    }

    fn request(query: &str, radius: Option<u32>) -> SearchRequest {
        SearchRequest {
            query: query.to_string(),
            radius,
            categories: Vec::new(),
        }
    }

    #[tokio::test]
    async fn signed_in_search_is_recorded() {
        let state = state().await;
        let user = state
            .auth_service
            .register("traveller", "password123")
            .await
            .unwrap();

        let outcome = run_search(&state, &request("Paris", None), Some(user.user_id))
            .await
            .unwrap();
        assert_eq!(outcome.saved, 2);
        assert_eq!(
            state.history_service.get_history(user.user_id).await.unwrap().len(),
            2
        );

        let guest = run_search(&state, &request("Paris", None), None).await.unwrap();
        assert_eq!(guest.saved, 0);
    }

    #[tokio::test]
    async fn failed_search_is_an_error() {
        let state = state().await;

        let err = run_search(&state, &request(" P ", None), None)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").starts_with("Search failed: query is too short"));

        assert!(run_search(&state, &request("Paris", Some(10000)), None).await.is_err());
    }
}
