use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::clients::{GeocodeError, PlacesError};
use crate::services::{AuthError, HistoryError, SearchError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ExternalApiError { service: String, message: String },

    ValidationError(String),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::ExternalApiError { service, message } => {
                write!(f, "{} error: {}", service, message)
            }
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::ExternalApiError { service, message } => {
                tracing::warn!("{} API error: {}", service, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{} service error: {}", service, message),
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::UsernameTaken => Self::Conflict(err.to_string()),
            AuthError::UserNotFound => Self::NotFound(err.to_string()),
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<HistoryError> for ApiError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::UserNotFound => Self::NotFound(err.to_string()),
            HistoryError::Validation(msg) => Self::validation(msg),
            HistoryError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Validation(msg) => Self::validation(msg),
            SearchError::Geocoding(e) => e.into(),
            SearchError::Places(e) => e.into(),
            SearchError::History(e) => e.into(),
        }
    }
}

impl From<GeocodeError> for ApiError {
    fn from(err: GeocodeError) -> Self {
        match err {
            // The lookup itself worked; the query was the problem.
            GeocodeError::NotFound | GeocodeError::Ambiguous => Self::validation(err.to_string()),
            _ => Self::geocoding_error(err.to_string()),
        }
    }
}

impl From<PlacesError> for ApiError {
    fn from(err: PlacesError) -> Self {
        Self::places_error(err.to_string())
    }
}

impl ApiError {
    pub fn geocoding_error(msg: impl Into<String>) -> Self {
        ApiError::ExternalApiError {
            service: "Geocoding".to_string(),
            message: msg.into(),
        }
    }

    pub fn places_error(msg: impl Into<String>) -> Self {
        ApiError::ExternalApiError {
            service: "Places".to_string(),
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        let err: ApiError = err.into();
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::UsernameTaken), StatusCode::CONFLICT);
        assert_eq!(
            status_of(HistoryError::Validation("short".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(HistoryError::UserNotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(SearchError::Geocoding(GeocodeError::Ambiguous)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(SearchError::Places(PlacesError::Connection("reset".into()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(HistoryError::Database("disk I/O error".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_error_names_service() {
        let err: ApiError = GeocodeError::Upstream {
            status: 401,
            message: "invalid API key".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Geocoding error: Error 401: invalid API key");
    }
}
