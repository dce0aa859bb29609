pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod history_service;
pub mod history_service_impl;
pub use history_service::{HistoryError, HistoryService};
pub use history_service_impl::SeaOrmHistoryService;

pub mod search;
pub use search::{LocationSearchService, SearchError, SearchOutcome, SearchRequest};
