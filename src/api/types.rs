use serde::{Deserialize, Serialize};

use crate::constants::categories::Category;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy)]
pub struct CategoryDto {
    pub id: u32,
    pub name: &'static str,
}

impl From<&Category> for CategoryDto {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchOptionsDto {
    pub categories: Vec<CategoryDto>,
    pub radius_options: Vec<u32>,
    pub default_radius: u32,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct KeywordQuery {
    #[serde(default)]
    pub keyword: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub version: &'static str,
    pub uptime: u64,
}
