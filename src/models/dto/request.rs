use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(length(min = 3, max = 50))]
    pub login: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CollectionRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 4000))]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMaterialRequest {
    // Attach to this collection right away; the caller must own it
    #[serde(default, rename = "collectionID", alias = "collection_id")]
    pub collection_id: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 4000))]
    pub description: String,

    #[serde(default, rename = "type", alias = "type_id")]
    pub type_id: String,

    #[validate(range(min = 0))]
    pub xp: i64,

    #[serde(default)]
    #[validate(length(max = 2048))]
    pub link: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMaterialRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 4000))]
    pub description: String,

    #[serde(default, rename = "type", alias = "type_id")]
    pub type_id: String,

    #[validate(range(min = 0))]
    pub xp: i64,

    #[serde(default)]
    #[validate(length(max = 2048))]
    pub link: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

/// Rejects empty or non-UUID ids taken from paths and bodies.
pub fn parse_id(raw: &str, what: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{} id is required", what)));
    }

    Uuid::parse_str(trimmed)
        .map(|id| id.to_string())
        .map_err(|_| AppError::BadRequest(format!("{} id '{}' is not a valid id", what, trimmed)))
}
