use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{Collection, Material, XpTotals};

/// A collection together with its XP figures for the requesting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionDto {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub total_xp: i64,
    pub earned_xp: i64,
}

impl CollectionDto {
    pub fn new(collection: Collection, totals: XpTotals) -> Self {
        CollectionDto {
            id: collection.id,
            user_id: collection.user_id,
            name: collection.name,
            description: collection.description,
            created_at: collection.created_at,
            updated_at: collection.updated_at,
            total_xp: totals.total_xp,
            earned_xp: totals.earned_xp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterialProgressDto {
    #[serde(flatten)]
    pub material: Material,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub collections: Vec<CollectionDto>,
    pub materials: Vec<Material>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub id: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
