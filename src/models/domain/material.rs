use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Material {
    pub id: String,
    pub user_id: String, // Creator, fixed at creation
    pub name: String,
    pub description: String,
    pub type_id: String,
    pub xp: i64,
    pub link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Material {
    pub fn new(
        owner_id: &str,
        name: &str,
        description: &str,
        type_id: &str,
        xp: i64,
        link: &str,
    ) -> Self {
        let now = Utc::now();
        Material {
            id: Uuid::new_v4().to_string(),
            user_id: owner_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            type_id: type_id.to_string(),
            xp,
            link: link.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn matches(&self, query: &str) -> bool {
        self.name.contains(query) || self.description.contains(query)
    }
}

/// Catalog entry describing a kind of material (article, video, course...).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MaterialType {
    pub id: String,
    pub name: String,
    pub characteristic: String,
    pub xp: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
