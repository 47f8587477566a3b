use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Collection {
    pub id: String,
    pub user_id: String, // Owner, fixed at creation
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Collection {
    pub fn new(owner_id: &str, name: &str, description: &str) -> Self {
        let now = Utc::now();
        Collection {
            id: Uuid::new_v4().to_string(),
            user_id: owner_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Case-sensitive substring match over name and description.
    pub fn matches(&self, query: &str) -> bool {
        self.name.contains(query) || self.description.contains(query)
    }
}
