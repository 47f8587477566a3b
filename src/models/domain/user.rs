use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub login: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(login: &str, password_hash: &str) -> Self {
        User {
            id: Uuid::new_v4().to_string(),
            login: login.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        }
    }
}
