use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Payload carried inside a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // Subject (user id)
    pub exp: i64,    // Expiration time (as UTC timestamp)
    pub iat: i64,    // Issued at (as UTC timestamp)
}

impl SessionClaims {
    pub fn new(user_id: &str, issued_at: DateTime<Utc>, lifetime: Duration) -> Self {
        let exp = issued_at + lifetime;

        Self {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: exp.timestamp(),
        }
    }
}
