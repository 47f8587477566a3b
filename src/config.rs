use std::{env, time::Duration};

use secrecy::SecretString;

use crate::errors::{AppError, AppResult};

const DEV_TOKEN_SECRET: &str = "dev_secret_key_change_in_production";
const DEFAULT_TOKEN_HOURS: i64 = 24;
const MAX_TOKEN_HOURS: i64 = 24 * 365;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub client_origin: String,
    pub token_secret: SecretString,
    pub token_expiration_hours: i64,
    pub session_cookie_name: String,
    pub store_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "skill-builder".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            client_origin: env::var("CLIENT_ORIGIN")
                .unwrap_or_else(|_| "http://127.0.0.1:8081".to_string()),
            token_secret: SecretString::from(
                env::var("TOKEN_SECRET").unwrap_or_else(|_| DEV_TOKEN_SECRET.to_string()),
            ),
            token_expiration_hours: env::var("TOKEN_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(DEFAULT_TOKEN_HOURS),
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "Authorization".to_string()),
            store_timeout_secs: env::var("STORE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    /// Out-of-range settings are clamped so issued tokens are never born
    /// expired and the duration cannot overflow.
    pub fn token_lifetime(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_expiration_hours.clamp(1, MAX_TOKEN_HOURS))
    }

    /// Rejects configuration that must never reach a deployed instance.
    pub fn validate_for_production(&self) -> AppResult<()> {
        use secrecy::ExposeSecret;

        let secret = self.token_secret.expose_secret();

        if secret == DEV_TOKEN_SECRET {
            return Err(AppError::InternalError(
                "TOKEN_SECRET is using the development default".to_string(),
            ));
        }

        if secret.len() < 32 {
            return Err(AppError::InternalError(format!(
                "TOKEN_SECRET is too short ({}), at least 32 bytes are required",
                secret.len()
            )));
        }

        if !(1..=MAX_TOKEN_HOURS).contains(&self.token_expiration_hours) {
            return Err(AppError::InternalError(format!(
                "TOKEN_EXPIRATION_HOURS must be between 1 and {}",
                MAX_TOKEN_HOURS
            )));
        }

        Ok(())
    }

    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "skill-builder-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            client_origin: "http://127.0.0.1:8081".to_string(),
            token_secret: SecretString::from("test_token_secret_key".to_string()),
            token_expiration_hours: 1,
            session_cookie_name: "Authorization".to_string(),
            store_timeout_secs: 5,
        }
    }
}
