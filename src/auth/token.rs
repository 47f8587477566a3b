use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::{
    auth::claims::SessionClaims,
    errors::{AppError, AppResult, AuthError},
};

/// Issues and verifies the HMAC-signed session tokens carried in the session
/// cookie. Holds only read-only key material, so one instance is shared by
/// every request.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenCodec {
    pub fn new(secret: &SecretString, lifetime: Duration) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret_bytes),
            decoding_key: DecodingKey::from_secret(secret_bytes),
            validation,
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn issue(&self, user_id: &str) -> AppResult<String> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: &str, issued_at: DateTime<Utc>) -> AppResult<String> {
        let claims = SessionClaims::new(user_id, issued_at, self.lifetime);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(format!("Failed to sign session token: {}", e)))
    }

    /// Returns the user id bound to `token`.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Malformed,
            })?;

        let user_id = data.claims.sub;
        if Uuid::parse_str(&user_id).is_err() {
            return Err(AuthError::Malformed);
        }

        Ok(user_id)
    }
}
