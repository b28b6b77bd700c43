use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Claims carried by the session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The user's UUID.
    pub sub: String,
    /// Token expiration (Unix timestamp).
    pub exp: usize,
    /// Token issued-at (Unix timestamp).
    pub iat: usize,
}

impl Claims {
    /// Extract the user UUID from the `sub` claim.
    pub fn user_id(&self) -> Result<Uuid, String> {
        Uuid::parse_str(&self.sub).map_err(|e| format!("Invalid UUID in sub claim: {e}"))
    }
}

/// Signing secret and token lifetime, shared with handlers through app data.
#[derive(Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub ttl: Duration,
    pub cookie_secure: bool,
}

impl AuthSettings {
    pub fn new(secret: impl Into<String>, ttl: Duration, cookie_secure: bool) -> Self {
        Self {
            secret: secret.into(),
            ttl,
            cookie_secure,
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, String> {
        issue_token(user_id, &self.secret, self.ttl)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, String> {
        validate_token(token, &self.secret)
    }
}

/// Sign an HS256 token for `user_id` that expires after `ttl`.
pub fn issue_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, String> {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + ttl.as_secs() as usize,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("Failed to sign token: {e:?}"))
}

/// Validate an HS256 token and return the decoded claims.
///
/// Signature and expiry are both checked; the error string carries the
/// `jsonwebtoken` error kind.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Token validation failed: {:?}", e.kind()))
}
