//! HS256 JWT issuance and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::{AuthOutcome, Rejection};

pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 3600;

/// Payload carried inside every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    /// Expiration (Unix timestamp, seconds)
    pub exp: i64,
}

/// Signs and verifies tokens with a single shared secret.
///
/// Holds no per-token state: a token stays valid until its `exp` passes or
/// the secret changes.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::seconds(DEFAULT_TOKEN_TTL_SECS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        // Expiry is checked by hand against the caller's clock, with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Build claims expiring `ttl` after `now` and sign them.
    pub fn issue(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            username: username.to_string(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Check the signature, then require `now < exp`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> AuthOutcome {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!("token decode failed: {}", e);
            Rejection::InvalidSignature
        })?;

        if now.timestamp() >= data.claims.exp {
            return Err(Rejection::Expired);
        }
        Ok(data.claims)
    }
}
