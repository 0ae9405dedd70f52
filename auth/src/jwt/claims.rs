use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::TokenError;

/// Bearer token claims.
///
/// Carries the authenticated identity plus its validity window. All
/// timestamps are Unix seconds. Every field is required: a token missing any
/// of them fails to decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Account identifier
    pub user_id: String,

    /// Account email at the time of issuance
    pub email: String,

    /// Issued at
    pub iat: i64,

    /// Not before
    pub nbf: i64,

    /// Expiration time
    pub exp: i64,
}

impl Claims {
    /// Create claims valid from `now` until `now + ttl`.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier
    /// * `email` - User email address
    /// * `ttl` - Token lifetime
    /// * `now` - Issuance instant
    ///
    /// # Errors
    /// * `EncodingFailed` - `now + ttl` is outside the representable range
    pub fn new(
        user_id: impl ToString,
        email: impl ToString,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self, TokenError> {
        let issued_at = now.timestamp();
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            TokenError::EncodingFailed(format!("token lifetime out of range: {}", ttl))
        })?;

        Ok(Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
            iat: issued_at,
            nbf: issued_at,
            exp: expires_at.timestamp(),
        })
    }

    /// Check if the token has expired at `current_timestamp`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }

    /// Check if the token is not yet usable at `current_timestamp`.
    pub fn is_premature(&self, current_timestamp: i64) -> bool {
        self.nbf > current_timestamp
    }
}
