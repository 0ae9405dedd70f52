use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::Error as JsonWebTokenError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::TokenError;

/// Algorithms accepted on verification. Anything outside the HMAC family is
/// rejected before the signature is checked.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Bearer token issuer and verifier.
///
/// Signs with HS256 (HMAC with SHA-256) keyed by a process-wide secret.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new token handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Tokens carry no key identifier: changing the secret invalidates
    ///   every outstanding token at once
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Issue a token valid from now until `now + ttl`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue(
        &self,
        user_id: impl ToString,
        email: impl ToString,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        self.issue_at(user_id, email, ttl, Utc::now())
    }

    /// Issue a token with an explicit issuance instant.
    ///
    /// Identical inputs produce identical tokens.
    pub fn issue_at(
        &self,
        user_id: impl ToString,
        email: impl ToString,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        self.encode(&Claims::new(user_id, email, ttl, now)?)
    }

    /// Sign a set of claims.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify a token against the current time.
    ///
    /// # Errors
    /// * `Malformed` - Token cannot be parsed or lacks required claims
    /// * `SignatureInvalid` - Signature or algorithm does not match
    /// * `Expired` - `exp` is in the past
    /// * `NotYetValid` - `nbf` is in the future
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token against an explicit instant.
    ///
    /// Accepted only when the signature holds and `nbf <= now <= exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        // The validity window is checked below against `now`, without leeway
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "nbf"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(Self::map_decode_error)?
            .claims;

        let timestamp = now.timestamp();
        if claims.is_premature(timestamp) {
            return Err(TokenError::NotYetValid);
        }
        if claims.is_expired(timestamp) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn map_decode_error(error: JsonWebTokenError) -> TokenError {
        match error.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::SignatureInvalid
            }
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            _ => TokenError::Malformed(error.to_string()),
        }
    }
}
