use chrono::Duration;

use crate::jwt::Claims;
use crate::jwt::JwtHandler;
use crate::jwt::TokenError;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
///
/// Owns the signing secret and the token lifetime for the whole process.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    token_ttl: Duration,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// Signed bearer token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    /// * `token_ttl` - Lifetime of every issued token
    pub fn new(jwt_secret: &[u8], token_ttl: Duration) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret),
            token_ttl,
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue a token for the account.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `user_id` - Identifier embedded in the token
    /// * `email` - Email embedded in the token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is unusable
    /// * `TokenError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: impl ToString,
        email: impl ToString,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let is_valid = self.password_hasher.verify(password, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.issue_token(user_id, email)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Issue a token without password verification.
    ///
    /// Used right after registration, where the password was just set.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue_token(
        &self,
        user_id: impl ToString,
        email: impl ToString,
    ) -> Result<String, TokenError> {
        self.jwt_handler.issue(user_id, email, self.token_ttl)
    }

    /// Validate and decode a bearer token.
    ///
    /// # Errors
    /// * `TokenError` - Token is malformed, forged, expired or not yet valid
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.jwt_handler.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> Authenticator {
        Authenticator::new(b"test_secret_key_at_least_32_bytes!", Duration::hours(24))
    }

    #[test]
    fn test_authenticate_success() {
        let authenticator = authenticator();

        let password = "my_password";
        let hash = authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        let result = authenticator
            .authenticate(password, &hash, "user123", "ada@x.com")
            .expect("Authentication failed");

        assert!(!result.access_token.is_empty());

        let claims = authenticator
            .validate_token(&result.access_token)
            .expect("Token validation failed");
        assert_eq!(claims.user_id, "user123");
        assert_eq!(claims.email, "ada@x.com");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = authenticator();

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        let result = authenticator.authenticate("wrong_password", &hash, "user123", "ada@x.com");
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_corrupt_hash() {
        let authenticator = authenticator();

        let result = authenticator.authenticate("my_password", "not-a-phc-string", "1", "a@b.c");
        assert!(matches!(
            result,
            Err(AuthenticationError::PasswordError(
                PasswordError::VerificationFailed(_)
            ))
        ));
    }

    #[test]
    fn test_issue_and_validate_token() {
        let authenticator = authenticator();

        let token = authenticator
            .issue_token("user123", "ada@x.com")
            .expect("Failed to issue token");

        let claims = authenticator
            .validate_token(&token)
            .expect("Failed to validate token");
        assert_eq!(claims.user_id, "user123");
    }

    #[test]
    fn test_validate_token_from_other_secret() {
        let authenticator = authenticator();
        let other = Authenticator::new(b"another_secret_at_least_32_bytes!!", Duration::hours(1));

        let token = other.issue_token("user123", "ada@x.com").unwrap();

        assert_eq!(
            authenticator.validate_token(&token),
            Err(TokenError::SignatureInvalid)
        );
    }
}
