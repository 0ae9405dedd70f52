use std::sync::Arc;

use auth::Authenticator;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use thiserror::Error;

use crate::account::models::EmailAddress;
use crate::account::models::UserId;
use crate::inbound::http::handlers::ApiError;

const BEARER_PREFIX: &str = "Bearer ";

/// Principal resolved by the gate, stored in request extensions and
/// extracted by handlers with `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: EmailAddress,
}

/// Why the gate refused a request. Every variant answers 401.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AuthRejection {
    #[error("Authorization header required")]
    MissingHeader,

    #[error("Invalid authorization header format")]
    MalformedHeader,

    #[error("Token not provided")]
    EmptyToken,

    #[error("Invalid or expired token")]
    InvalidOrExpired,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        ApiError::Unauthorized(self.to_string()).into_response()
    }
}

/// Middleware that validates bearer tokens and adds the principal to request extensions.
///
/// Any rejection short-circuits: the inner handler never runs.
pub async fn authenticate(
    State(authenticator): State<Arc<Authenticator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let principal = resolve_principal(&authenticator, req.headers()).map_err(|rejection| {
        tracing::warn!(
            reason = ?rejection,
            method = %req.method(),
            uri = %req.uri(),
            "Request rejected by authentication"
        );
        rejection
    })?;

    tracing::debug!(user_id = %principal.user_id, "Request authenticated");

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// Turn request headers into an authenticated principal.
pub fn resolve_principal(
    authenticator: &Authenticator,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, AuthRejection> {
    let token = extract_token_from_header(headers)?;

    let claims = authenticator.validate_token(token).map_err(|e| {
        tracing::debug!(error = %e, "Token validation failed");
        AuthRejection::InvalidOrExpired
    })?;

    // A correctly signed token with unusable claims is treated as invalid
    let user_id =
        UserId::from_string(&claims.user_id).map_err(|_| AuthRejection::InvalidOrExpired)?;
    let email = EmailAddress::new(claims.email).map_err(|_| AuthRejection::InvalidOrExpired)?;

    Ok(AuthenticatedUser { user_id, email })
}

fn extract_token_from_header(headers: &HeaderMap) -> Result<&str, AuthRejection> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthRejection::MissingHeader)?;

    if auth_header.is_empty() {
        return Err(AuthRejection::MissingHeader);
    }

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthRejection::MalformedHeader)?;

    let token = auth_str
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthRejection::MalformedHeader)?;

    if token.trim().is_empty() {
        return Err(AuthRejection::EmptyToken);
    }

    Ok(token)
}
