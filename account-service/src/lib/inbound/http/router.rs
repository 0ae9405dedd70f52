use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::get_profile::get_profile;
use super::handlers::health::health;
use super::handlers::login::login;
use super::handlers::register::register;
use super::handlers::update_profile::update_profile;
use super::middleware::authenticate as auth_middleware;
use crate::account::ports::AccountServicePort;

/// Shared handler state. Generic over the service port so the router can be
/// driven by any implementation.
pub struct AppState<S: AccountServicePort> {
    pub account_service: Arc<S>,
    pub authenticator: Arc<Authenticator>,
}

impl<S: AccountServicePort> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            account_service: Arc::clone(&self.account_service),
            authenticator: Arc::clone(&self.authenticator),
        }
    }
}

pub fn create_router<S: AccountServicePort>(
    account_service: Arc<S>,
    authenticator: Arc<Authenticator>,
) -> Router {
    let state = AppState {
        account_service,
        authenticator,
    };

    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(register::<S>))
        .route("/api/auth/login", post(login::<S>));

    let protected_routes = Router::new()
        .route(
            "/api/profile",
            get(get_profile::<S>).put(update_profile::<S>),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.authenticator),
            auth_middleware,
        ));

    // Headers are left out of the span: they carry bearer tokens
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN;
    use axum::http::header::AUTHORIZATION;
    use axum::http::header::ORIGIN;
    use axum::http::StatusCode;
    use chrono::Duration;
    use chrono::Utc;
    use http_body_util::BodyExt;
    use mockall::mock;
    use tower::ServiceExt;

    use super::*;
    use crate::account::errors::AccountError;
    use crate::account::models::AuthResult;
    use crate::account::models::EmailAddress;
    use crate::account::models::LoginCommand;
    use crate::account::models::RegisterCommand;
    use crate::account::models::UpdateProfileCommand;
    use crate::account::models::User;
    use crate::account::models::UserId;
    use crate::account::models::UserName;

    mock! {
        pub AccountService {}

        #[async_trait]
        impl AccountServicePort for AccountService {
            async fn register(&self, command: RegisterCommand) -> Result<AuthResult, AccountError>;
            async fn login(&self, command: LoginCommand) -> Result<AuthResult, AccountError>;
            async fn get_profile(&self, id: &UserId) -> Result<User, AccountError>;
            async fn update_profile(
                &self,
                id: &UserId,
                command: UpdateProfileCommand,
            ) -> Result<User, AccountError>;
        }
    }

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(Authenticator::new(
            b"test_secret_key_at_least_32_bytes!",
            Duration::hours(1),
        ))
    }

    fn user(id: UserId) -> User {
        let now = Utc::now();
        User {
            id,
            name: UserName::new("Ada".to_string()).unwrap(),
            email: EmailAddress::new("ada@x.com".to_string()).unwrap(),
            password_hash: "hash".to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_health_through_middleware_stack() {
        let router = create_router(Arc::new(MockAccountService::new()), authenticator());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[tokio::test]
    async fn test_protected_route_without_token() {
        let mut service = MockAccountService::new();
        service.expect_get_profile().never();
        let router = create_router(Arc::new(service), authenticator());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/profile")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_protected_route_with_token() {
        let user_id = UserId::new();
        let authenticator = authenticator();
        let token = authenticator.issue_token(user_id, "ada@x.com").unwrap();

        let mut service = MockAccountService::new();
        service
            .expect_get_profile()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(user(user_id)));
        let router = create_router(Arc::new(service), authenticator);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/profile")
                    .header(AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["data"]["id"], user_id.to_string());
        assert_eq!(body["message"], "Profile retrieved successfully");
    }
}
