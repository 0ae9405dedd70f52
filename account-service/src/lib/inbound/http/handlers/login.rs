use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthResponseData;
use crate::account::errors::AccountError;
use crate::account::models::EmailAddress;
use crate::account::models::LoginCommand;
use crate::account::models::Password;
use crate::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

pub async fn login<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    let Json(body) = body?;

    state
        .account_service
        .login(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref result| ApiSuccess::new(StatusCode::OK, "Login successful", result.into()))
}

/// HTTP request body for login (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

impl LoginRequest {
    fn try_into_command(self) -> Result<LoginCommand, AccountError> {
        Ok(LoginCommand {
            email: EmailAddress::new(self.email)?,
            password: Password::submitted(self.password)?,
        })
    }
}
