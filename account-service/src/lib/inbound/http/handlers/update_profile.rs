use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::account::errors::AccountError;
use crate::account::models::EmailAddress;
use crate::account::models::UpdateProfileCommand;
use crate::account::models::UserName;
use crate::account::ports::AccountServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// HTTP request body for updating the caller's profile (raw JSON).
///
/// Absent and `null` fields are left unchanged. A present field is always
/// validated, so an empty string is rejected rather than clearing the value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UpdateProfileRequest {
    fn try_into_command(self) -> Result<UpdateProfileCommand, AccountError> {
        // Validation happens here - errors are automatically converted via #[from]
        let name = self.name.map(UserName::new).transpose()?;

        let email = self.email.map(EmailAddress::new).transpose()?;

        Ok(UpdateProfileCommand { name, email })
    }
}

pub async fn update_profile<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Extension(principal): Extension<AuthenticatedUser>,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let Json(request) = body?;
    let command = request.try_into_command()?;

    state
        .account_service
        .update_profile(&principal.user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| {
            ApiSuccess::new(StatusCode::OK, "Profile updated successfully", user.into())
        })
}
