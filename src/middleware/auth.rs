use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use artistry_auth::{Claims, verify_token};
use artistry_core::AppError;

use crate::security_event;
use crate::state::AppState;

/// Extractor that validates the bearer credential and yields its claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let claims = verify_token(token, &state.jwt_config).inspect_err(|_| {
            security_event!("credential_rejected", path = %parts.uri.path());
        })?;

        Ok(AuthUser(claims))
    }
}
