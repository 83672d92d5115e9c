//! Role gate.
//!
//! Credentials carry only an email, so every gated request looks the
//! caller up in the store and checks the stored role. Two ways to gate:
//!
//! 1. Layer: `require_admin` / `require_instructor` / `require_student` on a
//!    router; the handler reads the caller with [`CurrentIdentity`].
//! 2. Extractor: [`RequireAdmin`], [`RequireInstructor`], for routes that
//!    share a path with a public method.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::Instrument;

use artistry_core::AppError;
use artistry_db::{Store, StoreError};
use artistry_models::{Identity, UserRole};

use crate::middleware::auth::AuthUser;
use crate::metrics::track_authorization_check;
use crate::state::AppState;
use crate::utils::tracing::record_auth_result;
use crate::{auth_span, security_event};

/// Outcome of checking a caller's stored role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleCheck {
    Granted(Identity),
    /// The identity exists but its role is not allowed
    WrongRole { actual: UserRole },
    /// No live identity has the credential's email
    UnknownIdentity,
}

impl RoleCheck {
    pub fn outcome(&self) -> &'static str {
        match self {
            RoleCheck::Granted(_) => "granted",
            RoleCheck::WrongRole { .. } => "wrong_role",
            RoleCheck::UnknownIdentity => "unknown_identity",
        }
    }

    pub fn into_result(self, allowed: &[UserRole]) -> Result<Identity, AppError> {
        match self {
            RoleCheck::Granted(identity) => Ok(identity),
            RoleCheck::WrongRole { actual } => Err(AppError::forbidden(format!(
                "Access denied. Required role: {}, but user has role: {}",
                describe_roles(allowed),
                actual
            ))),
            RoleCheck::UnknownIdentity => {
                Err(AppError::unknown_identity("No user is registered for this credential"))
            }
        }
    }
}

fn describe_roles(roles: &[UserRole]) -> String {
    roles
        .iter()
        .map(UserRole::as_str)
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Looks `email` up and classifies its stored role against `allowed`.
pub async fn check_stored_role(
    store: &dyn Store,
    email: &str,
    allowed: &[UserRole],
) -> Result<RoleCheck, StoreError> {
    let check = match store.find_identity_by_email(email).await? {
        None => RoleCheck::UnknownIdentity,
        Some(identity) if allowed.contains(&identity.role) => RoleCheck::Granted(identity),
        Some(identity) => RoleCheck::WrongRole {
            actual: identity.role,
        },
    };
    Ok(check)
}

/// Runs the role gate for an authenticated caller.
pub async fn authorize(
    state: &AppState,
    auth_user: &AuthUser,
    allowed: &[UserRole],
) -> Result<Identity, AppError> {
    let required = describe_roles(allowed);
    let span = auth_span!("role_check", user.email = %auth_user.email(), required = %required);

    async {
        let check = check_stored_role(state.store.as_ref(), auth_user.email(), allowed).await?;
        let outcome = check.outcome();

        track_authorization_check(outcome, &required);
        record_auth_result(matches!(check, RoleCheck::Granted(_)));

        if !matches!(check, RoleCheck::Granted(_)) {
            security_event!(
                "authorization_denied",
                user.email = %auth_user.email(),
                outcome = outcome,
                required = %required
            );
        }

        check.into_result(allowed)
    }
    .instrument(span)
    .await
}

/// Passes the request on only when the caller's stored role is in
/// `allowed_roles`. The caller's identity is added to the request
/// extensions as [`CurrentIdentity`].
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: &'static [UserRole],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    let identity = authorize(&state, &auth_user, allowed_roles).await?;

    parts.extensions.insert(auth_user);
    parts.extensions.insert(CurrentIdentity(identity));

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    require_roles(State(state), req, next, &[UserRole::Admin])
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

pub async fn require_instructor(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    require_roles(State(state), req, next, &[UserRole::Instructor])
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

pub async fn require_student(State(state): State<AppState>, req: Request, next: Next) -> Response {
    require_roles(State(state), req, next, &[UserRole::Student])
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

/// The caller's identity as resolved by a `require_*` layer.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentIdentity>()
            .cloned()
            .ok_or_else(|| AppError::internal_error("Route is missing its role gate"))
    }
}

/// Declares an extractor that authenticates the caller and requires one of
/// the listed stored roles.
macro_rules! require_role {
    ($(#[$meta:meta])* $name:ident, [$($role:expr),+ $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(pub Identity);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user = AuthUser::from_request_parts(parts, state).await?;
                let identity = authorize(state, &auth_user, &[$($role),+]).await?;
                Ok($name(identity))
            }
        }
    };
}

require_role!(
    /// Caller must be an admin.
    RequireAdmin,
    [UserRole::Admin]
);
require_role!(
    /// Caller must be an instructor.
    RequireInstructor,
    [UserRole::Instructor]
);
