use tracing::instrument;

use artistry_auth::create_token;
use artistry_config::JwtConfig;
use artistry_core::AppError;
use artistry_models::TokenResponse;

use crate::metrics::track_jwt_issued;

pub struct AuthService;

impl AuthService {
    /// Signs a credential for `email`. Identities are not consulted here;
    /// the role gate looks the caller up on every gated request.
    #[instrument(skip(jwt_config))]
    pub fn issue_token(email: &str, jwt_config: &JwtConfig) -> Result<TokenResponse, AppError> {
        let token = create_token(email, jwt_config)?;
        track_jwt_issued();

        Ok(TokenResponse {
            token,
            expires_in: jwt_config.expiry_seconds,
        })
    }
}
