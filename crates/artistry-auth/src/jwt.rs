//! HS256 credential issuance and verification.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use artistry_config::JwtConfig;
use artistry_core::AppError;

use crate::claims::Claims;

/// Signs `{email, iat, exp}` with the configured secret.
///
/// The validity window is `jwt_config.expiry_seconds`.
///
/// # Errors
///
/// Returns an internal error if encoding fails.
pub fn create_token(email: &str, jwt_config: &JwtConfig) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.expiry_seconds.max(0) as usize;

    let claims = Claims {
        email: email.to_string(),
        iat: now,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Verifies signature and expiry and returns the claims.
///
/// # Errors
///
/// Returns an unauthenticated error if the token is malformed, signed with
/// another secret, or expired.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use artistry_core::ErrorKind;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            expiry_seconds: 3600,
        }
    }

    #[test]
    fn test_create_token_success() {
        let config = get_test_jwt_config();
        let token = create_token("test@example.com", &config).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_verify_token_success() {
        let config = get_test_jwt_config();
        let token = create_token("verify@example.com", &config).unwrap();

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.email, "verify@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_verify_token_invalid() {
        let config = get_test_jwt_config();
        let err = verify_token("invalid.token.here", &config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthenticated);
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let config = get_test_jwt_config();
        let token = create_token("test@example.com", &config).unwrap();

        let other = JwtConfig {
            secret: "a-completely-different-secret-key-value".to_string(),
            ..config
        };
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn test_verify_token_expired() {
        let config = get_test_jwt_config();
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            email: "old@example.com".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        let err = verify_token(&token, &config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthenticated);
    }

    #[test]
    fn test_configured_window_is_used() {
        let config = JwtConfig {
            expiry_seconds: 604800,
            ..get_test_jwt_config()
        };
        let token = create_token("week@example.com", &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.exp - claims.iat, 604800);
    }
}
