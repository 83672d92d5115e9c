//! JWT claim set for bearer credentials.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims embedded in a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Email of the identity the credential was issued to
    pub email: String,
    /// Issued-at (Unix timestamp)
    pub iat: usize,
    /// Expiration (Unix timestamp)
    pub exp: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize() {
        let claims = Claims {
            email: "test@example.com".to_string(),
            iat: 1234567800,
            exp: 1234567890,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""email":"test@example.com""#));
        assert!(!serialized.contains("role"));
    }

    #[test]
    fn test_claims_deserialize() {
        let json = r#"{"email":"user@test.com","exp":9999999999,"iat":9999999900}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.email, "user@test.com");
        assert_eq!(claims.exp, 9999999999);
        assert_eq!(claims.iat, 9999999900);
    }

    #[test]
    fn test_claims_require_email() {
        let json = r#"{"exp":9999999999,"iat":9999999900}"#;
        assert!(serde_json::from_str::<Claims>(json).is_err());
    }
}
