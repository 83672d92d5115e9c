//! Credential issuance DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TokenRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    /// Validity window in seconds
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_request_validation() {
        let ok = TokenRequest {
            email: "student@artistry.io".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = TokenRequest {
            email: "student".to_string(),
        };
        assert!(bad.validate().is_err());
    }
}
