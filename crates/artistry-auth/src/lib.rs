//! # Artistry Auth
//!
//! Credential issuance and verification for the Artistry Academia API.
//!
//! - [`claims`]: the signed claim set
//! - [`jwt`]: HS256 token creation and verification
//!
//! Credentials assert an email only. Roles live in the store and are looked
//! up on every gated request, so a role change takes effect immediately.
//!
//! # Example
//!
//! ```ignore
//! use artistry_auth::{create_token, verify_token};
//! use artistry_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_token("student@artistry.io", &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.email, "student@artistry.io");
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_token, verify_token};
