//! # Artistry Config
//!
//! Configuration types for the Artistry Academia API.
//!
//! Each struct is loaded from environment variables by its `from_env`
//! constructor; missing or unparsable values fall back to defaults, except
//! `STORE_BACKEND`, which must name a known store when set.
//!
//! - [`jwt`]: credential signing secret and validity window
//! - [`cors`]: allowed origins
//! - [`payment`]: payment processor credentials
//! - [`server`]: listener ports, log directory and store backend
//!
//! # Example
//!
//! ```ignore
//! use artistry_config::{CorsConfig, JwtConfig, PaymentConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod cors;
pub mod jwt;
pub mod payment;
pub mod server;

pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use payment::PaymentConfig;
pub use server::{ConfigError, ServerConfig, StoreBackend};
