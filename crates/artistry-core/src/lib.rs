//! # Artistry Core
//!
//! Error taxonomy and response envelope shared across the Artistry
//! Academia crates.

pub mod errors;
pub mod response;

pub use errors::{AppError, ErrorKind, ErrorResponse};
pub use response::ApiResponse;
