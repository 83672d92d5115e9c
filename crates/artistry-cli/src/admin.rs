//! First-admin bootstrap.
//!
//! Role changes over HTTP need an admin caller, so the first admin has to
//! come from here.

use artistry_db::{Store, StoreError};
use artistry_models::{Identity, IdentityUpsert, UserRole};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CreateAdminError {
    #[error("{0} belongs to a deleted identity")]
    Deleted(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Upserts `email` and promotes it to admin.
pub async fn create_admin(
    store: &dyn Store,
    email: &str,
    name: Option<String>,
) -> Result<Identity, CreateAdminError> {
    let changes = IdentityUpsert {
        name,
        photo_url: None,
        role: Some(UserRole::Admin),
    };

    store
        .upsert_identity(email, &changes)
        .await?
        .ok_or_else(|| CreateAdminError::Deleted(email.to_string()))
}
