//! # Artistry DB
//!
//! Persistence for the Artistry Academia API.
//!
//! - [`store`]: the [`Store`] and [`EnrollmentTx`] ports and [`StoreError`]
//! - [`postgres`]: [`PgStore`], backed by a SQLx connection pool
//! - [`memory`]: [`MemoryStore`], an in-process store used by tests
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use artistry_db::{PgStore, Store, init_db_pool, run_migrations};
//!
//! let pool = init_db_pool().await?;
//! run_migrations(&pool).await?;
//! let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
//! ```

pub mod memory;
pub mod postgres;
pub mod store;

use std::env;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use sqlx::PgPool;
pub use store::{COURSE_ENROLLMENT, EnrollmentTx, PAYMENT_REF, Store, StoreError, StoreResult};

/// Connects to the database named by `DATABASE_URL`.
///
/// # Errors
///
/// Returns [`StoreError::Unavailable`] when `DATABASE_URL` is unset and
/// [`StoreError::Database`] when the connection fails.
pub async fn init_db_pool() -> StoreResult<PgPool> {
    let database_url = env::var("DATABASE_URL")
        .map_err(|_| StoreError::Unavailable("DATABASE_URL must be set".to_string()))?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded migrations from `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
