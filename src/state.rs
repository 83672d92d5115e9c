use std::sync::Arc;

use artistry_config::{CorsConfig, JwtConfig, PaymentConfig, ServerConfig, StoreBackend};
use artistry_db::{MemoryStore, PgStore, Store, init_db_pool, run_migrations};

use crate::modules::payments::gateway::{PaymentGateway, StripeGateway};

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub payments: Arc<dyn PaymentGateway>,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub payment_config: PaymentConfig,
}

pub async fn init_app_state(server_config: &ServerConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn Store> = match server_config.store_backend {
        StoreBackend::Postgres => {
            let pool = init_db_pool().await?;
            run_migrations(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let payment_config = PaymentConfig::from_env();
    let payments: Arc<dyn PaymentGateway> = Arc::new(StripeGateway::new(&payment_config)?);

    Ok(AppState {
        store,
        payments,
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        payment_config,
    })
}
