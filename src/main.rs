use anyhow::Context;
use dotenvy::dotenv;
use tracing::{error, info};

use artistry::logging::init_tracing;
use artistry::metrics::{init_metrics, metrics_app};
use artistry::router::init_router;
use artistry::state::init_app_state;
use artistry_config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let server_config = ServerConfig::from_env()?;
    init_tracing(&server_config.log_dir).context("failed to initialise logging")?;

    if let Some(handle) = init_metrics()? {
        let addr = format!("0.0.0.0:{}", server_config.metrics_port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind metrics listener on {}", addr))?;
        info!("Metrics available at http://localhost:{}/metrics", server_config.metrics_port);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                error!(error = %e, "Metrics server stopped");
            }
        });
    }

    let state = init_app_state(&server_config).await?;
    let app = init_router(state);

    let addr = format!("0.0.0.0:{}", server_config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Server running on http://localhost:{}", server_config.port);
    info!("Swagger UI available at http://localhost:{}/swagger-ui", server_config.port);
    info!("Scalar UI available at http://localhost:{}/scalar", server_config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
