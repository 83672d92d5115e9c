use axum::{Router, extract::State, routing::get};
use tracing::instrument;

use artistry_core::{ApiResponse, AppError};

use crate::state::AppState;

pub fn init_health_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Server is running", body = String)
    ),
    tag = "Health"
)]
pub async fn root() -> &'static str {
    "Artistry Academia server is running"
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Store reachable"),
        (status = 500, description = "Store unreachable")
    ),
    tag = "Health"
)]
#[instrument(skip(state))]
pub async fn health(State(state): State<AppState>) -> Result<ApiResponse<()>, AppError> {
    state.store.ping().await?;

    Ok(ApiResponse::message("Healthy"))
}
