use axum::{
    Router,
    routing::{delete, get},
};

use crate::state::AppState;

use super::controller::{list_selections, remove_selection, select_course};

/// Mount behind `require_student`.
pub fn init_selections_router() -> Router<AppState> {
    Router::new()
        .route("/select-class", get(list_selections).post(select_course))
        .route("/select-class/{id}", delete(remove_selection))
}
