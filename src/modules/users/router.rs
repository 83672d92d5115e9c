use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    check_admin, check_instructor, delete_user, get_user, list_instructors, list_users,
    make_admin, make_instructor, upsert_user,
};

/// `{user}` is an email on GET/PUT and an identity id on PATCH/DELETE.
pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/instructors", get(list_instructors))
        .route(
            "/users/{user}",
            get(get_user).put(upsert_user).delete(delete_user),
        )
        .route("/users/admin/{user}", get(check_admin).patch(make_admin))
        .route(
            "/users/instructor/{user}",
            get(check_instructor).patch(make_instructor),
        )
}
