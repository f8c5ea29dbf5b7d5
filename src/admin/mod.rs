mod dto;
pub mod handlers;

use crate::{
    auth::middleware::{require_admin, require_auth},
    state::AppState,
};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};

/// Cross-tenant routes. Reachable only through both gates; `require_auth` is the outer layer.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/users/:id",
            put(handlers::update_user).delete(handlers::delete_user),
        )
        .route("/plans", get(handlers::list_plans).post(handlers::create_plan))
        .route("/plans/:id", delete(handlers::delete_plan))
        .route(
            "/exercises",
            get(handlers::list_exercises).post(handlers::create_exercise),
        )
        .route("/exercises/bulk", post(handlers::bulk_exercises))
        .route("/exercises/:id", delete(handlers::delete_exercise))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, require_auth))
}
