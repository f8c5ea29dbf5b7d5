pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

use crate::{auth::middleware::require_auth, state::AppState};
use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get},
    Router,
};

/// Tenant routes. Every handler here scopes storage to the caller.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/plans", get(handlers::list_plans).post(handlers::create_plan))
        .route("/plans/:id", delete(handlers::delete_plan))
        .route("/logs", get(handlers::list_logs).post(handlers::create_log))
        .route(
            "/exercises",
            get(handlers::list_exercises).post(handlers::create_exercise),
        )
        .route("/exercises/:id", delete(handlers::delete_exercise))
        .route(
            "/profile",
            get(handlers::get_profile).post(handlers::save_profile),
        )
        .route_layer(from_fn_with_state(state, require_auth))
}
