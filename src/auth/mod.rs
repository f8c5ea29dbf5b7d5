use crate::state::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

pub mod claims;
mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use dto::PublicUser;

/// Register/login are public; `/me` sits behind the authentication gate.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login));

    let protected = Router::new()
        .route("/me", get(handlers::get_me))
        .route_layer(from_fn_with_state(state, middleware::require_auth));

    public.merge(protected)
}
