use axum::{extract::State, http::StatusCode};
use tracing::{instrument, warn};

use crate::{
    auth::{
        claims::CurrentUser,
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        services,
    },
    error::{AppError, AppResult, Json},
    state::AppState,
};

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let session = services::register(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let session = services::login(&state, payload).await?;
    Ok(Json(session))
}

/// Identity comes from the verified token only.
#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<PublicUser>> {
    let Some(user) = state.users.find_by_id(current.id).await? else {
        warn!(user_id = %current.id, "token subject no longer exists");
        return Err(AppError::Unauthorized);
    };
    Ok(Json(PublicUser::from(user)))
}
