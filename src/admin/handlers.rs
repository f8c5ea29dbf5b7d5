use anyhow::Context;
use axum::{extract::State, http::StatusCode};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{AdminCreateUserRequest, AdminUpdateUserRequest};
use crate::{
    auth::{
        extractors::AdminUser,
        repo_types::UserPatch,
        services::{check_email, check_password, create_account, normalize_email},
        PublicUser,
    },
    error::{AppError, AppResult, Json, Path},
    ownership::Scope,
    state::AppState,
    workouts::{
        dto::{ExerciseRequest, PlanRequest},
        repo_types::{ExerciseDefinition, WorkoutPlan},
    },
};

async fn ensure_live_user(state: &AppState, id: Uuid) -> AppResult<()> {
    if state.users.find_by_id(id).await?.is_none() {
        return Err(AppError::validation("user not found"));
    }
    Ok(())
}

// --- users ---

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<PublicUser>>> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(payload): Json<AdminCreateUserRequest>,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    let user = create_account(
        &state,
        &payload.name,
        &payload.email,
        payload.password,
        payload.is_admin,
    )
    .await?;
    info!(admin_id = %admin.user().id, user_id = %user.id, is_admin = user.is_admin, "admin created user");
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> AppResult<Json<PublicUser>> {
    let mut patch = UserPatch {
        display_name: payload.name.map(|n| n.trim().to_string()),
        is_admin: payload.is_admin,
        ..Default::default()
    };
    if let Some(email) = payload.email {
        let email = normalize_email(&email);
        check_email(&email)?;
        patch.email = Some(email);
    }
    if let Some(password) = payload.password {
        check_password(&password, state.config.password.min_length)?;
        patch.password_hash = Some(state.hasher.hash_async(password).await?);
    }

    let Some(user) = state.users.update(id, patch).await? else {
        return Err(AppError::NotFound);
    };
    info!(admin_id = %admin.user().id, user_id = %user.id, "admin updated user");
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    if !state.users.soft_delete(id).await? {
        return Err(AppError::NotFound);
    }
    warn!(admin_id = %admin.user().id, user_id = %id, "admin deleted user");
    Ok(Json(json!({ "message": "user deleted" })))
}

// --- plans ---

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    admin: AdminUser,
) -> AppResult<Json<Vec<WorkoutPlan>>> {
    let plans = state.workouts.list_plans(Scope::admin(&admin)).await?;
    Ok(Json(plans))
}

#[instrument(skip(state, payload))]
pub async fn create_plan(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(payload): Json<PlanRequest>,
) -> AppResult<(StatusCode, Json<WorkoutPlan>)> {
    let owner = Scope::admin(&admin).write_owner(payload.user_id)?;
    ensure_live_user(&state, owner).await?;
    let plan = state.workouts.insert_plan(payload.into_plan(owner)?).await?;
    info!(admin_id = %admin.user().id, user_id = %owner, plan_id = %plan.id, "admin created plan");
    Ok((StatusCode::CREATED, Json(plan)))
}

#[instrument(skip(state))]
pub async fn delete_plan(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    if !state.workouts.delete_plan(Scope::admin(&admin), id).await? {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({ "message": "plan deleted" })))
}

// --- exercises ---

#[instrument(skip(state))]
pub async fn list_exercises(
    State(state): State<AppState>,
    admin: AdminUser,
) -> AppResult<Json<Vec<ExerciseDefinition>>> {
    let items = state.workouts.list_exercises(Scope::admin(&admin)).await?;
    Ok(Json(items))
}

#[instrument(skip(state, payload))]
pub async fn create_exercise(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(payload): Json<ExerciseRequest>,
) -> AppResult<(StatusCode, Json<ExerciseDefinition>)> {
    let owner = Scope::admin(&admin).exercise_owner(payload.user_id, payload.is_global)?;
    if let Some(owner) = owner {
        ensure_live_user(&state, owner).await?;
    }
    let exercise = payload.into_exercise(owner)?;
    let mut saved = state.workouts.insert_exercises(vec![exercise]).await?;
    let saved = saved.pop().context("insert returned no exercise")?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Uploads a batch of global exercises in one transaction.
#[instrument(skip(state, payload))]
pub async fn bulk_exercises(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(payload): Json<Vec<ExerciseRequest>>,
) -> AppResult<(StatusCode, Json<Value>)> {
    if payload.is_empty() {
        return Err(AppError::validation("no exercises provided"));
    }
    let scope = Scope::admin(&admin);
    let items = payload
        .into_iter()
        .map(|req| {
            let owner = scope.exercise_owner(None, true)?;
            req.into_exercise(owner)
        })
        .collect::<AppResult<Vec<_>>>()?;

    let saved = state.workouts.insert_exercises(items).await?;
    info!(admin_id = %admin.user().id, count = saved.len(), "global exercises uploaded");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "global exercises uploaded",
            "count": saved.len(),
            "data": saved,
        })),
    ))
}

#[instrument(skip(state))]
pub async fn delete_exercise(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    if !state.workouts.delete_exercise(Scope::admin(&admin), id).await? {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({ "message": "exercise deleted" })))
}
