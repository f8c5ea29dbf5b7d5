use anyhow::Context;
use axum::{extract::State, http::StatusCode};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{ExerciseRequest, LogRequest, PlanRequest, ProfileRequest},
    repo_types::{ExerciseDefinition, UserProfile, WorkoutLog, WorkoutPlan},
};
use crate::{
    auth::claims::CurrentUser,
    error::{AppError, AppResult, Json, Path},
    ownership::Scope,
    state::AppState,
};

// --- plans ---

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<WorkoutPlan>>> {
    let plans = state.workouts.list_plans(Scope::tenant(&user)).await?;
    Ok(Json(plans))
}

#[instrument(skip(state, payload))]
pub async fn create_plan(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<PlanRequest>,
) -> AppResult<(StatusCode, Json<WorkoutPlan>)> {
    let owner = Scope::tenant(&user).write_owner(payload.user_id)?;
    let plan = state.workouts.insert_plan(payload.into_plan(owner)?).await?;
    info!(user_id = %owner, plan_id = %plan.id, "plan created");
    Ok((StatusCode::CREATED, Json(plan)))
}

#[instrument(skip(state))]
pub async fn delete_plan(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    if !state.workouts.delete_plan(Scope::tenant(&user), id).await? {
        return Err(AppError::NotFound);
    }
    info!(user_id = %user.id, plan_id = %id, "plan deleted");
    Ok(Json(json!({ "message": "plan deleted" })))
}

// --- logs ---

#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<WorkoutLog>>> {
    let logs = state.workouts.list_logs(Scope::tenant(&user)).await?;
    Ok(Json(logs))
}

#[instrument(skip(state, payload))]
pub async fn create_log(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<LogRequest>,
) -> AppResult<(StatusCode, Json<WorkoutLog>)> {
    let owner = Scope::tenant(&user).write_owner(None)?;
    let log = state.workouts.insert_log(payload.into_log(owner)?).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

// --- exercises ---

#[instrument(skip(state))]
pub async fn list_exercises(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<ExerciseDefinition>>> {
    let items = state.workouts.list_exercises(Scope::tenant(&user)).await?;
    Ok(Json(items))
}

#[instrument(skip(state, payload))]
pub async fn create_exercise(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ExerciseRequest>,
) -> AppResult<(StatusCode, Json<ExerciseDefinition>)> {
    let owner = Scope::tenant(&user).exercise_owner(payload.user_id, payload.is_global)?;
    let exercise = payload.into_exercise(owner)?;
    let mut saved = state.workouts.insert_exercises(vec![exercise]).await?;
    let saved = saved.pop().context("insert returned no exercise")?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[instrument(skip(state))]
pub async fn delete_exercise(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    if !state.workouts.delete_exercise(Scope::tenant(&user), id).await? {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({ "message": "exercise deleted" })))
}

// --- profile ---

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Value>> {
    let body = match state.workouts.get_profile(user.id).await? {
        Some(profile) => serde_json::to_value(profile).context("serialize profile")?,
        None => json!({}),
    };
    Ok(Json(body))
}

#[instrument(skip(state, payload))]
pub async fn save_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ProfileRequest>,
) -> AppResult<Json<UserProfile>> {
    let owner = Scope::tenant(&user).write_owner(None)?;
    let profile = state.workouts.save_profile(payload.into_profile(owner)?).await?;
    Ok(Json(profile))
}
