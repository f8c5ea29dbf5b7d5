use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanExercise {
    pub name: String,
    #[serde(default)]
    pub default_sets: i32,
    #[serde(default)]
    pub default_reps: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub target_goal: String,
    pub is_ai_generated: bool,
    pub exercises: Vec<PlanExercise>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct PlanRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub target_goal: String,
    pub is_ai_generated: bool,
    pub exercises: Json<Vec<PlanExercise>>,
    pub created_at: OffsetDateTime,
}

impl From<PlanRow> for WorkoutPlan {
    fn from(r: PlanRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            description: r.description,
            target_goal: r.target_goal,
            is_ai_generated: r.is_ai_generated,
            exercises: r.exercises.0,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogSet {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub reps: i32,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogExercise {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default)]
    pub sets: Vec<LogSet>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLog {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub duration_minutes: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
    pub exercises: Vec<LogExercise>,
}

#[derive(Debug, FromRow)]
pub struct LogRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub performed_at: OffsetDateTime,
    pub duration_minutes: i32,
    pub plan_name: Option<String>,
    pub exercises: Json<Vec<LogExercise>>,
}

impl From<LogRow> for WorkoutLog {
    fn from(r: LogRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            date: r.performed_at,
            duration_minutes: r.duration_minutes,
            plan_name: r.plan_name,
            exercises: r.exercises.0,
        }
    }
}

/// `user_id` is `None` only for global rows.
#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDefinition {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub is_global: bool,
    pub name: String,
    pub muscle_group: String,
    pub instructions: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: Uuid,
    pub gender: String,
    pub age: String,
    pub height: String,
    pub weight: String,
    pub main_goal: String,
    pub workout_duration: String,
    pub experience_level: String,
    pub weight_unit: String,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
