use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{
    ExerciseDefinition, LogExercise, PlanExercise, UserProfile, WorkoutLog, WorkoutPlan,
};
use crate::error::{AppError, AppResult};

fn required(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Body of plan creation. `userId` is honoured on the admin path only.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub target_goal: String,
    #[serde(default)]
    pub is_ai_generated: bool,
    #[serde(default)]
    pub exercises: Vec<PlanExercise>,
}

impl PlanRequest {
    pub fn into_plan(self, owner: Uuid) -> AppResult<WorkoutPlan> {
        let name = required("name", &self.name)?;
        for ex in &self.exercises {
            required("exercise name", &ex.name)?;
            if ex.default_sets < 0 || ex.default_reps < 0 {
                return Err(AppError::validation("sets and reps must not be negative"));
            }
        }
        Ok(WorkoutPlan {
            id: Uuid::new_v4(),
            user_id: owner,
            name,
            description: self.description,
            target_goal: self.target_goal,
            is_ai_generated: self.is_ai_generated,
            exercises: self.exercises,
            created_at: OffsetDateTime::now_utc(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRequest {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    #[serde(default)]
    pub duration_minutes: i32,
    #[serde(default)]
    pub plan_name: Option<String>,
    #[serde(default)]
    pub exercises: Vec<LogExercise>,
}

impl LogRequest {
    pub fn into_log(self, owner: Uuid) -> AppResult<WorkoutLog> {
        if self.duration_minutes < 0 {
            return Err(AppError::validation("durationMinutes must not be negative"));
        }
        for ex in &self.exercises {
            required("exercise name", &ex.name)?;
            if ex.sets.iter().any(|s| s.reps < 0 || s.weight < 0.0) {
                return Err(AppError::validation("reps and weight must not be negative"));
            }
        }
        Ok(WorkoutLog {
            id: Uuid::new_v4(),
            user_id: owner,
            date: self.date.unwrap_or_else(OffsetDateTime::now_utc),
            duration_minutes: self.duration_minutes,
            plan_name: self.plan_name.filter(|n| !n.trim().is_empty()),
            exercises: self.exercises,
        })
    }
}

/// Body of exercise creation. `userId` and `isGlobal` are honoured on the admin path only.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRequest {
    pub name: String,
    #[serde(default)]
    pub muscle_group: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub is_global: bool,
}

impl ExerciseRequest {
    /// `owner` comes from the ownership scope; `None` makes the row global.
    pub fn into_exercise(self, owner: Option<Uuid>) -> AppResult<ExerciseDefinition> {
        Ok(ExerciseDefinition {
            id: Uuid::new_v4(),
            user_id: owner,
            is_global: owner.is_none(),
            name: required("name", &self.name)?,
            muscle_group: self.muscle_group.trim().to_string(),
            instructions: self.instructions,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileRequest {
    pub gender: String,
    pub age: String,
    pub height: String,
    pub weight: String,
    pub main_goal: String,
    pub workout_duration: String,
    pub experience_level: String,
    pub weight_unit: String,
}

impl ProfileRequest {
    pub fn into_profile(self, owner: Uuid) -> AppResult<UserProfile> {
        if !matches!(self.weight_unit.as_str(), "" | "kg" | "lbs") {
            return Err(AppError::validation("weightUnit must be kg or lbs"));
        }
        Ok(UserProfile {
            user_id: owner,
            gender: self.gender,
            age: self.age,
            height: self.height,
            weight: self.weight,
            main_goal: self.main_goal,
            workout_duration: self.workout_duration,
            experience_level: self.experience_level,
            weight_unit: self.weight_unit,
            updated_at: OffsetDateTime::now_utc(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_name_is_required() {
        let req: PlanRequest = serde_json::from_value(serde_json::json!({
            "name": "  ",
            "exercises": []
        }))
        .unwrap();
        assert!(matches!(req.into_plan(Uuid::new_v4()), Err(AppError::Validation(_))));
    }

    #[test]
    fn plan_owner_is_the_one_passed_in() {
        let client_claimed = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let req: PlanRequest = serde_json::from_value(serde_json::json!({
            "userId": client_claimed,
            "name": "Push day",
            "exercises": [{"name": "Bench", "defaultSets": 3, "defaultReps": 8}]
        }))
        .unwrap();
        let plan = req.into_plan(owner).unwrap();
        assert_eq!(plan.user_id, owner);
        assert_eq!(plan.exercises[0].default_sets, 3);
    }

    #[test]
    fn log_defaults_date_and_rejects_negative_sets() {
        let req: LogRequest = serde_json::from_value(serde_json::json!({
            "durationMinutes": 45,
            "exercises": [{"name": "Squat", "sets": [{"weight": 100.0, "reps": 5, "completed": true}]}]
        }))
        .unwrap();
        let log = req.into_log(Uuid::new_v4()).unwrap();
        assert_eq!(log.duration_minutes, 45);
        assert_eq!(log.exercises[0].sets.len(), 1);

        let bad: LogRequest = serde_json::from_value(serde_json::json!({
            "exercises": [{"name": "Squat", "sets": [{"reps": -1}]}]
        }))
        .unwrap();
        assert!(bad.into_log(Uuid::new_v4()).is_err());
    }

    #[test]
    fn exercise_without_owner_is_global() {
        let req = ExerciseRequest {
            name: "Plank".into(),
            muscle_group: "Core".into(),
            instructions: String::new(),
            user_id: None,
            is_global: true,
        };
        let ex = req.clone().into_exercise(None).unwrap();
        assert!(ex.is_global);
        assert_eq!(ex.user_id, None);

        let owner = Uuid::new_v4();
        let ex = req.into_exercise(Some(owner)).unwrap();
        assert!(!ex.is_global);
        assert_eq!(ex.user_id, Some(owner));
    }

    #[test]
    fn profile_weight_unit_is_checked() {
        let req = ProfileRequest {
            weight_unit: "stone".into(),
            ..Default::default()
        };
        assert!(req.into_profile(Uuid::new_v4()).is_err());
    }
}
