use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::repo_types::{
    ExerciseDefinition, LogRow, PlanRow, UserProfile, WorkoutLog, WorkoutPlan,
};
use crate::ownership::Scope;

/// Storage for tenant-owned workout data.
///
/// Reads and deletes take a [`Scope`] and must apply its owner predicate; inserts take records
/// whose owner was already bound from a scope.
#[async_trait]
pub trait WorkoutStore: Send + Sync {
    async fn list_plans(&self, scope: Scope) -> anyhow::Result<Vec<WorkoutPlan>>;
    async fn insert_plan(&self, plan: WorkoutPlan) -> anyhow::Result<WorkoutPlan>;
    async fn delete_plan(&self, scope: Scope, id: Uuid) -> anyhow::Result<bool>;

    async fn list_logs(&self, scope: Scope) -> anyhow::Result<Vec<WorkoutLog>>;
    async fn insert_log(&self, log: WorkoutLog) -> anyhow::Result<WorkoutLog>;

    /// Tenant scopes also see global rows.
    async fn list_exercises(&self, scope: Scope) -> anyhow::Result<Vec<ExerciseDefinition>>;
    async fn insert_exercises(
        &self,
        items: Vec<ExerciseDefinition>,
    ) -> anyhow::Result<Vec<ExerciseDefinition>>;
    /// Global rows have no owner, so only an admin scope can delete them.
    async fn delete_exercise(&self, scope: Scope, id: Uuid) -> anyhow::Result<bool>;

    async fn get_profile(&self, owner: Uuid) -> anyhow::Result<Option<UserProfile>>;
    async fn save_profile(&self, profile: UserProfile) -> anyhow::Result<UserProfile>;
}

#[derive(Clone)]
pub struct PgWorkoutStore {
    db: PgPool,
}

impl PgWorkoutStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WorkoutStore for PgWorkoutStore {
    async fn list_plans(&self, scope: Scope) -> anyhow::Result<Vec<WorkoutPlan>> {
        let rows = sqlx::query_as::<_, PlanRow>(
            r#"
            SELECT id, user_id, name, description, target_goal, is_ai_generated, exercises, created_at
              FROM workout_plans
             WHERE ($1::uuid IS NULL OR user_id = $1)
             ORDER BY created_at DESC
            "#,
        )
        .bind(scope.tenant_id())
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(WorkoutPlan::from).collect())
    }

    async fn insert_plan(&self, plan: WorkoutPlan) -> anyhow::Result<WorkoutPlan> {
        let row = sqlx::query_as::<_, PlanRow>(
            r#"
            INSERT INTO workout_plans
                (id, user_id, name, description, target_goal, is_ai_generated, exercises, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, name, description, target_goal, is_ai_generated, exercises, created_at
            "#,
        )
        .bind(plan.id)
        .bind(plan.user_id)
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(&plan.target_goal)
        .bind(plan.is_ai_generated)
        .bind(Json(&plan.exercises))
        .bind(plan.created_at)
        .fetch_one(&self.db)
        .await?;
        Ok(row.into())
    }

    async fn delete_plan(&self, scope: Scope, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            "DELETE FROM workout_plans WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)",
        )
        .bind(id)
        .bind(scope.tenant_id())
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_logs(&self, scope: Scope) -> anyhow::Result<Vec<WorkoutLog>> {
        let rows = sqlx::query_as::<_, LogRow>(
            r#"
            SELECT id, user_id, performed_at, duration_minutes, plan_name, exercises
              FROM workout_logs
             WHERE ($1::uuid IS NULL OR user_id = $1)
             ORDER BY performed_at DESC
            "#,
        )
        .bind(scope.tenant_id())
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(WorkoutLog::from).collect())
    }

    async fn insert_log(&self, log: WorkoutLog) -> anyhow::Result<WorkoutLog> {
        let row = sqlx::query_as::<_, LogRow>(
            r#"
            INSERT INTO workout_logs (id, user_id, performed_at, duration_minutes, plan_name, exercises)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, performed_at, duration_minutes, plan_name, exercises
            "#,
        )
        .bind(log.id)
        .bind(log.user_id)
        .bind(log.date)
        .bind(log.duration_minutes)
        .bind(&log.plan_name)
        .bind(Json(&log.exercises))
        .fetch_one(&self.db)
        .await?;
        Ok(row.into())
    }

    async fn list_exercises(&self, scope: Scope) -> anyhow::Result<Vec<ExerciseDefinition>> {
        let rows = sqlx::query_as::<_, ExerciseDefinition>(
            r#"
            SELECT id, user_id, is_global, name, muscle_group, instructions
              FROM exercise_definitions
             WHERE ($1::uuid IS NULL OR is_global OR user_id = $1)
             ORDER BY name ASC
            "#,
        )
        .bind(scope.tenant_id())
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn insert_exercises(
        &self,
        items: Vec<ExerciseDefinition>,
    ) -> anyhow::Result<Vec<ExerciseDefinition>> {
        let mut tx = self.db.begin().await?;
        let mut out = Vec::with_capacity(items.len());
        for ex in items {
            let row = sqlx::query_as::<_, ExerciseDefinition>(
                r#"
                INSERT INTO exercise_definitions (id, user_id, is_global, name, muscle_group, instructions)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, user_id, is_global, name, muscle_group, instructions
                "#,
            )
            .bind(ex.id)
            .bind(ex.user_id)
            .bind(ex.is_global)
            .bind(&ex.name)
            .bind(&ex.muscle_group)
            .bind(&ex.instructions)
            .fetch_one(&mut *tx)
            .await?;
            out.push(row);
        }
        tx.commit().await?;
        Ok(out)
    }

    async fn delete_exercise(&self, scope: Scope, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            "DELETE FROM exercise_definitions WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)",
        )
        .bind(id)
        .bind(scope.tenant_id())
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn get_profile(&self, owner: Uuid) -> anyhow::Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT user_id, gender, age, height, weight, main_goal, workout_duration,
                   experience_level, weight_unit, updated_at
              FROM user_profiles
             WHERE user_id = $1
            "#,
        )
        .bind(owner)
        .fetch_optional(&self.db)
        .await?;
        Ok(profile)
    }

    async fn save_profile(&self, p: UserProfile) -> anyhow::Result<UserProfile> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles
                (user_id, gender, age, height, weight, main_goal, workout_duration,
                 experience_level, weight_unit, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (user_id) DO UPDATE
               SET gender = EXCLUDED.gender,
                   age = EXCLUDED.age,
                   height = EXCLUDED.height,
                   weight = EXCLUDED.weight,
                   main_goal = EXCLUDED.main_goal,
                   workout_duration = EXCLUDED.workout_duration,
                   experience_level = EXCLUDED.experience_level,
                   weight_unit = EXCLUDED.weight_unit,
                   updated_at = EXCLUDED.updated_at
            RETURNING user_id, gender, age, height, weight, main_goal, workout_duration,
                      experience_level, weight_unit, updated_at
            "#,
        )
        .bind(p.user_id)
        .bind(&p.gender)
        .bind(&p.age)
        .bind(&p.height)
        .bind(&p.weight)
        .bind(&p.main_goal)
        .bind(&p.workout_duration)
        .bind(&p.experience_level)
        .bind(&p.weight_unit)
        .bind(p.updated_at)
        .fetch_one(&self.db)
        .await?;
        Ok(profile)
    }
}
