//! In-process stores backing `AppState::fake()`.

use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::{
    repo::{UserStore, UserWriteError},
    repo_types::{NewUser, User, UserPatch},
};
use crate::ownership::Scope;
use crate::workouts::{
    repo::WorkoutStore,
    repo_types::{ExerciseDefinition, UserProfile, WorkoutLog, WorkoutPlan},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    plans: Vec<WorkoutPlan>,
    logs: Vec<WorkoutLog>,
    exercises: Vec<ExerciseDefinition>,
    profiles: Vec<UserProfile>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

impl MemoryStore {
    fn tables(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Tables>> {
        self.inner
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store poisoned"))
    }
}

fn email_taken(users: &[User], email: &str, except: Option<Uuid>) -> bool {
    users
        .iter()
        .any(|u| u.deleted_at.is_none() && u.email == email && Some(u.id) != except)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let t = self.tables()?;
        Ok(t.users
            .iter()
            .find(|u| u.deleted_at.is_none() && u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let t = self.tables()?;
        Ok(t.users
            .iter()
            .find(|u| u.deleted_at.is_none() && u.id == id)
            .cloned())
    }

    async fn create(&self, new: NewUser) -> Result<User, UserWriteError> {
        // Check and insert under one lock, like the unique index does.
        let mut t = self.tables()?;
        if email_taken(&t.users, &new.email, None) {
            return Err(UserWriteError::EmailTaken);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: new.password_hash,
            display_name: new.display_name,
            is_admin: new.is_admin,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let t = self.tables()?;
        let mut users: Vec<User> = t
            .users
            .iter()
            .filter(|u| u.deleted_at.is_none())
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, UserWriteError> {
        let mut t = self.tables()?;
        if let Some(email) = &patch.email {
            if email_taken(&t.users, email, Some(id)) {
                return Err(UserWriteError::EmailTaken);
            }
        }
        let Some(user) = t
            .users
            .iter_mut()
            .find(|u| u.deleted_at.is_none() && u.id == id)
        else {
            return Ok(None);
        };
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(hash) = patch.password_hash {
            user.password_hash = hash;
        }
        if let Some(name) = patch.display_name {
            user.display_name = name;
        }
        if let Some(is_admin) = patch.is_admin {
            user.is_admin = is_admin;
        }
        user.updated_at = OffsetDateTime::now_utc();
        Ok(Some(user.clone()))
    }

    async fn soft_delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables()?;
        match t
            .users
            .iter_mut()
            .find(|u| u.deleted_at.is_none() && u.id == id)
        {
            Some(user) => {
                let now = OffsetDateTime::now_utc();
                user.deleted_at = Some(now);
                user.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl WorkoutStore for MemoryStore {
    async fn list_plans(&self, scope: Scope) -> anyhow::Result<Vec<WorkoutPlan>> {
        let t = self.tables()?;
        let mut plans: Vec<WorkoutPlan> = t
            .plans
            .iter()
            .filter(|p| scope.owns(Some(p.user_id)))
            .cloned()
            .collect();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(plans)
    }

    async fn insert_plan(&self, plan: WorkoutPlan) -> anyhow::Result<WorkoutPlan> {
        self.tables()?.plans.push(plan.clone());
        Ok(plan)
    }

    async fn delete_plan(&self, scope: Scope, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables()?;
        let before = t.plans.len();
        t.plans
            .retain(|p| !(p.id == id && scope.owns(Some(p.user_id))));
        Ok(t.plans.len() < before)
    }

    async fn list_logs(&self, scope: Scope) -> anyhow::Result<Vec<WorkoutLog>> {
        let t = self.tables()?;
        let mut logs: Vec<WorkoutLog> = t
            .logs
            .iter()
            .filter(|l| scope.owns(Some(l.user_id)))
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(logs)
    }

    async fn insert_log(&self, log: WorkoutLog) -> anyhow::Result<WorkoutLog> {
        self.tables()?.logs.push(log.clone());
        Ok(log)
    }

    async fn list_exercises(&self, scope: Scope) -> anyhow::Result<Vec<ExerciseDefinition>> {
        let t = self.tables()?;
        let mut items: Vec<ExerciseDefinition> = t
            .exercises
            .iter()
            .filter(|e| scope.can_read(e.user_id, e.is_global))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn insert_exercises(
        &self,
        items: Vec<ExerciseDefinition>,
    ) -> anyhow::Result<Vec<ExerciseDefinition>> {
        self.tables()?.exercises.extend(items.iter().cloned());
        Ok(items)
    }

    async fn delete_exercise(&self, scope: Scope, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables()?;
        let before = t.exercises.len();
        t.exercises
            .retain(|e| !(e.id == id && scope.owns(e.user_id)));
        Ok(t.exercises.len() < before)
    }

    async fn get_profile(&self, owner: Uuid) -> anyhow::Result<Option<UserProfile>> {
        let t = self.tables()?;
        Ok(t.profiles.iter().find(|p| p.user_id == owner).cloned())
    }

    async fn save_profile(&self, profile: UserProfile) -> anyhow::Result<UserProfile> {
        let mut t = self.tables()?;
        t.profiles.retain(|p| p.user_id != profile.user_id);
        t.profiles.push(profile.clone());
        Ok(profile)
    }
}
