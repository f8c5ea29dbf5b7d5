//! Row-level ownership rules applied by every store call on tenant data.
//!
//! A [`Scope`] is the only way handlers talk to the workout store. A tenant scope comes from
//! the verified [`CurrentUser`]; an admin-wide scope can only be built from an [`AdminUser`],
//! which in turn only exists after the admin gate has accepted the token.

use uuid::Uuid;

use crate::{
    auth::{claims::CurrentUser, extractors::AdminUser},
    error::{AppError, AppResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    tenant: Option<Uuid>,
}

impl Scope {
    /// Always bound to the caller, even when the caller is an admin.
    pub fn tenant(user: &CurrentUser) -> Self {
        Self {
            tenant: Some(user.id),
        }
    }

    pub fn admin(_admin: &AdminUser) -> Self {
        Self { tenant: None }
    }

    /// Value for the SQL predicate `($n::uuid IS NULL OR user_id = $n)`.
    pub fn tenant_id(&self) -> Option<Uuid> {
        self.tenant
    }

    /// May this scope modify or delete a row owned by `owner`?
    pub fn owns(&self, owner: Option<Uuid>) -> bool {
        match self.tenant {
            None => true,
            Some(me) => owner == Some(me),
        }
    }

    /// Reads also see rows explicitly marked shared.
    pub fn can_read(&self, owner: Option<Uuid>, shared: bool) -> bool {
        shared || self.owns(owner)
    }

    /// Owner to bind on insert. A tenant always writes as itself and any client-supplied
    /// owner is dropped; an admin must name the owner.
    pub fn write_owner(&self, requested: Option<Uuid>) -> AppResult<Uuid> {
        match self.tenant {
            Some(me) => Ok(me),
            None => requested.ok_or_else(|| AppError::validation("userId is required")),
        }
    }

    /// Like [`Scope::write_owner`], but an admin may create unowned global rows.
    pub fn exercise_owner(&self, requested: Option<Uuid>, global: bool) -> AppResult<Option<Uuid>> {
        match self.tenant {
            Some(me) => Ok(Some(me)),
            None if global => Ok(None),
            None => requested
                .map(Some)
                .ok_or_else(|| AppError::validation("userId is required for non-global exercises")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            is_admin,
        }
    }

    #[test]
    fn tenant_owns_only_its_rows() {
        let a = user(false);
        let b = user(false);
        let scope = Scope::tenant(&a);
        assert!(scope.owns(Some(a.id)));
        assert!(!scope.owns(Some(b.id)));
        assert!(!scope.owns(None));
        assert_eq!(scope.tenant_id(), Some(a.id));
    }

    #[test]
    fn tenant_reads_shared_rows_but_cannot_own_them() {
        let a = user(false);
        let scope = Scope::tenant(&a);
        assert!(scope.can_read(None, true));
        assert!(!scope.can_read(None, false));
        assert!(!scope.owns(None));
    }

    #[test]
    fn admin_role_does_not_widen_tenant_scope() {
        let admin = user(true);
        let scope = Scope::tenant(&admin);
        assert_eq!(scope.tenant_id(), Some(admin.id));
        assert!(!scope.owns(Some(Uuid::new_v4())));
    }

    #[test]
    fn admin_scope_sees_everything() {
        let admin = AdminUser::for_tests(user(true));
        let scope = Scope::admin(&admin);
        assert!(scope.owns(Some(Uuid::new_v4())));
        assert!(scope.owns(None));
        assert_eq!(scope.tenant_id(), None);
    }

    #[test]
    fn tenant_writes_ignore_client_owner() {
        let a = user(false);
        let scope = Scope::tenant(&a);
        let victim = Uuid::new_v4();
        assert_eq!(scope.write_owner(Some(victim)).unwrap(), a.id);
        assert_eq!(scope.exercise_owner(Some(victim), true).unwrap(), Some(a.id));
    }

    #[test]
    fn admin_writes_need_explicit_owner() {
        let scope = Scope::admin(&AdminUser::for_tests(user(true)));
        let target = Uuid::new_v4();
        assert_eq!(scope.write_owner(Some(target)).unwrap(), target);
        assert!(matches!(scope.write_owner(None), Err(AppError::Validation(_))));
        assert_eq!(scope.exercise_owner(None, true).unwrap(), None);
        assert_eq!(scope.exercise_owner(Some(target), false).unwrap(), Some(target));
        assert!(scope.exercise_owner(None, false).is_err());
    }
}
