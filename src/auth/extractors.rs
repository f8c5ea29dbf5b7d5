use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::claims::CurrentUser;
use crate::error::AppError;

/// Reads the identity bound by [`require_auth`](super::middleware::require_auth).
///
/// A handler mounted without the gate has no identity and gets a 401 rather than running
/// unauthenticated.
#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}

/// An identity whose verified token carries the admin role.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(CurrentUser);

impl AdminUser {
    pub fn user(&self) -> &CurrentUser {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<CurrentUser>() {
            Some(user) if user.is_admin => Ok(AdminUser(*user)),
            _ => Err(AppError::Forbidden),
        }
    }
}

#[cfg(test)]
impl AdminUser {
    pub(crate) fn for_tests(user: CurrentUser) -> Self {
        assert!(user.is_admin);
        AdminUser(user)
    }
}
