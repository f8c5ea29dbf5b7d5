use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use super::{claims::CurrentUser, jwt::JwtKeys};
use crate::error::AppError;

/// Pulls the token out of `Authorization: Bearer <token>`; the scheme is case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Authentication gate. Every failure is the same 401; only the log says which check failed.
pub async fn require_auth(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !req.headers().contains_key(header::AUTHORIZATION) {
        debug!(uri = %req.uri(), "missing Authorization header");
        return Err(AppError::Unauthorized);
    }

    let Some(token) = bearer_token(req.headers()) else {
        debug!(uri = %req.uri(), "unrecognised Authorization scheme");
        return Err(AppError::Unauthorized);
    };

    let claims = match keys.verify(token) {
        Ok(c) => c,
        Err(reason) => {
            warn!(%reason, uri = %req.uri(), "token rejected");
            return Err(AppError::Unauthorized);
        }
    };

    req.extensions_mut().insert(CurrentUser::from(&claims));
    Ok(next.run(req).await)
}

/// Authorization gate. Must be layered inside `require_auth`; with no identity bound it
/// refuses.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    match req.extensions().get::<CurrentUser>() {
        Some(user) if user.is_admin => Ok(next.run(req).await),
        Some(user) => {
            warn!(user_id = %user.id, uri = %req.uri(), "admin route denied");
            Err(AppError::Forbidden)
        }
        None => {
            warn!(uri = %req.uri(), "admin gate reached without identity");
            Err(AppError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn bearer_scheme_is_parsed() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("BEARER   abc  ")), Some("abc"));
    }

    #[test]
    fn other_schemes_are_refused() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("abc.def.ghi")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
