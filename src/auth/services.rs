use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        repo_types::{NewUser, User},
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Shared by self-registration and admin account management.
pub(crate) fn check_email(email: &str) -> AppResult<()> {
    if !is_valid_email(email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("invalid email"));
    }
    Ok(())
}

pub(crate) fn check_password(password: &str, min_length: usize) -> AppResult<()> {
    if password.chars().count() < min_length {
        warn!("password too short");
        return Err(AppError::Validation(format!(
            "password must be at least {min_length} characters"
        )));
    }
    Ok(())
}

/// Validates, hashes and stores a new identity. Uniqueness is left to the store.
pub async fn create_account(
    state: &AppState,
    name: &str,
    email: &str,
    password: String,
    is_admin: bool,
) -> AppResult<User> {
    let email = normalize_email(email);
    check_email(&email)?;
    check_password(&password, state.config.password.min_length)?;

    let password_hash = state.hasher.hash_async(password).await?;
    let user = state
        .users
        .create(NewUser {
            email,
            password_hash,
            display_name: name.trim().to_string(),
            is_admin,
        })
        .await?;
    Ok(user)
}

fn session_for(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let token = state.keys.issue(user.id, user.is_admin)?;
    Ok(AuthResponse {
        token,
        user: PublicUser::from(user),
    })
}

pub async fn register(state: &AppState, req: RegisterRequest) -> AppResult<AuthResponse> {
    let user = create_account(state, &req.name, &req.email, req.password, false).await?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    session_for(state, user)
}

/// Unknown account and wrong password produce the same error.
pub async fn login(state: &AppState, req: LoginRequest) -> AppResult<AuthResponse> {
    let email = normalize_email(&req.email);

    let Some(user) = state.users.find_by_email(&email).await? else {
        state.hasher.verify_decoy(req.password).await;
        warn!(email = %email, "login unknown email");
        return Err(AppError::Unauthorized);
    };

    let ok = match state
        .hasher
        .verify_async(req.password, user.password_hash.clone())
        .await
    {
        Ok(ok) => ok,
        Err(e) => {
            error!(user_id = %user.id, error = %e, "stored password digest unusable");
            false
        }
    };
    if !ok {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized);
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    session_for(state, user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("two@@x.com"));
        assert!(!is_valid_email("sp ace@x.com"));
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
    }

    #[test]
    fn password_minimum_counts_characters() {
        assert!(check_password("secret1", 6).is_ok());
        assert!(check_password("short", 6).is_err());
        assert!(check_password("ääääää", 6).is_ok());
    }

    #[tokio::test]
    async fn register_then_login_yields_verifiable_token() {
        let state = AppState::fake();
        let registered = register(
            &state,
            RegisterRequest {
                name: "A".into(),
                email: "A@x.com".into(),
                password: "secret1".into(),
            },
        )
        .await
        .expect("register");
        assert_eq!(registered.user.email, "a@x.com");

        let session = login(
            &state,
            LoginRequest {
                email: "a@x.com".into(),
                password: "secret1".into(),
            },
        )
        .await
        .expect("login");
        let claims = state.keys.verify(&session.token).expect("token verifies");
        assert_eq!(claims.sub, registered.user.id);
        assert!(!claims.is_admin);
    }

    #[tokio::test]
    async fn unknown_account_and_bad_password_look_the_same() {
        let state = AppState::fake();
        register(
            &state,
            RegisterRequest {
                name: String::new(),
                email: "a@x.com".into(),
                password: "secret1".into(),
            },
        )
        .await
        .expect("register");

        let wrong = login(
            &state,
            LoginRequest {
                email: "a@x.com".into(),
                password: "wrong".into(),
            },
        )
        .await
        .unwrap_err();
        let missing = login(
            &state,
            LoginRequest {
                email: "nobody@x.com".into(),
                password: "secret1".into(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(wrong, AppError::Unauthorized));
        assert!(matches!(missing, AppError::Unauthorized));
        assert_eq!(wrong.public_message(), missing.public_message());
    }

    #[tokio::test]
    async fn unreadable_stored_digest_is_a_plain_login_failure() {
        let state = AppState::fake();
        state
            .users
            .create(NewUser {
                email: "broken@x.com".into(),
                password_hash: "not-a-phc-string".into(),
                display_name: String::new(),
                is_admin: false,
            })
            .await
            .expect("seed user");

        let err = login(
            &state,
            LoginRequest {
                email: "broken@x.com".into(),
                password: "secret1".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_even_with_different_case() {
        let state = AppState::fake();
        let req = |email: &str| RegisterRequest {
            name: String::new(),
            email: email.into(),
            password: "secret1".into(),
        };
        register(&state, req("a@x.com")).await.expect("first");
        let err = register(&state, req(" A@X.COM")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn concurrent_registrations_admit_exactly_one() {
        let state = AppState::fake();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                register(
                    &state,
                    RegisterRequest {
                        name: String::new(),
                        email: "race@x.com".into(),
                        password: "secret1".into(),
                    },
                )
                .await
                .is_ok()
            }));
        }
        let mut wins = 0;
        for h in handles {
            if h.await.unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }
}
