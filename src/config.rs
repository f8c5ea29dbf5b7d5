use std::fmt;

use anyhow::{bail, Context};
use secrecy::{ExposeSecret, Secret};

/// Shortest signing secret accepted for HS256.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[redacted]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

impl JwtConfig {
    /// Rejects a missing or short secret so the server never starts with forgeable tokens.
    pub fn validate(&self) -> anyhow::Result<()> {
        let len = self.secret.expose_secret().trim().len();
        if len == 0 {
            bail!("JWT_SECRET is empty");
        }
        if len < MIN_SECRET_LEN {
            bail!("JWT_SECRET too short (min {MIN_SECRET_LEN} bytes)");
        }
        if self.ttl_minutes <= 0 {
            bail!("JWT_TTL_MINUTES must be positive");
        }
        Ok(())
    }
}

/// Argon2id work factor plus the registration password policy.
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    pub min_length: usize,
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl PasswordConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.min_length == 0 {
            bail!("PASSWORD_MIN_LENGTH must be at least 1");
        }
        Ok(())
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 6,
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Secret<String>,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = Secret::new(std::env::var("DATABASE_URL").context("DATABASE_URL")?);
        let jwt = JwtConfig {
            secret: Secret::new(std::env::var("JWT_SECRET").context("JWT_SECRET")?),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "irontrack".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "irontrack-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 60 * 24)?,
        };
        jwt.validate()?;

        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            min_length: env_parse("PASSWORD_MIN_LENGTH", defaults.min_length)?,
            memory_kib: env_parse("ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: env_parse("ARGON2_ITERATIONS", defaults.iterations)?,
            parallelism: env_parse("ARGON2_PARALLELISM", defaults.parallelism)?,
        };
        password.validate()?;

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_default();

        Ok(Self {
            database_url,
            jwt,
            password,
            allowed_origins,
        })
    }
}

fn env_parse<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    parse_or_default(key, std::env::var(key).ok(), default)
}

/// Absent means default; present but unparsable is an error.
fn parse_or_default<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("invalid {key}")),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: Secret::new(secret.into()),
            issuer: "iss".into(),
            audience: "aud".into(),
            ttl_minutes: 60,
        }
    }

    #[test]
    fn empty_or_short_secret_is_rejected() {
        assert!(jwt("").validate().is_err());
        assert!(jwt("   ").validate().is_err());
        assert!(jwt("short-secret").validate().is_err());
        assert!(jwt("0123456789abcdef0123456789abcdef").validate().is_ok());
    }

    #[test]
    fn non_positive_ttl_is_rejected() {
        let mut cfg = jwt("0123456789abcdef0123456789abcdef");
        cfg.ttl_minutes = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn debug_output_hides_secret() {
        let cfg = jwt("super-secret-signing-key-that-is-long");
        let printed = format!("{:?}", cfg);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("[redacted]"));
    }

    #[test]
    fn unparsable_numbers_fail_instead_of_defaulting() {
        assert_eq!(parse_or_default::<i64>("JWT_TTL_MINUTES", None, 1440).unwrap(), 1440);
        assert_eq!(
            parse_or_default::<u32>("ARGON2_MEMORY_KIB", Some(" 4096 ".into()), 19456).unwrap(),
            4096
        );

        let err = parse_or_default::<u32>("ARGON2_MEMORY_KIB", Some("abc".into()), 19456)
            .unwrap_err();
        assert!(err.to_string().contains("ARGON2_MEMORY_KIB"));
        assert!(parse_or_default::<i64>("JWT_TTL_MINUTES", Some("1d".into()), 1440).is_err());
    }

    #[test]
    fn zero_password_minimum_is_rejected() {
        let cfg = PasswordConfig {
            min_length: 0,
            ..PasswordConfig::default()
        };
        assert!(cfg.validate().is_err());
        assert!(PasswordConfig::default().validate().is_ok());
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins("https://a.example, https://b.example,,"),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(parse_origins("").is_empty());
    }
}
