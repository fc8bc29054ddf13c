use chrono::Duration;
use std::env;

use crate::error::AppError;

const MIN_SECRET_LEN: usize = 32;
// One year.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Settings for the PostgreSQL connection pool.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime_minutes: u64,
}

// The URL usually embeds the database password.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("max_lifetime_minutes", &self.max_lifetime_minutes)
            .finish()
    }
}

/// Settings for the password hasher and the token service.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
}

// The secret must never end up in a log line through `{:?}`.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Account created at startup if it does not exist yet.
#[derive(Clone)]
pub struct DefaultUser {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub default_user: Option<DefaultUser>,
}

impl std::fmt::Debug for DefaultUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultUser")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| AppError::Internal(format!("{} must be set", key)))
        };

        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(AppError::Internal(format!(
                "JWT_SECRET must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        let bcrypt_cost: u32 = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(AppError::Internal(
                "BCRYPT_COST must be between 4 and 31".into(),
            ));
        }

        let token_ttl_hours: i64 = parse_or(&lookup, "TOKEN_TTL_HOURS", 24)?;
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&token_ttl_hours) {
            return Err(AppError::Internal(format!(
                "TOKEN_TTL_HOURS must be between 1 and {}",
                MAX_TOKEN_TTL_HOURS
            )));
        }

        let default_user = match (
            lookup("DEFAULT_ADMIN_USERNAME"),
            lookup("DEFAULT_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(DefaultUser { username, password }),
            _ => None,
        };

        Ok(Self {
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
                min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", 1)?,
                max_lifetime_minutes: parse_or(&lookup, "DB_MAX_LIFETIME_MINUTES", 30)?,
            },
            auth: AuthConfig {
                jwt_secret,
                token_ttl: Duration::hours(token_ttl_hours),
                bcrypt_cost,
            },
            default_user,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Internal(format!("{} must be a number", key))),
        None => Ok(default),
    }
}
