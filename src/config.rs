/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可、JWT 署名鍵など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::auth::SigningKey;
use crate::services::auth::token::{DEFAULT_TOKEN_TTL_SECONDS, MAX_TOKEN_TTL_SECONDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    // None only in development: in-memory repositories, nothing persisted
    pub database_url: Option<String>,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    // HMAC secret shared by issuer and validator
    pub jwt_secret: SigningKey,
    pub token_ttl_seconds: u64,

    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub request_timeout: Duration,
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        _ => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parse_or("PORT", 8080)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url = resolve_database_url(app_env, std::env::var("DATABASE_URL").ok())?;

        let cors_allowed_origins = split_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
        );

        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        let jwt_secret =
            SigningKey::new(jwt_secret.into_bytes()).map_err(|_| ConfigError::Invalid("JWT_SECRET"))?;

        let token_ttl_seconds =
            token_ttl(parse_or("TOKEN_TTL_SECONDS", DEFAULT_TOKEN_TTL_SECONDS)?)?;

        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", 10u32)?;
        if db_max_connections == 0 {
            return Err(ConfigError::Invalid("DB_MAX_CONNECTIONS"));
        }
        let db_acquire_timeout =
            Duration::from_secs(parse_or("DB_ACQUIRE_TIMEOUT_SECONDS", 5u64)?);
        let request_timeout = Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECONDS", 30u64)?);

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            jwt_secret,
            token_ttl_seconds,
            db_max_connections,
            db_acquire_timeout,
            request_timeout,
        })
    }
}

/// Production always needs a database. Development may run without one.
fn resolve_database_url(app_env: AppEnv, raw: Option<String>) -> Result<Option<String>, ConfigError> {
    match raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(url) => Ok(Some(url)),
        None if app_env.is_production() => Err(ConfigError::Missing("DATABASE_URL")),
        None => Ok(None),
    }
}

fn token_ttl(seconds: u64) -> Result<u64, ConfigError> {
    if seconds == 0 || seconds > MAX_TOKEN_TTL_SECONDS {
        return Err(ConfigError::Invalid("TOKEN_TTL_SECONDS"));
    }
    Ok(seconds)
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
}
