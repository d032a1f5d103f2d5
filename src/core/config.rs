use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::shared::constants::{
    DEFAULT_AUDIT_LOG_MAX_SIZE_MB, DEFAULT_AUDIT_LOG_RETENTION_DAYS, DEFAULT_TRASH_RETENTION_DAYS,
    MAX_RETENTION_DAYS,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub retention: RetentionConfig,
    pub storage: StorageConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    /// Public base URL used when rendering upload-request links
    pub server_url: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Retention windows and scan cadence for the background schedulers
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    /// Days a soft-deleted file stays in trash before it is erased
    pub trash_retention_days: i64,
    /// Days an audit entry is kept before age eviction
    pub audit_retention_days: i64,
    /// Ceiling for the audit log table, in megabytes
    pub audit_max_size_mb: i64,
    /// How often expired files and upload requests are scanned
    pub cleanup_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding uploaded objects, one file per stored-file id
    pub uploads_dir: PathBuf,
}

/// Credentials guarding the maintenance API
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            retention: RetentionConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            admin: AdminConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_url = env::var("SERVER_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port))
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            server_url,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 5;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Self {
            url,
            max_connections: parse_env("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_env("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: parse_env(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: parse_env("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: parse_env("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl RetentionConfig {
    const DEFAULT_CLEANUP_INTERVAL_MINUTES: u64 = 60;
    const MAX_CLEANUP_INTERVAL_MINUTES: u64 = 30 * 24 * 60; // 30 days

    pub fn from_env() -> Result<Self, String> {
        let trash_retention_days = retention_days_or_default(
            parse_env("TRASH_RETENTION_DAYS", DEFAULT_TRASH_RETENTION_DAYS)?,
            DEFAULT_TRASH_RETENTION_DAYS,
        );
        let audit_retention_days = retention_days_or_default(
            parse_env("AUDIT_LOG_RETENTION_DAYS", DEFAULT_AUDIT_LOG_RETENTION_DAYS)?,
            DEFAULT_AUDIT_LOG_RETENTION_DAYS,
        );
        let audit_max_size_mb = positive_or_default(
            parse_env("AUDIT_LOG_MAX_SIZE_MB", DEFAULT_AUDIT_LOG_MAX_SIZE_MB)?,
            DEFAULT_AUDIT_LOG_MAX_SIZE_MB,
        );

        let cleanup_interval = Self::cleanup_interval_from_minutes(parse_env(
            "CLEANUP_INTERVAL_MINUTES",
            Self::DEFAULT_CLEANUP_INTERVAL_MINUTES,
        )?)?;

        Ok(Self {
            trash_retention_days,
            audit_retention_days,
            audit_max_size_mb,
            cleanup_interval,
        })
    }

    fn cleanup_interval_from_minutes(minutes: u64) -> Result<Duration, String> {
        if minutes == 0 {
            return Err("CLEANUP_INTERVAL_MINUTES must be greater than zero".to_string());
        }
        if minutes > Self::MAX_CLEANUP_INTERVAL_MINUTES {
            return Err(format!(
                "CLEANUP_INTERVAL_MINUTES must be at most {}",
                Self::MAX_CLEANUP_INTERVAL_MINUTES
            ));
        }

        Ok(Duration::from_secs(minutes * 60))
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let uploads_dir = env::var("UPLOADS_DIR").unwrap_or_else(|_| "./data/uploads".to_string());

        Ok(Self {
            uploads_dir: PathBuf::from(uploads_dir),
        })
    }
}

impl AdminConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("ADMIN_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty());

        Ok(Self { username, password })
    }

    /// Returns credentials in "username:password" format if the maintenance API is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr + ToString,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse::<T>()
        .map_err(|_| format!("{} must be a valid number", key))
}

/// Zero or negative retention values fall back to the built-in default.
pub fn positive_or_default(value: i64, default: i64) -> i64 {
    if value <= 0 {
        default
    } else {
        value
    }
}

/// Retention window in days: non-positive values take `default`, values past
/// `MAX_RETENTION_DAYS` are capped so cutoff arithmetic stays in range.
pub fn retention_days_or_default(value: i64, default: i64) -> i64 {
    positive_or_default(value, default).min(MAX_RETENTION_DAYS)
}
