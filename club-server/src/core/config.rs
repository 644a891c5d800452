use std::path::PathBuf;

use chrono_tz::Tz;

use crate::auth::JwtConfig;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP listen port |
/// | DATABASE_PATH | `<WORK_DIR>/club.db` | SQLite file |
/// | TIMEZONE | Asia/Tokyo | business timezone |
/// | ROTATION_POLL_SECS | 10 | cast rotation poll interval |
/// | ENVIRONMENT | development | environment name |
/// | LOG_LEVEL | info | log level |
/// | LOG_DIR | unset | rolling log directory |
/// | ADMIN_USERNAME / ADMIN_PASSWORD | admin / admin | bootstrap administrator |
///
/// JWT settings are read by [`JwtConfig::from_env`].
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/srv/club HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and logs
    pub work_dir: String,
    pub http_port: u16,
    pub database_path: String,
    /// Business timezone for day switch and payroll windows
    pub timezone: Tz,
    pub rotation_poll_secs: u64,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub admin_username: String,
    /// Only used when no admin profile exists yet
    pub admin_password: Option<String>,
    pub jwt: JwtConfig,
}

impl Config {
    /// Load configuration from the environment
    ///
    /// Unset or unparsable values fall back to their defaults.
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| {
            PathBuf::from(&work_dir)
                .join("club.db")
                .to_string_lossy()
                .into_owned()
        });
        let timezone = std::env::var("TIMEZONE")
            .ok()
            .and_then(|tz| {
                tz.parse::<Tz>()
                    .map_err(|e| tracing::warn!("Invalid TIMEZONE '{}': {}", tz, e))
                    .ok()
            })
            .unwrap_or(chrono_tz::Asia::Tokyo);
        // The dev default password is never applied in production
        let admin_password = std::env::var("ADMIN_PASSWORD")
            .ok()
            .or_else(|| (environment != "production").then(|| "admin".to_string()));

        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path,
            timezone,
            rotation_poll_secs: std::env::var("ROTATION_POLL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(10),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            admin_username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            admin_password,
            jwt: JwtConfig::from_env(&environment),
            work_dir,
            environment,
        }
    }

    /// Configuration for tests: in-memory friendly, fixed secret, UTC
    pub fn for_tests() -> Self {
        Self {
            work_dir: ".".into(),
            http_port: 0,
            database_path: ":memory:".into(),
            timezone: chrono_tz::UTC,
            rotation_poll_secs: 1,
            environment: "test".into(),
            log_level: "debug".into(),
            log_dir: None,
            admin_username: "admin".into(),
            admin_password: Some("admin".into()),
            jwt: JwtConfig {
                secret: "test-secret-key-that-is-long-enough-32".into(),
                expiration_minutes: 60,
                issuer: "club-server".into(),
                audience: "club-clients".into(),
            },
        }
    }

    /// Create the working directory if missing
    pub fn ensure_work_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
