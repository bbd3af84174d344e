/// Configuration management for Yatube Service
///
/// Everything is read from environment variables; `main` loads a `.env` file
/// first when one is present.
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Entity store configuration
    pub store: StoreConfig,
    /// Bearer token verification
    pub auth: AuthConfig,
    /// Post list windowing
    pub pagination: PaginationSettings,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Emit JSON log lines instead of human readable ones
    pub json_logs: bool,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Entity store configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Database URL
    pub database_url: String,
    /// Max connections in pool
    pub max_connections: u32,
    /// Min connections kept open
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,
    /// Apply embedded migrations on startup
    pub run_migrations: bool,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("backend", &self.backend)
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

/// Bearer token verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// RSA public key (PEM) of the identity provider
    pub jwt_public_key_pem: Option<String>,
}

/// Post list windowing
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaginationSettings {
    /// Page size applied when the client sends no `limit`
    pub default_limit: Option<i64>,
    /// Upper bound for client supplied `limit`
    pub max_limit: Option<i64>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        let backend = match std::env::var("STORE_BACKEND") {
            Ok(value) if value.eq_ignore_ascii_case("memory") => StoreBackend::Memory,
            Ok(value) if value.eq_ignore_ascii_case("postgres") => StoreBackend::Postgres,
            Ok(other) => return Err(format!("Unknown STORE_BACKEND '{}'", other)),
            Err(_) => StoreBackend::Postgres,
        };

        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) if production && backend == StoreBackend::Postgres => {
                return Err("DATABASE_URL must be set in production".to_string())
            }
            Err(_) => "postgresql://localhost/yatube".to_string(),
        };

        let jwt_public_key_pem = std::env::var("JWT_PUBLIC_KEY_PEM")
            .ok()
            .filter(|pem| !pem.trim().is_empty());
        if production && jwt_public_key_pem.is_none() {
            return Err("JWT_PUBLIC_KEY_PEM must be set in production".to_string());
        }

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("YATUBE_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env_parse("YATUBE_SERVICE_PORT").unwrap_or(8080),
                json_logs: std::env::var("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            store: StoreConfig {
                backend,
                database_url,
                max_connections: env_parse("DB_MAX_CONNECTIONS").unwrap_or(10),
                min_connections: env_parse("DB_MIN_CONNECTIONS").unwrap_or(2),
                acquire_timeout_secs: env_parse("DB_ACQUIRE_TIMEOUT_SECS").unwrap_or(10),
                run_migrations: env_parse("DB_RUN_MIGRATIONS").unwrap_or(true),
            },
            auth: AuthConfig { jwt_public_key_pem },
            pagination: PaginationSettings {
                default_limit: env_parse::<i64>("PAGINATION_DEFAULT_LIMIT").filter(|l| *l > 0),
                max_limit: env_parse::<i64>("PAGINATION_MAX_LIMIT").filter(|l| *l > 0),
            },
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
