use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_environment")]
    pub environment: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_jwt_kid")]
    pub jwt_kid: String,
    #[serde(default)]
    pub previous_jwt_secrets: Vec<String>,
    #[serde(default)]
    pub previous_jwt_kids: Vec<String>,
    pub jwt_expiration_seconds: u64,
    pub refresh_token_expiration_days: u64,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecurityConfig {
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,
    #[serde(default = "default_metrics_allow_private_only")]
    pub metrics_allow_private_only: bool,
    #[serde(default)]
    pub metrics_admin_token: Option<String>,
    #[serde(default = "default_login_max_failures")]
    pub login_max_failures: u32,
    #[serde(default = "default_login_window_seconds")]
    pub login_window_seconds: u64,
    #[serde(default = "default_login_lockout_seconds")]
    pub login_lockout_seconds: u64,
    #[serde(default = "default_login_backoff_base_ms")]
    pub login_backoff_base_ms: u64,
    #[serde(default = "default_permission_cache_ttl_secs")]
    pub permission_cache_ttl_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_allowed_origins: default_cors_allowed_origins(),
            metrics_allow_private_only: default_metrics_allow_private_only(),
            metrics_admin_token: None,
            login_max_failures: default_login_max_failures(),
            login_window_seconds: default_login_window_seconds(),
            login_lockout_seconds: default_login_lockout_seconds(),
            login_backoff_base_ms: default_login_backoff_base_ms(),
            permission_cache_ttl_secs: default_permission_cache_ttl_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: i64,
    #[serde(default = "default_user_quota_bytes")]
    pub user_quota_bytes: i64,
    #[serde(default = "default_max_batch_files")]
    pub max_batch_files: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_file_size_bytes: default_max_file_size_bytes(),
            user_quota_bytes: default_user_quota_bytes(),
            max_batch_files: default_max_batch_files(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Toml::file("config/development.toml").nested())
            .merge(Env::prefixed("APP_").split("__"))
            .merge(Env::prefixed("DATABASE_").split("__"))
            .merge(Env::prefixed("AUTH_").split("__"))
            .merge(Env::prefixed("SECURITY_").split("__"))
            .merge(Env::prefixed("STORAGE_").split("__"))
            .merge(Env::prefixed("LOGGING_").split("__"))
            .merge(
                Env::raw()
                    .only(&["database.url"])
                    .map(|_| "DATABASE_URL".into()),
            )
            .merge(
                Env::raw()
                    .only(&["auth.jwt_secret"])
                    .map(|_| "JWT_SECRET".into()),
            )
            .extract()
            .map_err(Box::new)
    }
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_jwt_kid() -> String {
    "v1".to_string()
}

fn default_cors_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

fn default_metrics_allow_private_only() -> bool {
    true
}

fn default_login_max_failures() -> u32 {
    5
}

fn default_login_window_seconds() -> u64 {
    600
}

fn default_login_lockout_seconds() -> u64 {
    900
}

fn default_login_backoff_base_ms() -> u64 {
    500
}

fn default_permission_cache_ttl_secs() -> u64 {
    300
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_max_file_size_bytes() -> i64 {
    10 * 1024 * 1024
}

fn default_user_quota_bytes() -> i64 {
    500 * 1024 * 1024
}

fn default_max_batch_files() -> usize {
    10
}
