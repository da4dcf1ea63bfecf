use crate::error::AppError;

#[derive(Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    /// Argon2 time cost (iterations).
    pub hash_cost: u32,
    /// Shared secret gating LOGIST self-registration. `None` disables it.
    pub logist_invite_code: Option<String>,
    pub request_timeout_secs: u64,
}

pub const DEFAULT_JWT_SECRET: &str = "dev_secret_change_me";

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let server_port = std::env::var("SERVER_PORT")
            .or_else(|_| std::env::var("PORT"))
            .unwrap_or_else(|_| "8080".to_string());

        Ok(Config {
            server_host: std::env::var("SERVER_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: server_port
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?,
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://data.sqlite".to_string()),
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid DB_MAX_CONNECTIONS: {}", e)))?,
            db_min_connections: std::env::var("DB_MIN_CONNECTIONS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid DB_MIN_CONNECTIONS: {}", e)))?,
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
            token_ttl_days: std::env::var("TOKEN_TTL_DAYS")
                .unwrap_or_else(|_| "14".to_string())
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid TOKEN_TTL_DAYS: {}", e)))?,
            hash_cost: std::env::var("HASH_COST")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid HASH_COST: {}", e)))?,
            logist_invite_code: normalize_invite_code(std::env::var("LOGIST_INVITE_CODE").ok()),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid REQUEST_TIMEOUT_SECS: {}", e)))?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            database_url: "sqlite::memory:".to_string(),
            db_max_connections: 1,
            db_min_connections: 1,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_days: 14,
            hash_cost: 2,
            logist_invite_code: None,
            request_timeout_secs: 30,
        }
    }
}

/// Blank codes count as "not configured".
pub fn normalize_invite_code(raw: Option<String>) -> Option<String> {
    raw.map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
}
