use crate::auth::AuthSettings;
use crate::errors::{AppError, AppResult};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
    pub quote_api_base_url: String,
    pub quote_timeout_secs: u64,
    pub token_ttl_hours: i64,
    pub password_hash_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let server_port = env_var_or("SERVER_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("SERVER_PORT: {e}")))?;

        let quote_timeout_secs = env_var_or("QUOTE_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| AppError::Config(format!("QUOTE_TIMEOUT_SECS: {e}")))?;

        let token_ttl_hours = env_var_or("TOKEN_TTL_HOURS", "3")
            .parse::<i64>()
            .map_err(|e| AppError::Config(format!("TOKEN_TTL_HOURS: {e}")))?;
        if token_ttl_hours <= 0 {
            return Err(AppError::Config("TOKEN_TTL_HOURS must be positive".into()));
        }

        let password_hash_cost = env_var_or("PASSWORD_HASH_COST", &bcrypt::DEFAULT_COST.to_string())
            .parse::<u32>()
            .map_err(|e| AppError::Config(format!("PASSWORD_HASH_COST: {e}")))?;
        if !(4..=31).contains(&password_hash_cost) {
            return Err(AppError::Config("PASSWORD_HASH_COST must be within 4..=31".into()));
        }

        Ok(Self {
            server_port,
            data_dir: PathBuf::from(env_var_or("DATA_DIR", "data")),
            static_dir: PathBuf::from(env_var_or("STATIC_DIR", "frontend/dist")),
            quote_api_base_url: env_var_or("QUOTE_API_BASE_URL", "https://query1.finance.yahoo.com"),
            quote_timeout_secs,
            token_ttl_hours,
            password_hash_cost,
        })
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            hash_cost: self.password_hash_cost,
            token_ttl_hours: self.token_ttl_hours,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 8000,
            data_dir: PathBuf::from("data"),
            static_dir: PathBuf::from("frontend/dist"),
            quote_api_base_url: "https://query1.finance.yahoo.com".to_string(),
            quote_timeout_secs: 10,
            token_ttl_hours: 3,
            password_hash_cost: bcrypt::DEFAULT_COST,
        }
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
