use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub api_prefix: String,

    // Sessions
    pub session_ttl_secs: u64,
    pub session_max: u64,

    // Remote ERP defaults offered to new sessions
    pub rm_default_server: String,
    pub rm_default_user: String,
    pub rm_timeout_secs: u64,
    pub default_query_year: i32,

    // Rate limiting
    pub rate_query_per_min: u32,

    // Logging
    pub log_dir: String,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let config = Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),

            session_ttl_secs: parse_var("SESSION_TTL_SECS", 28_800)?, // 8h
            session_max: parse_var("SESSION_MAX", 10_000)?,

            rm_default_server: env::var("RM_DEFAULT_SERVER")
                .unwrap_or_else(|_| "http://localhost:8051".to_string()),
            rm_default_user: env::var("RM_DEFAULT_USER").unwrap_or_else(|_| "mestre".to_string()),
            rm_timeout_secs: parse_var("RM_TIMEOUT_SECS", 60)?,
            default_query_year: parse_var("DEFAULT_QUERY_YEAR", 2024)?,

            rate_query_per_min: parse_var("RATE_QUERY_PER_MIN", 30)?,

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "debug".to_string()),
        };

        if config.rate_query_per_min == 0 {
            bail!("RATE_QUERY_PER_MIN must be greater than zero");
        }
        if config.rm_timeout_secs == 0 {
            bail!("RM_TIMEOUT_SECS must be greater than zero");
        }

        Ok(config)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by handler tests; never reads the environment.
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            api_prefix: "/api/v1".to_string(),
            session_ttl_secs: 60,
            session_max: 100,
            rm_default_server: "http://localhost:8051".to_string(),
            rm_default_user: "mestre".to_string(),
            rm_timeout_secs: 5,
            default_query_year: 2024,
            rate_query_per_min: 1_000,
            log_dir: "logs".to_string(),
            log_level: "debug".to_string(),
        }
    }
}
