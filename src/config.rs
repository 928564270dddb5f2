use anyhow::{Context, bail};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    MySql,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            "mysql" => Ok(StoreBackend::MySql),
            other => bail!("unknown STORE_BACKEND `{other}` (expected memory or mysql)"),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
    pub log_level: tracing::Level,

    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

fn var_or<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("invalid {key} `{raw}`: {e}"))
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();

        let store_backend: StoreBackend = var_or("STORE_BACKEND", "memory")?;
        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::MySql && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORE_BACKEND=mysql");
        }

        let bootstrap_admin = match (
            env::var("BOOTSTRAP_ADMIN_EMAIL"),
            env::var("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(BootstrapAdmin { email, password }),
            _ => None,
        };

        let config = Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:3001".to_string()),
            store_backend,
            database_url,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: var_or("ACCESS_TOKEN_TTL", "3600")?, // default 1 hour

            rate_login_per_min: var_or("RATE_LOGIN_PER_MIN", "60")?,
            rate_protected_per_min: var_or("RATE_PROTECTED_PER_MIN", "1000")?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: var_or("LOG_LEVEL", "info")?,

            bootstrap_admin,
        };

        if config.rate_login_per_min == 0 || config.rate_protected_per_min == 0 {
            bail!("rate limits must be at least 1 request per minute");
        }

        Ok(config)
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            store_backend: StoreBackend::Memory,
            database_url: None,
            jwt_secret: "test-secret".to_string(),
            access_token_ttl: 3600,
            rate_login_per_min: 1000,
            rate_protected_per_min: 10_000,
            api_prefix: "/api".to_string(),
            log_dir: "logs".to_string(),
            log_level: tracing::Level::DEBUG,
            bootstrap_admin: None,
        }
    }
}
