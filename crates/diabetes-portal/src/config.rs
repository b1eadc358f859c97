// diabetes-portal/crates/diabetes-portal/src/config.rs

use anyhow::{Context, Result};
use std::env;
use std::net::{SocketAddr, ToSocketAddrs};
use std::str::FromStr;
use tracing::{info, warn};

use crate::auth::PasswordScheme;

/// Public copy of the Pima Indians Diabetes dataset (headerless, 768 x 9).
pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/jbrownlee/Datasets/master/pima-indians-diabetes.data.csv";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    pub database_path: String,
    pub database_pool_size: u32,
    pub dataset_url: String,
    pub dataset_timeout_seconds: u64,
    pub split_seed: u64,
    pub test_fraction: f64,
    pub password_scheme: PasswordScheme,
    pub request_timeout_seconds: u64,
    pub max_form_bytes: usize,
    pub secure_cookies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: "127.0.0.1".to_string(),
            api_port: 8000,
            database_path: "./data/users.db".to_string(),
            database_pool_size: 4,
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            dataset_timeout_seconds: 30,
            split_seed: 0,
            test_fraction: 0.2,
            password_scheme: PasswordScheme::Argon2,
            request_timeout_seconds: 120,
            max_form_bytes: 16 * 1024,
            secure_cookies: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            warn!("Failed to load .env file: {}. Using system environment variables.", e);
        } else {
            info!("Loaded environment variables from .env file");
        }

        let defaults = Self::default();

        let test_fraction: f64 = parse_var("TEST_FRACTION", defaults.test_fraction)?;
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(anyhow::anyhow!(
                "TEST_FRACTION must be strictly between 0 and 1, got {}",
                test_fraction
            ));
        }

        let database_pool_size: u32 = parse_var("DATABASE_POOL_SIZE", defaults.database_pool_size)?;
        if database_pool_size == 0 {
            return Err(anyhow::anyhow!("DATABASE_POOL_SIZE must be at least 1"));
        }

        Ok(Self {
            api_host: env::var("API_HOST").unwrap_or(defaults.api_host),
            api_port: parse_var("API_PORT", defaults.api_port)?,
            database_path: env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            database_pool_size,
            dataset_url: env::var("DATASET_URL").unwrap_or(defaults.dataset_url),
            dataset_timeout_seconds: parse_var(
                "DATASET_TIMEOUT_SECONDS",
                defaults.dataset_timeout_seconds,
            )?,
            split_seed: parse_var("SPLIT_SEED", defaults.split_seed)?,
            test_fraction,
            password_scheme: parse_var("PASSWORD_SCHEME", defaults.password_scheme)?,
            request_timeout_seconds: parse_var(
                "REQUEST_TIMEOUT_SECONDS",
                defaults.request_timeout_seconds,
            )?,
            max_form_bytes: parse_var("MAX_FORM_BYTES", defaults.max_form_bytes)?,
            secure_cookies: parse_var("SECURE_COOKIES", defaults.secure_cookies)?,
        })
    }

    pub fn print_config(&self) {
        info!("Current Configuration:");
        info!("- API: {}:{}", self.api_host, self.api_port);
        info!("- Database Path: {}", self.database_path);
        info!("- Database Pool Size: {}", self.database_pool_size);
        info!("- Dataset URL: {}", self.dataset_url);
        info!("- Dataset Timeout: {}s", self.dataset_timeout_seconds);
        info!("- Split Seed: {}", self.split_seed);
        info!("- Test Fraction: {}", self.test_fraction);
        info!("- Password Scheme: {}", self.password_scheme);
        info!("- Request Timeout: {}s", self.request_timeout_seconds);
        info!("- Max Form Size: {} bytes", self.max_form_bytes);
        info!("- Secure Cookies: {}", self.secure_cookies);
    }

    /// Bind address; `api_host` may be an IP literal or a resolvable name.
    pub fn api_addr(&self) -> Result<SocketAddr> {
        (self.api_host.as_str(), self.api_port)
            .to_socket_addrs()
            .with_context(|| format!("Invalid API address {}:{}", self.api_host, self.api_port))?
            .next()
            .with_context(|| format!("API host {} resolved to no address", self.api_host))
    }
}

/// Read `name` from the environment, falling back to `default` when unset.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {} ({})", name, raw, e)),
        Err(_) => Ok(default),
    }
}
