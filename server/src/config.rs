use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

use store::postgres::DbConfig;

pub struct Config {
    pub port: u16,
    pub environment: String,
    pub db: DbConfig,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "3001"),
            environment: try_load("ENVIRONMENT", "development"),
            db: DbConfig::from_env(),
        }
    }

    /// Error responses carry diagnostic detail only in development.
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
