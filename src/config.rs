//! Process configuration from the environment. Business configuration
//! (delivery fee, thresholds) lives in the `store_settings` row instead, so
//! it can be changed from the admin panel without a redeploy.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use tracing::info;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self {
            port: try_load("PORT", "8083")?,
            database_url: env::var("DATABASE_URL").context("DATABASE_URL not set")?,
            max_connections: try_load("DB_MAX_CONNECTIONS", "10")?,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse().map_err(|e| anyhow!("invalid {key}: {e}"))
}
