use std::env;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::store::StorageKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DASHBOARD_PASSWORD is not set; refusing to start without a dashboard secret")]
    MissingPassword,

    #[error("invalid {key} value: {value}")]
    Invalid { key: String, value: String },
}

/// Runtime configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub storage: StorageKind,
    pub public_base_url: String,
    pub dashboard_password: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        // No fallback constant here: a known default secret is worse than
        // failing to boot.
        let dashboard_password =
            env::var("DASHBOARD_PASSWORD").map_err(|_| ConfigError::MissingPassword)?;

        let port = parse_or("PORT", 8080)?;
        let data_dir = PathBuf::from(var_or("DATA_DIR", "data"));
        let storage = var_or("STORAGE", "blob")
            .parse::<StorageKind>()
            .map_err(|value| ConfigError::Invalid {
                key: "STORAGE".into(),
                value,
            })?;
        let public_base_url = var_or("PUBLIC_BASE_URL", "/data");

        Ok(Self {
            port,
            data_dir,
            storage,
            public_base_url,
            dashboard_password,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}
