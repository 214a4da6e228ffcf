//! Configuration management for officekit-server

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default LibreOffice program directory on Debian/Ubuntu
pub const DEFAULT_INSTALL_PATH: &str = "/usr/lib/libreoffice/program/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub office: OfficeConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct OfficeConfig {
    /// LibreOffice `program/` directory
    pub install_path: PathBuf,
    /// Optional `file://` URL of a dedicated user profile
    pub user_profile: Option<String>,
    /// Deadline for each document load
    pub load_timeout_ms: u64,
}

impl OfficeConfig {
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                max_upload_bytes: 50 * 1024 * 1024,
            },
            office: OfficeConfig {
                install_path: PathBuf::from(DEFAULT_INSTALL_PATH),
                user_profile: None,
                load_timeout_ms: 30_000,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        Ok(Config {
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_or(&lookup, "SERVER_PORT", defaults.server.port)?,
                max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", defaults.server.max_upload_bytes)?,
            },
            office: OfficeConfig {
                install_path: lookup("LOK_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.office.install_path),
                user_profile: lookup("LOK_USER_PROFILE").filter(|p| !p.is_empty()),
                load_timeout_ms: parse_or(&lookup, "LOAD_TIMEOUT_MS", defaults.office.load_timeout_ms)?,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}
