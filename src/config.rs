//! Server configuration loaded from the environment
//!
//! | Variable            | Default             |
//! |---------------------|---------------------|
//! | `MESSAGE_DATA_FILE` | `storage/data.json` |
//! | `MESSAGE_BIND_HOST` | `0.0.0.0`           |
//! | `MESSAGE_HTTP_PORT` | `3000`              |
//! | `MESSAGE_UDP_PORT`  | `5000`              |
//!
//! A relative data file path is resolved against the current directory.

use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_FILE: &str = "storage/data.json";
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_UDP_PORT: u16 = 5000;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} is not a port number")]
    InvalidPort { var: &'static str, value: String },
}

/// Runtime settings for the message server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub data_file: PathBuf,
    pub bind_host: String,
    pub http_port: u16,
    pub udp_port: u16,
}

impl ServerConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        let data_file = lookup("MESSAGE_DATA_FILE").unwrap_or_else(|| DEFAULT_DATA_FILE.to_string());
        let data_file = if Path::new(&data_file).is_absolute() {
            PathBuf::from(data_file)
        } else {
            current_dir.join(data_file)
        };

        Ok(Self {
            data_file,
            bind_host: lookup("MESSAGE_BIND_HOST").unwrap_or_else(|| DEFAULT_BIND_HOST.to_string()),
            http_port: parse_port("MESSAGE_HTTP_PORT", lookup("MESSAGE_HTTP_PORT"), DEFAULT_HTTP_PORT)?,
            udp_port: parse_port("MESSAGE_UDP_PORT", lookup("MESSAGE_UDP_PORT"), DEFAULT_UDP_PORT)?,
        })
    }

    /// `host:port` for the HTTP listener
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.http_port)
    }

    /// `host:port` for the UDP socket
    pub fn udp_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.udp_port)
    }
}

fn parse_port(var: &'static str, value: Option<String>, default: u16) -> Result<u16, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort { var, value }),
    }
}
