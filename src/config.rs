// src/config.rs
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 8000));
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Runtime settings for the relay.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_addr: SocketAddr,
    /// Base URL of the inference server, without the `/api/chat` suffix.
    pub backend_url: String,
    pub model: String,
    /// Default mode when a request does not say.
    pub stream: bool,
    pub timeout: Duration,
    pub stream_timeout: Duration,
    pub allowed_origin: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            stream: false,
            timeout: Duration::from_secs(30),
            stream_timeout: Duration::from_secs(60),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
        }
    }
}

impl RelayConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Missing or blank keys
    /// keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let bind_addr = match get("RELAY_BIND_ADDR") {
            Some(v) => parse("RELAY_BIND_ADDR", &v)?,
            None => defaults.bind_addr,
        };
        let stream = match get("RELAY_STREAM") {
            Some(v) => parse_bool("RELAY_STREAM", &v)?,
            None => defaults.stream,
        };
        let timeout = match get("RELAY_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse("RELAY_TIMEOUT_SECS", &v)?),
            None => defaults.timeout,
        };
        let stream_timeout = match get("RELAY_STREAM_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse("RELAY_STREAM_TIMEOUT_SECS", &v)?),
            None => defaults.stream_timeout,
        };

        Ok(Self {
            bind_addr,
            backend_url: get("RELAY_BACKEND_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.backend_url),
            model: get("RELAY_MODEL").unwrap_or(defaults.model),
            stream,
            timeout,
            stream_timeout,
            allowed_origin: get("RELAY_ALLOWED_ORIGIN").unwrap_or(defaults.allowed_origin),
        })
    }

    /// Timeout for one outbound call in the given mode.
    pub fn timeout_for(&self, stream: bool) -> Duration {
        if stream { self.stream_timeout } else { self.timeout }
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
