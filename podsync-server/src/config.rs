//! Server configuration, read from command-line flags or the environment.

use axum::http::HeaderValue;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 5 * 60 * 1000;

pub const DEFAULT_RETENTION_MS: u64 = 30 * 60 * 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),
}

#[derive(Debug, Clone, Parser)]
#[command(name = "podsync-server", version, about = "Real-time session and signaling server")]
pub struct ServerConfig {
    /// Address to bind the HTTP/WebSocket listener on.
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub bind_host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Browser origin allowed by CORS.
    #[arg(long, env = "CORS_ORIGIN", default_value = "http://localhost:3000")]
    pub cors_origin: String,

    /// How often the idle-room reaper scans, in milliseconds.
    #[arg(long, env = "SWEEP_INTERVAL_MS", default_value_t = DEFAULT_SWEEP_INTERVAL_MS)]
    pub sweep_interval_ms: u64,

    /// How long an empty room may persist before eviction, in milliseconds.
    #[arg(long, env = "RETENTION_MS", default_value_t = DEFAULT_RETENTION_MS)]
    pub retention_ms: u64,

    /// Require both sender and target of offer/answer/ice-candidate to be
    /// members of the room.
    #[arg(long, env = "STRICT_SIGNALING")]
    pub strict_signaling: bool,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host, self.port)
    }

    pub fn reaper(&self) -> Result<ReaperConfig, ConfigError> {
        ReaperConfig::from_millis(self.sweep_interval_ms, self.retention_ms)
    }

    pub fn cors_origin_header(&self) -> Result<HeaderValue, ConfigError> {
        HeaderValue::from_str(&self.cors_origin)
            .map_err(|_| ConfigError::InvalidCorsOrigin(self.cors_origin.clone()))
    }
}

/// Idle-room reaper timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaperConfig {
    pub sweep_interval: Duration,
    pub retention: Duration,
}

impl ReaperConfig {
    pub fn from_millis(sweep_interval_ms: u64, retention_ms: u64) -> Result<Self, ConfigError> {
        if sweep_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration("sweep interval"));
        }
        if retention_ms == 0 {
            return Err(ConfigError::ZeroDuration("retention"));
        }
        Ok(Self {
            sweep_interval: Duration::from_millis(sweep_interval_ms),
            retention: Duration::from_millis(retention_ms),
        })
    }
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_millis(DEFAULT_SWEEP_INTERVAL_MS),
            retention: Duration::from_millis(DEFAULT_RETENTION_MS),
        }
    }
}
