//! Process-level settings read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{AttendanceError, AttendanceResult};

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Directory holding `settings.yaml`, `users.yaml` and `shifts.yaml`.
    pub config_dir: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default               |
    /// |-------------------------|-----------------------|
    /// | `BIND_ADDR`             | `0.0.0.0:3000`        |
    /// | `ATTENDANCE_CONFIG_DIR` | `./config/restaurant` |
    pub fn from_env() -> AttendanceResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> AttendanceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into());
        let bind_addr = raw_addr
            .parse()
            .map_err(|_| AttendanceError::ConfigParseError {
                path: "env:BIND_ADDR".to_string(),
                message: format!("'{}' is not a socket address", raw_addr),
            })?;

        let config_dir = lookup("ATTENDANCE_CONFIG_DIR")
            .unwrap_or_else(|| "./config/restaurant".into())
            .into();

        Ok(Self {
            bind_addr,
            config_dir,
        })
    }
}
