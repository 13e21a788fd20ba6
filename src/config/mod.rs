//! Configuration loading and management for the attendance engine.
//!
//! This module provides functionality to load the staff roster, shift
//! definitions and engine settings from YAML files, plus the process-level
//! settings taken from the environment.
//!
//! # Example
//!
//! ```no_run
//! use shift_attendance::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/restaurant").unwrap();
//! println!("Warn {} minutes before shift end", config.settings().warning_window_minutes);
//! ```

mod loader;
mod server;
mod types;

pub use loader::ConfigLoader;
pub use server::ServerConfig;
pub use types::{AttendanceSettings, ShiftSeed, ShiftsConfig, UserSeed, UsersConfig};
