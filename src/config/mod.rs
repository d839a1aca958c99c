//! Configuration loading and management for the attendance engine.
//!
//! This module loads the attendance policy (lateness cutoff, expected daily
//! minutes, calendar zone, export settings) and an optional seed roster from
//! YAML files.
//!
//! # Example
//!
//! ```no_run
//! use attendance_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Late after: {}", config.policy().lateness_cutoff);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AttendancePolicy, DEFAULT_EXPECTED_DAILY_MINUTES, DEFAULT_TAB_NAME_LIMIT,
    DEFAULT_WORKBOOK_PREFIX, EngineConfig, ExportSettings, MIN_TAB_NAME_LIMIT, PolicyFile,
    RosterFile, default_lateness_cutoff,
};
