//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the attendance
//! policy and the optional seed roster from YAML files.

use std::fs;
use std::path::Path;

use chrono::NaiveTime;

use crate::calendar::LocalCalendar;
use crate::error::{EngineError, EngineResult};
use crate::models::{AdjustmentFields, Employee};

use super::types::{
    AttendancePolicy, DEFAULT_TAB_NAME_LIMIT, EngineConfig, ExportSettings, MIN_TAB_NAME_LIMIT,
    PolicyFile, RosterFile,
};

/// Loads and provides access to the engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── policy.yaml   # Lateness cutoff, expected minutes, calendar, export settings
/// └── roster.yaml   # Optional: employees and adjustment fields
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Expected minutes: {}", loader.policy().expected_daily_minutes);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `policy.yaml` is missing
    /// - Any file contains invalid YAML
    /// - A value fails validation (cutoff, expected minutes, calendar, tab limit)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let policy_path = path.join("policy.yaml");
        let policy_file = Self::load_yaml::<PolicyFile>(&policy_path)?;

        let roster_path = path.join("roster.yaml");
        let roster = if roster_path.exists() {
            Self::load_yaml::<RosterFile>(&roster_path)?
        } else {
            RosterFile::default()
        };

        Ok(Self {
            config: Self::build(policy_file, roster)?,
        })
    }

    /// Builds a loader from an in-memory `policy.yaml` document.
    pub fn from_policy_str(yaml: &str) -> EngineResult<Self> {
        let policy_file: PolicyFile =
            serde_yaml::from_str(yaml).map_err(|e| EngineError::ConfigParseError {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            config: Self::build(policy_file, RosterFile::default())?,
        })
    }

    /// Wraps an already built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    fn build(policy_file: PolicyFile, roster: RosterFile) -> EngineResult<EngineConfig> {
        let lateness_cutoff = parse_cutoff(&policy_file.lateness_cutoff)?;

        if policy_file.expected_daily_minutes < 0 {
            return Err(EngineError::InvalidConfig {
                field: "expected_daily_minutes".to_string(),
                message: format!("must not be negative, got {}", policy_file.expected_daily_minutes),
            });
        }

        let tab_name_limit = policy_file.export.tab_name_limit;
        if !(MIN_TAB_NAME_LIMIT..=DEFAULT_TAB_NAME_LIMIT).contains(&tab_name_limit) {
            return Err(EngineError::InvalidConfig {
                field: "export.tab_name_limit".to_string(),
                message: format!(
                    "must be between {} and {}, got {}",
                    MIN_TAB_NAME_LIMIT, DEFAULT_TAB_NAME_LIMIT, tab_name_limit
                ),
            });
        }

        let calendar = LocalCalendar::from_config_str(&policy_file.calendar)?;

        let policy = AttendancePolicy {
            lateness_cutoff,
            expected_daily_minutes: policy_file.expected_daily_minutes,
        };

        Ok(EngineConfig::new(
            policy,
            calendar,
            policy_file.export,
            roster,
        ))
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the attendance policy.
    pub fn policy(&self) -> &AttendancePolicy {
        self.config.policy()
    }

    /// Returns the deployment calendar.
    pub fn calendar(&self) -> &LocalCalendar {
        self.config.calendar()
    }

    /// Returns the export settings.
    pub fn export(&self) -> &ExportSettings {
        self.config.export()
    }

    /// Employees listed in `roster.yaml`.
    pub fn employees(&self) -> &[Employee] {
        &self.config.roster().employees
    }

    /// Adjustment fields listed in `roster.yaml`.
    pub fn adjustments(&self) -> &[AdjustmentFields] {
        &self.config.roster().adjustments
    }
}

fn parse_cutoff(text: &str) -> EngineResult<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text.trim(), "%H:%M:%S"))
        .map_err(|_| EngineError::InvalidConfig {
            field: "lateness_cutoff".to_string(),
            message: format!("expected HH:MM, got '{}'", text),
        })
}
