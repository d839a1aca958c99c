//! Error types for the attendance engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while registering, reconciling
//! and exporting punches.

use thiserror::Error;

/// The main error type for the attendance engine.
///
/// An empty punch set is never an error: it produces an all-zero summary.
///
/// # Example
///
/// ```
/// use attendance_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/policy.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/policy.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but holds a value the engine cannot use.
    #[error("Invalid configuration value '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// A punch record carried a malformed timestamp or an unknown kind.
    #[error("Invalid punch field '{field}': {message}")]
    InvalidPunch {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The employee is unknown to the directory.
    #[error("Employee not found: {id}")]
    EmployeeNotFound {
        /// The employee id that was requested.
        id: String,
    },

    /// A collaborator (punch store, directory, adjustment store) could not be reached.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// A description of the failure reported by the collaborator.
        message: String,
    },

    /// An export sheet could not be written.
    #[error("Export failed: {message}")]
    ExportFailed {
        /// A description of the write failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidPunch`].
    pub fn invalid_punch(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidPunch {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
