//! Application state for the attendance engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::store::{
    AdjustmentStore, EmployeeDirectory, InMemoryAdjustmentStore, InMemoryEmployeeDirectory,
    InMemoryPunchStore, PunchStore,
};

/// Shared application state.
///
/// Holds the loaded configuration and the collaborators the handlers read
/// and write through.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    punches: Arc<dyn PunchStore>,
    directory: Arc<dyn EmployeeDirectory>,
    adjustments: Arc<dyn AdjustmentStore>,
}

impl AppState {
    /// Creates a state backed by in-memory stores seeded from the configured roster.
    pub fn new(config: ConfigLoader) -> Self {
        let directory = InMemoryEmployeeDirectory::new(config.employees().to_vec());
        let adjustments = InMemoryAdjustmentStore::new(config.adjustments().to_vec());
        Self::with_stores(
            config,
            Arc::new(InMemoryPunchStore::new()),
            Arc::new(directory),
            Arc::new(adjustments),
        )
    }

    /// Creates a state over the given collaborators.
    pub fn with_stores(
        config: ConfigLoader,
        punches: Arc<dyn PunchStore>,
        directory: Arc<dyn EmployeeDirectory>,
        adjustments: Arc<dyn AdjustmentStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            punches,
            directory,
            adjustments,
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// The punch store.
    pub fn punches(&self) -> &dyn PunchStore {
        self.punches.as_ref()
    }

    /// The employee directory.
    pub fn directory(&self) -> &dyn EmployeeDirectory {
        self.directory.as_ref()
    }

    /// The adjustment-fields store.
    pub fn adjustments(&self) -> &dyn AdjustmentStore {
        self.adjustments.as_ref()
    }
}
