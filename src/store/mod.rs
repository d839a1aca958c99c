//! Collaborator seams.
//!
//! The engine reads and writes punches, employees and adjustment fields
//! through these traits. Persistence is someone else's concern; the
//! in-memory implementations back the server and the tests.

mod memory;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{AdjustmentFields, Employee, NewPunch, Punch};

pub use memory::{InMemoryAdjustmentStore, InMemoryEmployeeDirectory, InMemoryPunchStore};

/// Append-only storage of punches.
pub trait PunchStore: Send + Sync {
    /// Stores a punch and returns its assigned id.
    fn insert(&self, punch: NewPunch) -> EngineResult<Uuid>;

    /// Returns the employee's punches with `start <= timestamp < end`, in insertion order.
    fn query_range(
        &self,
        employee_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<Vec<Punch>>;
}

/// Read access to employees.
pub trait EmployeeDirectory: Send + Sync {
    /// Active employees, in directory order.
    fn list_active(&self) -> EngineResult<Vec<Employee>>;

    /// Looks up an employee by id, active or not.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EngineError::EmployeeNotFound`] for an unknown id.
    fn get(&self, id: &str) -> EngineResult<Employee>;
}

/// Read access to the manually entered adjustment fields.
pub trait AdjustmentStore: Send + Sync {
    /// Adjustment fields keyed by employee id. Employees without any are absent.
    fn get_by_employee_ids(&self, ids: &[String]) -> EngineResult<HashMap<String, AdjustmentFields>>;
}
