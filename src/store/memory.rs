//! In-memory collaborators guarded by `RwLock`.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{AdjustmentFields, Employee, NewPunch, Punch};

use super::{AdjustmentStore, EmployeeDirectory, PunchStore};

fn poisoned<T>(_: PoisonError<T>) -> EngineError {
    EngineError::StoreUnavailable {
        message: "in-memory store lock poisoned".to_string(),
    }
}

/// Punch store backed by a vector.
#[derive(Debug, Default)]
pub struct InMemoryPunchStore {
    punches: RwLock<Vec<Punch>>,
}

impl InMemoryPunchStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored punches.
    pub fn len(&self) -> EngineResult<usize> {
        Ok(self.punches.read().map_err(poisoned)?.len())
    }

    /// Returns true if nothing has been stored.
    pub fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl PunchStore for InMemoryPunchStore {
    fn insert(&self, punch: NewPunch) -> EngineResult<Uuid> {
        let id = Uuid::new_v4();
        self.punches.write().map_err(poisoned)?.push(Punch {
            id,
            employee_id: punch.employee_id,
            kind: punch.kind,
            timestamp: punch.timestamp,
            location_label: punch.location_label,
            terminal: punch.terminal,
        });
        Ok(id)
    }

    fn query_range(
        &self,
        employee_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<Vec<Punch>> {
        let punches = self.punches.read().map_err(poisoned)?;
        Ok(punches
            .iter()
            .filter(|p| p.employee_id == employee_id && p.timestamp >= start && p.timestamp < end)
            .cloned()
            .collect())
    }
}

/// Employee directory backed by a vector, in roster order.
#[derive(Debug, Default)]
pub struct InMemoryEmployeeDirectory {
    employees: RwLock<Vec<Employee>>,
}

impl InMemoryEmployeeDirectory {
    /// Creates a directory holding `employees`.
    pub fn new(employees: Vec<Employee>) -> Self {
        Self {
            employees: RwLock::new(employees),
        }
    }

    /// Adds or replaces an employee.
    pub fn upsert(&self, employee: Employee) -> EngineResult<()> {
        let mut employees = self.employees.write().map_err(poisoned)?;
        match employees.iter_mut().find(|e| e.id == employee.id) {
            Some(existing) => *existing = employee,
            None => employees.push(employee),
        }
        Ok(())
    }
}

impl EmployeeDirectory for InMemoryEmployeeDirectory {
    fn list_active(&self) -> EngineResult<Vec<Employee>> {
        let employees = self.employees.read().map_err(poisoned)?;
        Ok(employees.iter().filter(|e| e.is_active).cloned().collect())
    }

    fn get(&self, id: &str) -> EngineResult<Employee> {
        let employees = self.employees.read().map_err(poisoned)?;
        employees
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| EngineError::EmployeeNotFound { id: id.to_string() })
    }
}

/// Adjustment store keyed by employee id.
#[derive(Debug, Default)]
pub struct InMemoryAdjustmentStore {
    adjustments: RwLock<HashMap<String, AdjustmentFields>>,
}

impl InMemoryAdjustmentStore {
    /// Creates a store from a list of records. Later records win on duplicate ids.
    pub fn new(adjustments: Vec<AdjustmentFields>) -> Self {
        Self {
            adjustments: RwLock::new(
                adjustments
                    .into_iter()
                    .map(|a| (a.employee_id.clone(), a))
                    .collect(),
            ),
        }
    }

    /// Sets an employee's adjustment fields.
    pub fn upsert(&self, fields: AdjustmentFields) -> EngineResult<()> {
        self.adjustments
            .write()
            .map_err(poisoned)?
            .insert(fields.employee_id.clone(), fields);
        Ok(())
    }
}

impl AdjustmentStore for InMemoryAdjustmentStore {
    fn get_by_employee_ids(&self, ids: &[String]) -> EngineResult<HashMap<String, AdjustmentFields>> {
        let adjustments = self.adjustments.read().map_err(poisoned)?;
        Ok(ids
            .iter()
            .filter_map(|id| adjustments.get(id).map(|a| (id.clone(), a.clone())))
            .collect())
    }
}
