//! Employee model.
//!
//! The engine never manages employees; it consumes the directory's view of
//! them when building exports and recognition rosters.

use serde::{Deserialize, Serialize};

fn default_active() -> bool {
    true
}

/// An employee as listed by the employee directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Job (cargo) identifier.
    #[serde(default)]
    pub job_id: Option<String>,
    /// Job (cargo) display name.
    #[serde(default)]
    pub job_name: Option<String>,
    /// Assigned schedule identifier.
    #[serde(default)]
    pub schedule_id: Option<String>,
    /// Work location identifier.
    #[serde(default)]
    pub location_id: Option<String>,
    /// Work location display name, shown as the employee's team.
    #[serde(default)]
    pub location_name: Option<String>,
    /// URL of the reference photo used by face recognition.
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Whether the employee is active.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Employee {
    /// Creates an active employee with only an id and a name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            job_id: None,
            job_name: None,
            schedule_id: None,
            location_id: None,
            location_name: None,
            photo_url: None,
            is_active: true,
        }
    }

    /// Returns true if the employee has a usable reference photo.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::models::Employee;
    ///
    /// let mut employee = Employee::new("emp_001", "Ana Souza");
    /// assert!(!employee.has_facial_photo());
    ///
    /// employee.photo_url = Some("   ".to_string());
    /// assert!(!employee.has_facial_photo());
    ///
    /// employee.photo_url = Some("https://cdn.example.com/ana.jpg".to_string());
    /// assert!(employee.has_facial_photo());
    /// ```
    pub fn has_facial_photo(&self) -> bool {
        self.photo_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}
