use tracing::debug;

use crate::models::{Employee, EmployeePatch, NewEmployee, Role};
use crate::utils::{AdminError, Result};

/// Employee list owned entirely by the client.
///
/// Changes live only as long as the process; nothing is written anywhere.
#[derive(Debug, Clone)]
pub struct EmployeeStore {
    employees: Vec<Employee>,
}

impl Default for EmployeeStore {
    fn default() -> Self {
        Self::seeded()
    }
}

impl EmployeeStore {
    pub fn new(employees: Vec<Employee>) -> Self {
        Self { employees }
    }

    /// The list a fresh client starts with
    pub fn seeded() -> Self {
        Self::new(vec![Employee {
            id: 2,
            email: "employee@electrysure.com".to_string(),
            name: "John Doe".to_string(),
            role: Role::Employee,
            active: true,
        }])
    }

    pub fn list(&self) -> &[Employee] {
        &self.employees
    }

    pub fn get(&self, id: u32) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    /// Append with the next id after the largest one in use
    pub fn add(&mut self, employee: NewEmployee) -> Result<Employee> {
        let max = self.employees.iter().map(|e| e.id).max().unwrap_or(0);
        let id = max.checked_add(1).ok_or_else(|| {
            AdminError::ValidationError(format!("No employee id left after {}", max))
        })?;
        let employee = employee.with_id(id);
        debug!("Added employee {} ({})", employee.id, employee.email);
        self.employees.push(employee.clone());
        Ok(employee)
    }

    /// Merge `patch` into the employee with `id`; returns false if none matched
    pub fn update(&mut self, id: u32, patch: &EmployeePatch) -> bool {
        match self.employees.iter_mut().find(|e| e.id == id) {
            Some(employee) => {
                patch.apply_to(employee);
                true
            }
            None => false,
        }
    }

    /// Remove the employee with `id`; returns false if none matched
    pub fn delete(&mut self, id: u32) -> bool {
        let before = self.employees.len();
        self.employees.retain(|e| e.id != id);
        self.employees.len() != before
    }
}
