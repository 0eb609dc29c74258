use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::AdminError;

/// Authorization role; the only dimension access checks look at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "employee" => Ok(Self::Employee),
            other => Err(AdminError::ValidationError(format!(
                "Unknown role '{}', expected 'admin' or 'employee'",
                other
            ))),
        }
    }
}

/// A signed-in user, or an entry of the employee list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub active: bool,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Employees share the user record shape
pub type Employee = User;

/// Employee payload before an id has been assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub active: bool,
}

impl NewEmployee {
    pub fn with_id(self, id: u32) -> Employee {
        Employee {
            id,
            email: self.email,
            name: self.name,
            role: self.role,
            active: self.active,
        }
    }
}

/// Partial update; `None` fields are left as they are
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl EmployeePatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none() && self.role.is_none() && self.active.is_none()
    }

    /// Merge the present fields into `employee`; the id is never touched
    pub fn apply_to(&self, employee: &mut Employee) {
        if let Some(email) = &self.email {
            employee.email = email.clone();
        }
        if let Some(name) = &self.name {
            employee.name = name.clone();
        }
        if let Some(role) = self.role {
            employee.role = role;
        }
        if let Some(active) = self.active {
            employee.active = active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_user_json_shape() {
        let user = User {
            id: 1,
            email: "admin@electrysure.com".to_string(),
            name: "Admin".to_string(),
            role: Role::Admin,
            active: true,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "email": "admin@electrysure.com",
                "name": "Admin",
                "role": "admin",
                "active": true
            })
        );
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" Employee ".parse::<Role>().unwrap(), Role::Employee);
        assert!("manager".parse::<Role>().is_err());
    }

    #[test]
    fn test_patch_merges_only_present_fields() {
        let mut employee = NewEmployee {
            email: "a@electrysure.com".to_string(),
            name: "A".to_string(),
            role: Role::Employee,
            active: true,
        }
        .with_id(7);

        let patch = EmployeePatch {
            active: Some(false),
            ..Default::default()
        };
        patch.apply_to(&mut employee);

        assert_eq!(employee.id, 7);
        assert_eq!(employee.name, "A");
        assert!(!employee.active);
        assert!(EmployeePatch::default().is_empty());
        assert!(!patch.is_empty());
    }
}
