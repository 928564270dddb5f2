use chrono::{DateTime, Utc};

use super::role::Role;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Employee {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// argon2 PHC string, never leaves the server
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub location_id: Option<u64>,
    pub supervisor_id: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Insert payload, password already hashed.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub location_id: Option<u64>,
    pub supervisor_id: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    /// `Some(None)` detaches the employee from their location.
    pub location_id: Option<Option<u64>>,
    pub supervisor_id: Option<Option<u64>>,
}

impl Employee {
    pub fn apply(&mut self, changes: &EmployeeChanges, now: DateTime<Utc>) {
        if let Some(v) = &changes.first_name {
            self.first_name = v.clone();
        }
        if let Some(v) = &changes.last_name {
            self.last_name = v.clone();
        }
        if let Some(v) = &changes.email {
            self.email = v.clone();
        }
        if let Some(v) = &changes.password_hash {
            self.password_hash = v.clone();
        }
        if let Some(v) = changes.role {
            self.role = v;
        }
        if let Some(v) = changes.location_id {
            self.location_id = v;
        }
        if let Some(v) = changes.supervisor_id {
            self.supervisor_id = v;
        }
        self.updated_at = now;
    }
}

/// Emails are unique case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_email() {
        assert_eq!(normalize_email("  Jane.Doe@Company.COM "), "jane.doe@company.com");
    }

    #[test]
    fn apply_only_touches_given_fields() {
        let now = Utc::now();
        let mut emp = Employee {
            id: 1,
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@company.com".into(),
            password_hash: "hash".into(),
            role: Role::Employee,
            location_id: Some(1),
            supervisor_id: None,
            created_at: now,
            updated_at: now,
        };
        emp.apply(
            &EmployeeChanges {
                role: Some(Role::Supervisor),
                location_id: Some(Some(2)),
                ..Default::default()
            },
            now,
        );
        assert_eq!(emp.role, Role::Supervisor);
        assert_eq!(emp.location_id, Some(2));
        assert_eq!(emp.full_name(), "Jane Doe");
        assert_eq!(emp.password_hash, "hash");
    }

    #[test]
    fn apply_clears_location_and_supervisor() {
        let now = Utc::now();
        let mut emp = Employee {
            id: 4,
            first_name: "Sam".into(),
            last_name: "Doe".into(),
            email: "sam@company.com".into(),
            password_hash: "hash".into(),
            role: Role::Employee,
            location_id: Some(1),
            supervisor_id: Some(3),
            created_at: now,
            updated_at: now,
        };
        emp.apply(
            &EmployeeChanges {
                location_id: Some(None),
                ..Default::default()
            },
            now,
        );
        assert_eq!(emp.location_id, None);
        assert_eq!(emp.supervisor_id, Some(3));

        emp.apply(
            &EmployeeChanges {
                supervisor_id: Some(None),
                ..Default::default()
            },
            now,
        );
        assert_eq!(emp.supervisor_id, None);
    }
}
