//! Row-level authorization.
//!
//! Every protected handler funnels its ownership decision through
//! [`authorize`] and its list queries through [`scope_for`], so the role
//! rules live in exactly one place.

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::{employee::Employee, role::Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Which rows a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    /// Employees (and their requests) at this location.
    Location(u64),
    /// Only the caller's own rows.
    Own(u64),
    Nothing,
}

/// The resource owner as far as the policy is concerned.
#[derive(Debug, Clone, Copy)]
pub struct Owner {
    pub employee_id: u64,
    pub location_id: Option<u64>,
}

impl From<&Employee> for Owner {
    fn from(employee: &Employee) -> Self {
        Owner {
            employee_id: employee.id,
            location_id: employee.location_id,
        }
    }
}

pub fn scope_for(actor: &AuthUser) -> Scope {
    match actor.role {
        Role::Administrator => Scope::All,
        Role::Supervisor => match actor.location_id {
            Some(location_id) => Scope::Location(location_id),
            None => Scope::Nothing,
        },
        Role::Employee => Scope::Own(actor.user_id),
    }
}

impl Scope {
    pub fn contains(&self, owner: Owner) -> bool {
        match *self {
            Scope::All => true,
            Scope::Location(location_id) => owner.location_id == Some(location_id),
            Scope::Own(employee_id) => owner.employee_id == employee_id,
            Scope::Nothing => false,
        }
    }
}

pub fn authorize(actor: &AuthUser, owner: Owner) -> Decision {
    if scope_for(actor).contains(owner) {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// `authorize` for handlers: a denial becomes a 403.
pub fn ensure_can_access(actor: &AuthUser, owner: Owner) -> Result<(), AppError> {
    match authorize(actor, owner) {
        Decision::Allow => Ok(()),
        Decision::Deny => {
            tracing::info!(
                user_id = actor.user_id,
                email = %actor.email,
                role = %actor.role,
                owner_id = owner.employee_id,
                "Access denied by location/ownership scope"
            );
            Err(AppError::forbidden("Forbidden"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role, user_id: u64, location_id: Option<u64>) -> AuthUser {
        AuthUser {
            user_id,
            email: format!("{user_id}@company.com"),
            role,
            location_id,
        }
    }

    fn owner(employee_id: u64, location_id: Option<u64>) -> Owner {
        Owner {
            employee_id,
            location_id,
        }
    }

    #[test]
    fn administrators_see_everything() {
        let admin = actor(Role::Administrator, 1, None);
        assert_eq!(authorize(&admin, owner(9, Some(4))), Decision::Allow);
        assert_eq!(authorize(&admin, owner(9, None)), Decision::Allow);
    }

    #[test]
    fn supervisors_are_bound_to_their_location() {
        let sup = actor(Role::Supervisor, 2, Some(1));
        assert_eq!(authorize(&sup, owner(9, Some(1))), Decision::Allow);
        assert_eq!(authorize(&sup, owner(9, Some(2))), Decision::Deny);
        assert_eq!(authorize(&sup, owner(9, None)), Decision::Deny);
    }

    #[test]
    fn supervisor_without_location_sees_nothing() {
        let sup = actor(Role::Supervisor, 2, None);
        assert_eq!(scope_for(&sup), Scope::Nothing);
        assert_eq!(authorize(&sup, owner(9, None)), Decision::Deny);
    }

    #[test]
    fn employees_only_see_themselves() {
        let emp = actor(Role::Employee, 5, Some(1));
        assert_eq!(authorize(&emp, owner(5, Some(1))), Decision::Allow);
        assert_eq!(authorize(&emp, owner(6, Some(1))), Decision::Deny);
    }

    #[test]
    fn denial_maps_to_forbidden() {
        let emp = actor(Role::Employee, 5, Some(1));
        assert!(matches!(
            ensure_can_access(&emp, owner(6, Some(1))),
            Err(AppError::Authorization(_))
        ));
    }
}
