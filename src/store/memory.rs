use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{EmployeeFilter, RequestFilter, StoreError, StoreResult, VacationStore};
use crate::model::{
    denial_reason::{DenialReason, DenialReasonChanges, NewDenialReason},
    employee::{Employee, EmployeeChanges, NewEmployee},
    location::{Location, LocationChanges, NewLocation},
    vacation_request::{NewVacationRequest, VacationRequest},
};

#[derive(Default)]
struct Tables {
    next_id: u64,
    employees: Vec<Employee>,
    locations: Vec<Location>,
    denial_reasons: Vec<DenialReason>,
    vacation_requests: Vec<VacationRequest>,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local store; contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

fn remove_by_id<T>(rows: &mut Vec<T>, id: u64, key: impl Fn(&T) -> u64) -> bool {
    match rows.iter().position(|row| key(row) == id) {
        Some(idx) => {
            rows.remove(idx);
            true
        }
        None => false,
    }
}

#[async_trait]
impl VacationStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "in-memory"
    }

    async fn list_employees(&self, filter: &EmployeeFilter) -> StoreResult<Vec<Employee>> {
        let tables = self.read()?;
        Ok(tables
            .employees
            .iter()
            .filter(|e| filter.location_id.is_none_or(|loc| e.location_id == Some(loc)))
            .cloned()
            .collect())
    }

    async fn get_employee(&self, id: u64) -> StoreResult<Option<Employee>> {
        Ok(self.read()?.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn find_employee_by_email(&self, email: &str) -> StoreResult<Option<Employee>> {
        Ok(self
            .read()?
            .employees
            .iter()
            .find(|e| e.email == email)
            .cloned())
    }

    async fn insert_employee(&self, employee: NewEmployee) -> StoreResult<Employee> {
        let mut tables = self.write()?;
        if tables.employees.iter().any(|e| e.email == employee.email) {
            return Err(StoreError::Duplicate("email"));
        }
        let now = Utc::now();
        let row = Employee {
            id: tables.next_id(),
            first_name: employee.first_name,
            last_name: employee.last_name,
            email: employee.email,
            password_hash: employee.password_hash,
            role: employee.role,
            location_id: employee.location_id,
            supervisor_id: employee.supervisor_id,
            created_at: now,
            updated_at: now,
        };
        tables.employees.push(row.clone());
        Ok(row)
    }

    async fn update_employee(
        &self,
        id: u64,
        changes: &EmployeeChanges,
    ) -> StoreResult<Option<Employee>> {
        let mut tables = self.write()?;
        if let Some(email) = &changes.email {
            if tables.employees.iter().any(|e| e.id != id && &e.email == email) {
                return Err(StoreError::Duplicate("email"));
            }
        }
        Ok(tables.employees.iter_mut().find(|e| e.id == id).map(|e| {
            e.apply(changes, Utc::now());
            e.clone()
        }))
    }

    async fn delete_employee(&self, id: u64) -> StoreResult<bool> {
        Ok(remove_by_id(&mut self.write()?.employees, id, |e| e.id))
    }

    async fn list_locations(&self) -> StoreResult<Vec<Location>> {
        Ok(self.read()?.locations.clone())
    }

    async fn get_location(&self, id: u64) -> StoreResult<Option<Location>> {
        Ok(self.read()?.locations.iter().find(|l| l.id == id).cloned())
    }

    async fn insert_location(&self, location: NewLocation) -> StoreResult<Location> {
        let mut tables = self.write()?;
        if tables.locations.iter().any(|l| l.name == location.name) {
            return Err(StoreError::Duplicate("location name"));
        }
        let now = Utc::now();
        let row = Location {
            id: tables.next_id(),
            name: location.name,
            address: location.address,
            created_at: now,
            updated_at: now,
        };
        tables.locations.push(row.clone());
        Ok(row)
    }

    async fn update_location(
        &self,
        id: u64,
        changes: &LocationChanges,
    ) -> StoreResult<Option<Location>> {
        let mut tables = self.write()?;
        if let Some(name) = &changes.name {
            if tables.locations.iter().any(|l| l.id != id && &l.name == name) {
                return Err(StoreError::Duplicate("location name"));
            }
        }
        Ok(tables.locations.iter_mut().find(|l| l.id == id).map(|l| {
            l.apply(changes, Utc::now());
            l.clone()
        }))
    }

    async fn delete_location(&self, id: u64) -> StoreResult<bool> {
        Ok(remove_by_id(&mut self.write()?.locations, id, |l| l.id))
    }

    async fn list_denial_reasons(&self, active_only: bool) -> StoreResult<Vec<DenialReason>> {
        Ok(self
            .read()?
            .denial_reasons
            .iter()
            .filter(|r| !active_only || r.active)
            .cloned()
            .collect())
    }

    async fn get_denial_reason(&self, id: u64) -> StoreResult<Option<DenialReason>> {
        Ok(self
            .read()?
            .denial_reasons
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn insert_denial_reason(&self, reason: NewDenialReason) -> StoreResult<DenialReason> {
        let mut tables = self.write()?;
        if tables.denial_reasons.iter().any(|r| r.reason == reason.reason) {
            return Err(StoreError::Duplicate("denial reason"));
        }
        let now = Utc::now();
        let row = DenialReason {
            id: tables.next_id(),
            reason: reason.reason,
            description: reason.description,
            active: reason.active,
            created_at: now,
            updated_at: now,
        };
        tables.denial_reasons.push(row.clone());
        Ok(row)
    }

    async fn update_denial_reason(
        &self,
        id: u64,
        changes: &DenialReasonChanges,
    ) -> StoreResult<Option<DenialReason>> {
        let mut tables = self.write()?;
        if let Some(reason) = &changes.reason {
            if tables
                .denial_reasons
                .iter()
                .any(|r| r.id != id && &r.reason == reason)
            {
                return Err(StoreError::Duplicate("denial reason"));
            }
        }
        Ok(tables.denial_reasons.iter_mut().find(|r| r.id == id).map(|r| {
            r.apply(changes, Utc::now());
            r.clone()
        }))
    }

    async fn delete_denial_reason(&self, id: u64) -> StoreResult<bool> {
        Ok(remove_by_id(&mut self.write()?.denial_reasons, id, |r| r.id))
    }

    async fn list_vacation_requests(
        &self,
        filter: &RequestFilter,
    ) -> StoreResult<Vec<VacationRequest>> {
        Ok(self
            .read()?
            .vacation_requests
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn get_vacation_request(&self, id: u64) -> StoreResult<Option<VacationRequest>> {
        Ok(self
            .read()?
            .vacation_requests
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn insert_vacation_request(
        &self,
        request: NewVacationRequest,
    ) -> StoreResult<VacationRequest> {
        let mut tables = self.write()?;
        let row = VacationRequest::pending(tables.next_id(), request, Utc::now());
        tables.vacation_requests.push(row.clone());
        Ok(row)
    }

    async fn save_vacation_request(&self, request: &VacationRequest) -> StoreResult<bool> {
        let mut tables = self.write()?;
        match tables
            .vacation_requests
            .iter_mut()
            .find(|r| r.id == request.id)
        {
            Some(row) => {
                *row = request.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{role::Role, vacation_request::VacationStatus};
    use chrono::NaiveDate;

    fn new_employee(email: &str, location_id: Option<u64>) -> NewEmployee {
        NewEmployee {
            first_name: "Test".into(),
            last_name: "User".into(),
            email: email.into(),
            password_hash: "hash".into(),
            role: Role::Employee,
            location_id,
            supervisor_id: None,
        }
    }

    #[actix_web::test]
    async fn rejects_duplicate_email() {
        let store = MemoryStore::new();
        store
            .insert_employee(new_employee("a@company.com", None))
            .await
            .unwrap();
        let err = store
            .insert_employee(new_employee("a@company.com", None))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("email")));
    }

    #[actix_web::test]
    async fn update_cannot_steal_another_email() {
        let store = MemoryStore::new();
        store
            .insert_employee(new_employee("a@company.com", None))
            .await
            .unwrap();
        let b = store
            .insert_employee(new_employee("b@company.com", None))
            .await
            .unwrap();
        let changes = EmployeeChanges {
            email: Some("a@company.com".into()),
            ..Default::default()
        };
        assert!(store.update_employee(b.id, &changes).await.is_err());
        assert!(store.update_employee(999, &EmployeeChanges::default()).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn filters_employees_by_location() {
        let store = MemoryStore::new();
        store
            .insert_employee(new_employee("a@company.com", Some(1)))
            .await
            .unwrap();
        store
            .insert_employee(new_employee("b@company.com", Some(2)))
            .await
            .unwrap();
        let filter = EmployeeFilter {
            location_id: Some(2),
        };
        let found = store.list_employees(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "b@company.com");
    }

    #[actix_web::test]
    async fn request_filter_scopes_by_employee_and_status() {
        let store = MemoryStore::new();
        let day = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        for employee_id in [1, 2, 1] {
            let draft = NewVacationRequest::new(employee_id, day, day, None).unwrap();
            store.insert_vacation_request(draft).await.unwrap();
        }

        let mine = RequestFilter {
            employee_ids: Some(vec![1]),
            status: None,
        };
        assert_eq!(store.list_vacation_requests(&mine).await.unwrap().len(), 2);

        let nobody = RequestFilter {
            employee_ids: Some(vec![]),
            status: None,
        };
        assert!(store.list_vacation_requests(&nobody).await.unwrap().is_empty());

        let approved = RequestFilter {
            employee_ids: None,
            status: Some(VacationStatus::Approved),
        };
        assert!(store.list_vacation_requests(&approved).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn delete_reports_missing_rows() {
        let store = MemoryStore::new();
        let loc = store
            .insert_location(NewLocation {
                name: "Remote".into(),
                address: None,
            })
            .await
            .unwrap();
        assert!(store.delete_location(loc.id).await.unwrap());
        assert!(!store.delete_location(loc.id).await.unwrap());
    }
}
