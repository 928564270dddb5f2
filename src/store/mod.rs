//! Repository seam between the workflow and persistence.
//!
//! Handlers and services only ever see `dyn VacationStore`; the concrete
//! backend is picked once at startup from `STORE_BACKEND`.

use async_trait::async_trait;
use derive_more::Display;

use crate::model::{
    denial_reason::{DenialReason, DenialReasonChanges, NewDenialReason},
    employee::{Employee, EmployeeChanges, NewEmployee},
    location::{Location, LocationChanges, NewLocation},
    vacation_request::{NewVacationRequest, VacationRequest, VacationStatus},
};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Display)]
pub enum StoreError {
    /// A unique column already holds this value.
    #[display(fmt = "{} already exists", _0)]
    Duplicate(&'static str),
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
    #[display(fmt = "store unavailable: {}", _0)]
    Unavailable(String),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub location_id: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    /// `None` means every employee; `Some(vec![])` matches nothing.
    pub employee_ids: Option<Vec<u64>>,
    pub status: Option<VacationStatus>,
}

impl RequestFilter {
    pub fn matches(&self, request: &VacationRequest) -> bool {
        let by_employee = self
            .employee_ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&request.employee_id));
        let by_status = self.status.is_none_or(|s| s == request.status);
        by_employee && by_status
    }
}

/// Every list call returns rows in insertion (id) order.
#[async_trait]
pub trait VacationStore: Send + Sync + 'static {
    fn backend_name(&self) -> &'static str;

    async fn list_employees(&self, filter: &EmployeeFilter) -> StoreResult<Vec<Employee>>;
    async fn get_employee(&self, id: u64) -> StoreResult<Option<Employee>>;
    async fn find_employee_by_email(&self, email: &str) -> StoreResult<Option<Employee>>;
    async fn insert_employee(&self, employee: NewEmployee) -> StoreResult<Employee>;
    async fn update_employee(
        &self,
        id: u64,
        changes: &EmployeeChanges,
    ) -> StoreResult<Option<Employee>>;
    async fn delete_employee(&self, id: u64) -> StoreResult<bool>;

    async fn list_locations(&self) -> StoreResult<Vec<Location>>;
    async fn get_location(&self, id: u64) -> StoreResult<Option<Location>>;
    async fn insert_location(&self, location: NewLocation) -> StoreResult<Location>;
    async fn update_location(
        &self,
        id: u64,
        changes: &LocationChanges,
    ) -> StoreResult<Option<Location>>;
    async fn delete_location(&self, id: u64) -> StoreResult<bool>;

    async fn list_denial_reasons(&self, active_only: bool) -> StoreResult<Vec<DenialReason>>;
    async fn get_denial_reason(&self, id: u64) -> StoreResult<Option<DenialReason>>;
    async fn insert_denial_reason(&self, reason: NewDenialReason) -> StoreResult<DenialReason>;
    async fn update_denial_reason(
        &self,
        id: u64,
        changes: &DenialReasonChanges,
    ) -> StoreResult<Option<DenialReason>>;
    async fn delete_denial_reason(&self, id: u64) -> StoreResult<bool>;

    async fn list_vacation_requests(
        &self,
        filter: &RequestFilter,
    ) -> StoreResult<Vec<VacationRequest>>;
    async fn get_vacation_request(&self, id: u64) -> StoreResult<Option<VacationRequest>>;
    async fn insert_vacation_request(
        &self,
        request: NewVacationRequest,
    ) -> StoreResult<VacationRequest>;
    /// Persists the workflow columns of an existing request.
    async fn save_vacation_request(&self, request: &VacationRequest) -> StoreResult<bool>;
}
