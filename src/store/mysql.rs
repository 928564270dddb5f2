use async_trait::async_trait;
use chrono::Utc;
use sqlx::MySqlPool;

use super::{EmployeeFilter, RequestFilter, StoreError, StoreResult, VacationStore};
use crate::model::{
    denial_reason::{DenialReason, DenialReasonChanges, NewDenialReason},
    employee::{Employee, EmployeeChanges, NewEmployee},
    location::{Location, LocationChanges, NewLocation},
    vacation_request::{NewVacationRequest, VacationRequest},
};

const EMPLOYEE_COLUMNS: &str = "id, first_name, last_name, email, password_hash, role, \
     location_id, supervisor_id, created_at, updated_at";

const REQUEST_COLUMNS: &str = "id, employee_id, start_date, end_date, days_requested, reason, \
     status, supervisor_id, approval_date, denial_reason_id, denial_comments, denial_date, \
     created_at, updated_at";

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

/// Maps MySQL integrity violations (SQLSTATE 23000) onto `Duplicate`.
fn unique_violation(err: sqlx::Error, field: &'static str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23000") {
            return StoreError::Duplicate(field);
        }
    }
    StoreError::Database(err)
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

#[async_trait]
impl VacationStore for MySqlStore {
    fn backend_name(&self) -> &'static str {
        "mysql"
    }

    async fn list_employees(&self, filter: &EmployeeFilter) -> StoreResult<Vec<Employee>> {
        let rows = match filter.location_id {
            Some(location_id) => {
                let sql =
                    format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE location_id = ? ORDER BY id");
                sqlx::query_as::<_, Employee>(&sql)
                    .bind(location_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY id");
                sqlx::query_as::<_, Employee>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn get_employee(&self, id: u64) -> StoreResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?");
        Ok(sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_employee_by_email(&self, email: &str) -> StoreResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE email = ?");
        Ok(sqlx::query_as::<_, Employee>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_employee(&self, employee: NewEmployee) -> StoreResult<Employee> {
        let result = sqlx::query(
            r#"
            INSERT INTO employees
                (first_name, last_name, email, password_hash, role, location_id, supervisor_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(&employee.password_hash)
        .bind(employee.role.as_str())
        .bind(employee.location_id)
        .bind(employee.supervisor_id)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "email"))?;

        self.get_employee(result.last_insert_id())
            .await?
            .ok_or_else(|| StoreError::Unavailable("inserted employee vanished".into()))
    }

    async fn update_employee(
        &self,
        id: u64,
        changes: &EmployeeChanges,
    ) -> StoreResult<Option<Employee>> {
        let Some(mut employee) = self.get_employee(id).await? else {
            return Ok(None);
        };
        employee.apply(changes, Utc::now());

        sqlx::query(
            r#"
            UPDATE employees
            SET first_name = ?, last_name = ?, email = ?, password_hash = ?, role = ?,
                location_id = ?, supervisor_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(&employee.password_hash)
        .bind(employee.role.as_str())
        .bind(employee.location_id)
        .bind(employee.supervisor_id)
        .bind(employee.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "email"))?;

        Ok(Some(employee))
    }

    async fn delete_employee(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_locations(&self) -> StoreResult<Vec<Location>> {
        Ok(sqlx::query_as::<_, Location>(
            "SELECT id, name, address, created_at, updated_at FROM locations ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_location(&self, id: u64) -> StoreResult<Option<Location>> {
        Ok(sqlx::query_as::<_, Location>(
            "SELECT id, name, address, created_at, updated_at FROM locations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_location(&self, location: NewLocation) -> StoreResult<Location> {
        let result = sqlx::query("INSERT INTO locations (name, address) VALUES (?, ?)")
            .bind(&location.name)
            .bind(&location.address)
            .execute(&self.pool)
            .await
            .map_err(|e| unique_violation(e, "location name"))?;

        self.get_location(result.last_insert_id())
            .await?
            .ok_or_else(|| StoreError::Unavailable("inserted location vanished".into()))
    }

    async fn update_location(
        &self,
        id: u64,
        changes: &LocationChanges,
    ) -> StoreResult<Option<Location>> {
        let Some(mut location) = self.get_location(id).await? else {
            return Ok(None);
        };
        location.apply(changes, Utc::now());

        sqlx::query("UPDATE locations SET name = ?, address = ?, updated_at = ? WHERE id = ?")
            .bind(&location.name)
            .bind(&location.address)
            .bind(location.updated_at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| unique_violation(e, "location name"))?;

        Ok(Some(location))
    }

    async fn delete_location(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM locations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_denial_reasons(&self, active_only: bool) -> StoreResult<Vec<DenialReason>> {
        let where_sql = if active_only { " WHERE active = TRUE" } else { "" };
        let sql = format!(
            "SELECT id, reason, description, active, created_at, updated_at \
             FROM denial_reasons{where_sql} ORDER BY id"
        );
        Ok(sqlx::query_as::<_, DenialReason>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_denial_reason(&self, id: u64) -> StoreResult<Option<DenialReason>> {
        Ok(sqlx::query_as::<_, DenialReason>(
            "SELECT id, reason, description, active, created_at, updated_at \
             FROM denial_reasons WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_denial_reason(&self, reason: NewDenialReason) -> StoreResult<DenialReason> {
        let result =
            sqlx::query("INSERT INTO denial_reasons (reason, description, active) VALUES (?, ?, ?)")
                .bind(&reason.reason)
                .bind(&reason.description)
                .bind(reason.active)
                .execute(&self.pool)
                .await
                .map_err(|e| unique_violation(e, "denial reason"))?;

        self.get_denial_reason(result.last_insert_id())
            .await?
            .ok_or_else(|| StoreError::Unavailable("inserted denial reason vanished".into()))
    }

    async fn update_denial_reason(
        &self,
        id: u64,
        changes: &DenialReasonChanges,
    ) -> StoreResult<Option<DenialReason>> {
        let Some(mut reason) = self.get_denial_reason(id).await? else {
            return Ok(None);
        };
        reason.apply(changes, Utc::now());

        sqlx::query(
            "UPDATE denial_reasons SET reason = ?, description = ?, active = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&reason.reason)
        .bind(&reason.description)
        .bind(reason.active)
        .bind(reason.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "denial reason"))?;

        Ok(Some(reason))
    }

    async fn delete_denial_reason(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM denial_reasons WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_vacation_requests(
        &self,
        filter: &RequestFilter,
    ) -> StoreResult<Vec<VacationRequest>> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(ids) = &filter.employee_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            let placeholders = vec!["?"; ids.len()].join(", ");
            where_sql.push_str(&format!(" AND employee_id IN ({placeholders})"));
            args.extend(ids.iter().map(|id| FilterValue::U64(*id)));
        }

        if let Some(status) = &filter.status {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Str(status.as_str()));
        }

        let sql = format!("SELECT {REQUEST_COLUMNS} FROM vacation_requests{where_sql} ORDER BY id");
        let mut query = sqlx::query_as::<_, VacationRequest>(&sql);
        for arg in args {
            query = match arg {
                FilterValue::U64(v) => query.bind(v),
                FilterValue::Str(s) => query.bind(s),
            };
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn get_vacation_request(&self, id: u64) -> StoreResult<Option<VacationRequest>> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM vacation_requests WHERE id = ?");
        Ok(sqlx::query_as::<_, VacationRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_vacation_request(
        &self,
        request: NewVacationRequest,
    ) -> StoreResult<VacationRequest> {
        let result = sqlx::query(
            r#"
            INSERT INTO vacation_requests
                (employee_id, start_date, end_date, days_requested, reason, status)
            VALUES (?, ?, ?, ?, ?, 'pending')
            "#,
        )
        .bind(request.employee_id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.days_requested)
        .bind(&request.reason)
        .execute(&self.pool)
        .await?;

        self.get_vacation_request(result.last_insert_id())
            .await?
            .ok_or_else(|| StoreError::Unavailable("inserted vacation request vanished".into()))
    }

    async fn save_vacation_request(&self, request: &VacationRequest) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE vacation_requests
            SET status = ?, supervisor_id = ?, approval_date = ?, denial_reason_id = ?,
                denial_comments = ?, denial_date = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(request.status.as_str())
        .bind(request.supervisor_id)
        .bind(request.approval_date)
        .bind(request.denial_reason_id)
        .bind(&request.denial_comments)
        .bind(request.denial_date)
        .bind(request.updated_at)
        .bind(request.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
