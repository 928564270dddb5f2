use std::collections::HashMap;

use crate::{
    auth::{
        auth::AuthUser,
        password::hash_password,
        policy::{Owner, Scope, ensure_can_access, scope_for},
    },
    error::AppError,
    model::{
        employee::{Employee, EmployeeChanges, NewEmployee, normalize_email},
        location::Location,
        nullable,
        role::Role,
    },
    store::{EmployeeFilter, VacationStore},
};
use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Jane")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "jane.doe@company.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = "password")]
    pub password: String,
    /// defaults to `employee`
    pub role: Option<Role>,
    #[schema(example = 1)]
    pub location_id: Option<u64>,
    #[schema(example = 2)]
    pub supervisor_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    /// `null` removes the employee from their location
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<u64>, nullable = true)]
    pub location_id: Option<Option<u64>>,
    /// `null` removes the supervisor
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<u64>, nullable = true)]
    pub supervisor_id: Option<Option<u64>>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Jane")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    #[schema(example = "jane.doe@company.com")]
    pub email: String,
    pub role: Role,
    pub location_id: Option<u64>,
    #[schema(example = "New York Office")]
    pub location_name: Option<String>,
    pub supervisor_id: Option<u64>,
    #[schema(example = "Sam Lead")]
    pub supervisor_name: Option<String>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl EmployeeResponse {
    fn build(
        employee: Employee,
        locations: &HashMap<u64, Location>,
        supervisors: &HashMap<u64, String>,
    ) -> Self {
        Self {
            full_name: employee.full_name(),
            location_name: employee
                .location_id
                .and_then(|id| locations.get(&id))
                .map(|l| l.name.clone()),
            supervisor_name: employee
                .supervisor_id
                .and_then(|id| supervisors.get(&id))
                .cloned(),
            id: employee.id,
            first_name: employee.first_name,
            last_name: employee.last_name,
            email: employee.email,
            role: employee.role,
            location_id: employee.location_id,
            supervisor_id: employee.supervisor_id,
            created_at: employee.created_at,
            updated_at: employee.updated_at,
        }
    }

    /// Resolves the referenced location and supervisor for a single row.
    async fn resolve(store: &dyn VacationStore, employee: Employee) -> Result<Self, AppError> {
        let mut locations = HashMap::new();
        if let Some(location) = match employee.location_id {
            Some(id) => store.get_location(id).await?,
            None => None,
        } {
            locations.insert(location.id, location);
        }

        let mut supervisors = HashMap::new();
        if let Some(supervisor) = match employee.supervisor_id {
            Some(id) => store.get_employee(id).await?,
            None => None,
        } {
            supervisors.insert(supervisor.id, supervisor.full_name());
        }

        Ok(Self::build(employee, &locations, &supervisors))
    }
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn valid_email(raw: &str) -> Result<String, AppError> {
    let email = normalize_email(raw);
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::validation("email is not a valid address")),
    }
}

fn hashed(password: &str) -> Result<String, AppError> {
    if password.is_empty() {
        return Err(AppError::validation("password is required"));
    }
    hash_password(password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        AppError::Internal(e.to_string())
    })
}

async fn check_references(
    store: &dyn VacationStore,
    location_id: Option<u64>,
    supervisor_id: Option<u64>,
) -> Result<(), AppError> {
    if let Some(id) = location_id {
        if store.get_location(id).await?.is_none() {
            return Err(AppError::validation("location_id does not reference an existing location"));
        }
    }
    if let Some(id) = supervisor_id {
        if store.get_employee(id).await?.is_none() {
            return Err(AppError::validation(
                "supervisor_id does not reference an existing employee",
            ));
        }
    }
    Ok(())
}

/// List employees, supervisors only see their own location
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "Employees in the caller's scope", body = [EmployeeResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    auth: AuthUser,
    store: web::Data<dyn VacationStore>,
) -> Result<HttpResponse, AppError> {
    auth.require_supervisor_or_admin()?;

    let filter = match scope_for(&auth) {
        Scope::All => EmployeeFilter::default(),
        Scope::Location(location_id) => EmployeeFilter {
            location_id: Some(location_id),
        },
        Scope::Own(_) | Scope::Nothing => return Ok(HttpResponse::Ok().json(json!([]))),
    };

    let employees = store.list_employees(&filter).await?;
    let locations: HashMap<u64, Location> = store
        .list_locations()
        .await?
        .into_iter()
        .map(|l| (l.id, l))
        .collect();
    let supervisors: HashMap<u64, String> = store
        .list_employees(&EmployeeFilter::default())
        .await?
        .iter()
        .filter(|e| e.role != Role::Employee)
        .map(|e| (e.id, e.full_name()))
        .collect();

    let data: Vec<EmployeeResponse> = employees
        .into_iter()
        .map(|e| EmployeeResponse::build(e, &locations, &supervisors))
        .collect();

    Ok(HttpResponse::Ok().json(data))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = EmployeeResponse),
        (status = 403, description = "Outside the caller's location"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "error": "Employee not found"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    auth: AuthUser,
    store: web::Data<dyn VacationStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_supervisor_or_admin()?;

    let employee = store
        .get_employee(path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Employee not found"))?;
    ensure_can_access(&auth, Owner::from(&employee))?;

    Ok(HttpResponse::Ok().json(EmployeeResponse::resolve(store.get_ref(), employee).await?))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = EmployeeResponse),
        (status = 400, description = "Invalid payload or dangling reference"),
        (status = 409, description = "Email already exists")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    store: web::Data<dyn VacationStore>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let payload = payload.into_inner();

    let new_employee = NewEmployee {
        first_name: required("first_name", &payload.first_name)?,
        last_name: required("last_name", &payload.last_name)?,
        email: valid_email(&payload.email)?,
        password_hash: hashed(&payload.password)?,
        role: payload.role.unwrap_or_default(),
        location_id: payload.location_id,
        supervisor_id: payload.supervisor_id,
    };
    check_references(store.get_ref(), new_employee.location_id, new_employee.supervisor_id)
        .await?;

    let employee = store.insert_employee(new_employee).await?;
    info!(employee_id = employee.id, created_by = auth.user_id, "Employee created");

    Ok(HttpResponse::Created().json(EmployeeResponse::resolve(store.get_ref(), employee).await?))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = EmployeeResponse),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Email already exists")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    store: web::Data<dyn VacationStore>,
    path: web::Path<u64>,
    payload: web::Json<UpdateEmployee>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let employee_id = path.into_inner();
    let payload = payload.into_inner();

    let changes = EmployeeChanges {
        first_name: payload
            .first_name
            .as_deref()
            .map(|v| required("first_name", v))
            .transpose()?,
        last_name: payload
            .last_name
            .as_deref()
            .map(|v| required("last_name", v))
            .transpose()?,
        email: payload.email.as_deref().map(valid_email).transpose()?,
        password_hash: payload.password.as_deref().map(hashed).transpose()?,
        role: payload.role,
        location_id: payload.location_id,
        supervisor_id: payload.supervisor_id,
    };
    if changes.supervisor_id == Some(Some(employee_id)) {
        return Err(AppError::validation("an employee cannot supervise themselves"));
    }
    check_references(
        store.get_ref(),
        changes.location_id.flatten(),
        changes.supervisor_id.flatten(),
    )
    .await?;

    let employee = store
        .update_employee(employee_id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("Employee not found"))?;

    Ok(HttpResponse::Ok().json(EmployeeResponse::resolve(store.get_ref(), employee).await?))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Employee deleted successfully"
        })),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    auth: AuthUser,
    store: web::Data<dyn VacationStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let employee_id = path.into_inner();

    if !store.delete_employee(employee_id).await? {
        return Err(AppError::not_found("Employee not found"));
    }
    info!(employee_id, deleted_by = auth.user_id, "Employee deleted");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted successfully"
    })))
}
