use crate::api::{
    dashboard, denial_reason, employee, health, location, vacation_request,
    employee::{CreateEmployee, EmployeeResponse, UpdateEmployee},
    health::HealthResponse,
    vacation_request::{
        CreateVacationRequest, DenyVacationRequest, VacationRequestListResponse,
        VacationRequestView,
    },
};
use crate::auth::handlers::{self, LoginResponse, LoginUser};
use crate::model::{
    denial_reason::{DenialReason, DenialReasonChanges, NewDenialReason},
    location::{Location, LocationChanges, NewLocation},
    role::Role,
    vacation_request::VacationStatus,
};
use crate::models::LoginReqDto;
use crate::service::dashboard::{
    DashboardActivity, DashboardStats, DenialReasonStats, EmployeeStats, LocationStats,
    RecentRequest, RequestStats, SystemStats, TopRequester,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vacation Management API",
        version = "1.0.0",
        description = r#"
## Vacation Management System

Employees file vacation requests, supervisors approve or deny them for their
own location and administrators manage the reference data.

### Key Features
- **Vacation Requests**
  - File, list (paginated, newest first), approve and deny
- **Employees, Locations, Denial Reasons**
  - Administrator managed reference data
- **Dashboard**
  - Request statistics and top requesters, scoped to the caller

### Security
All endpoints except login and health require a **JWT Bearer** token
obtained from `POST /api/login`.
"#,
    ),
    paths(
        handlers::login,

        employee::list_employees,
        employee::get_employee,
        employee::create_employee,
        employee::update_employee,
        employee::delete_employee,

        location::list_locations,
        location::create_location,
        location::update_location,
        location::delete_location,

        denial_reason::list_denial_reasons,
        denial_reason::create_denial_reason,
        denial_reason::update_denial_reason,
        denial_reason::delete_denial_reason,

        vacation_request::list_vacation_requests,
        vacation_request::create_vacation_request,
        vacation_request::approve_vacation_request,
        vacation_request::deny_vacation_request,

        dashboard::stats,
        dashboard::activity,

        health::health
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            LoginUser,
            Role,
            CreateEmployee,
            UpdateEmployee,
            EmployeeResponse,
            Location,
            NewLocation,
            LocationChanges,
            DenialReason,
            NewDenialReason,
            DenialReasonChanges,
            VacationStatus,
            CreateVacationRequest,
            DenyVacationRequest,
            VacationRequestView,
            VacationRequestListResponse,
            DashboardStats,
            EmployeeStats,
            LocationStats,
            RequestStats,
            RecentRequest,
            DenialReasonStats,
            SystemStats,
            DashboardActivity,
            TopRequester,
            HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Session tokens"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Location", description = "Location management APIs"),
        (name = "DenialReason", description = "Denial reason management APIs"),
        (name = "VacationRequest", description = "Vacation request workflow"),
        (name = "Dashboard", description = "Scoped statistics"),
        (name = "Health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_workflow_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/vacation-requests/{request_id}/deny"));
        assert!(doc.paths.paths.contains_key("/api/login"));
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
