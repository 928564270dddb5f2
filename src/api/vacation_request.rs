use std::collections::HashMap;

use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::{
        denial_reason::DenialReason,
        employee::Employee,
        location::Location,
        vacation_request::{VacationRequest, VacationStatus},
    },
    service::vacation::{self, FileRequest},
    store::{EmployeeFilter, VacationStore},
};
use actix_web::{HttpResponse, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

const DEFAULT_PER_PAGE: u32 = 10;
const MAX_PER_PAGE: u32 = 100;
const NO_LOCATION: &str = "N/A";

#[derive(Deserialize, ToSchema)]
pub struct CreateVacationRequest {
    /// Supervisors and administrators may file on behalf of someone else.
    #[schema(example = 4)]
    pub employee_id: Option<u64>,
    #[schema(example = "2024-07-15", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-07-19", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Summer vacation")]
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct DenyVacationRequest {
    #[schema(example = 1)]
    pub denial_reason_id: Option<u64>,
    #[schema(example = "Two teammates are already out that week")]
    pub denial_comments: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VacationRequestQuery {
    /// Filter by status: pending, approved or denied
    pub status: Option<String>,
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    /// Items per page, at most 100
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct VacationRequestView {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 4)]
    pub employee_id: u64,
    #[schema(example = "Jane")]
    pub first_name: Option<String>,
    #[schema(example = "Doe")]
    pub last_name: Option<String>,
    #[schema(example = "New York Office")]
    pub location_name: String,
    #[schema(example = "2024-07-15", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-07-19", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = 5)]
    pub days_requested: i64,
    pub reason: Option<String>,
    pub status: VacationStatus,
    pub supervisor_id: Option<u64>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub approval_date: Option<DateTime<Utc>>,
    pub denial_reason_id: Option<u64>,
    #[schema(example = "Staffing Shortage")]
    pub denial_reason: Option<String>,
    pub denial_comments: Option<String>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub denial_date: Option<DateTime<Utc>>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
pub struct VacationRequestListResponse {
    pub data: Vec<VacationRequestView>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: usize,
}

/// Lookup tables used to enrich request rows for display.
struct Directory {
    employees: HashMap<u64, Employee>,
    locations: HashMap<u64, Location>,
    reasons: HashMap<u64, DenialReason>,
}

impl Directory {
    async fn load(store: &dyn VacationStore) -> Result<Self, AppError> {
        let employees = store
            .list_employees(&EmployeeFilter::default())
            .await?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();
        let locations = store
            .list_locations()
            .await?
            .into_iter()
            .map(|l| (l.id, l))
            .collect();
        let reasons = store
            .list_denial_reasons(false)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();
        Ok(Self {
            employees,
            locations,
            reasons,
        })
    }

    fn view(&self, request: VacationRequest) -> VacationRequestView {
        let employee = self.employees.get(&request.employee_id);
        let location_name = employee
            .and_then(|e| e.location_id)
            .and_then(|id| self.locations.get(&id))
            .map(|l| l.name.clone())
            .unwrap_or_else(|| NO_LOCATION.to_string());
        let denial_reason = request
            .denial_reason_id
            .and_then(|id| self.reasons.get(&id))
            .map(|r| r.reason.clone());

        VacationRequestView {
            id: request.id,
            employee_id: request.employee_id,
            first_name: employee.map(|e| e.first_name.clone()),
            last_name: employee.map(|e| e.last_name.clone()),
            location_name,
            start_date: request.start_date,
            end_date: request.end_date,
            days_requested: request.days_requested,
            reason: request.reason,
            status: request.status,
            supervisor_id: request.supervisor_id,
            approval_date: request.approval_date,
            denial_reason_id: request.denial_reason_id,
            denial_reason,
            denial_comments: request.denial_comments,
            denial_date: request.denial_date,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

fn parse_status(raw: Option<&str>) -> Result<Option<VacationStatus>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .to_lowercase()
            .parse()
            .map(Some)
            .map_err(|_| AppError::validation("status must be one of pending, approved, denied")),
    }
}

/// List vacation requests visible to the caller, newest first
#[utoipa::path(
    get,
    path = "/api/vacation-requests",
    params(VacationRequestQuery),
    responses(
        (status = 200, description = "Paginated vacation requests", body = VacationRequestListResponse),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "VacationRequest",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_vacation_requests(
    auth: AuthUser,
    store: web::Data<dyn VacationStore>,
    query: web::Query<VacationRequestQuery>,
) -> Result<HttpResponse, AppError> {
    let status = parse_status(query.status.as_deref())?;
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);

    let mut requests = vacation::list_requests(store.get_ref(), &auth, status).await?;
    requests.reverse();
    let total = requests.len();

    let directory = Directory::load(store.get_ref()).await?;
    let offset = (page as usize - 1) * per_page as usize;
    let data = requests
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .map(|r| directory.view(r))
        .collect();

    Ok(HttpResponse::Ok().json(VacationRequestListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// File a new vacation request
#[utoipa::path(
    post,
    path = "/api/vacation-requests",
    request_body = CreateVacationRequest,
    responses(
        (status = 201, description = "Request filed as pending", body = VacationRequestView),
        (status = 400, description = "start_date after end_date or unknown employee"),
        (status = 403, description = "Requester outside the caller's scope")
    ),
    tag = "VacationRequest",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_vacation_request(
    auth: AuthUser,
    store: web::Data<dyn VacationStore>,
    payload: web::Json<CreateVacationRequest>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let created = vacation::create_request(
        store.get_ref(),
        &auth,
        FileRequest {
            employee_id: payload.employee_id,
            start_date: payload.start_date,
            end_date: payload.end_date,
            reason: payload.reason,
        },
    )
    .await?;

    let directory = Directory::load(store.get_ref()).await?;
    Ok(HttpResponse::Created().json(directory.view(created)))
}

/// Approve a pending vacation request
#[utoipa::path(
    put,
    path = "/api/vacation-requests/{request_id}/approve",
    params(
        ("request_id" = u64, Path, description = "Vacation request ID")
    ),
    responses(
        (status = 200, description = "Request approved", body = VacationRequestView),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Vacation request not found"),
        (status = 409, description = "Request already approved or denied")
    ),
    tag = "VacationRequest",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn approve_vacation_request(
    auth: AuthUser,
    store: web::Data<dyn VacationStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let approved = vacation::approve_request(store.get_ref(), &auth, path.into_inner()).await?;

    let directory = Directory::load(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(directory.view(approved)))
}

/// Deny a pending vacation request
#[utoipa::path(
    put,
    path = "/api/vacation-requests/{request_id}/deny",
    params(
        ("request_id" = u64, Path, description = "Vacation request ID")
    ),
    request_body = DenyVacationRequest,
    responses(
        (status = 200, description = "Request denied", body = VacationRequestView),
        (status = 400, description = "Missing or inactive denial reason"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Vacation request not found"),
        (status = 409, description = "Request already approved or denied")
    ),
    tag = "VacationRequest",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn deny_vacation_request(
    auth: AuthUser,
    store: web::Data<dyn VacationStore>,
    path: web::Path<u64>,
    payload: web::Json<DenyVacationRequest>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let denial_reason_id = payload
        .denial_reason_id
        .ok_or_else(|| AppError::validation("denial_reason_id is required"))?;
    let comments = payload
        .denial_comments
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let denied = vacation::deny_request(
        store.get_ref(),
        &auth,
        path.into_inner(),
        denial_reason_id,
        comments,
    )
    .await?;

    let directory = Directory::load(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(directory.view(denied)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_parses_case_insensitively() {
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(parse_status(Some("")).unwrap(), None);
        assert_eq!(
            parse_status(Some("Approved")).unwrap(),
            Some(VacationStatus::Approved)
        );
        assert!(matches!(
            parse_status(Some("cancelled")),
            Err(AppError::Validation(_))
        ));
    }
}
