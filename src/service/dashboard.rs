//! Read-side aggregates for the dashboard, recomputed on every call.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::{
        auth::AuthUser,
        policy::{Scope, scope_for},
    },
    error::AppError,
    model::{
        employee::Employee,
        role::Role,
        vacation_request::{VacationRequest, VacationStatus},
    },
    service::vacation::request_filter_for,
    store::{EmployeeFilter, VacationStore},
};

pub static STARTED_AT: Lazy<Instant> = Lazy::new(Instant::now);

const TOP_REQUESTERS: usize = 5;
const RECENT_REQUESTS: usize = 5;
const UNKNOWN_EMPLOYEE: &str = "Unknown";

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeStats {
    pub total: usize,
    pub supervisors: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationStats {
    pub total: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecentRequest {
    #[schema(example = "Jane Doe")]
    pub employee: String,
    #[schema(example = "2024-07-15", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = 5)]
    pub days: i64,
    pub status: VacationStatus,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub denied: usize,
    /// newest first
    pub recent: Vec<RecentRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DenialReasonStats {
    pub active: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SystemStats {
    #[schema(example = "mysql")]
    pub store: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub employees: EmployeeStats,
    pub locations: LocationStats,
    pub vacation_requests: RequestStats,
    pub denial_reasons: DenialReasonStats,
    pub system: SystemStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TopRequester {
    #[schema(example = "Jane Doe")]
    pub employee: String,
    pub requests: usize,
    pub total_days: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardActivity {
    pub top_requesters: Vec<TopRequester>,
}

fn display_name(employees: &HashMap<u64, &Employee>, employee_id: u64) -> String {
    employees
        .get(&employee_id)
        .map(|e| e.full_name())
        .unwrap_or_else(|| UNKNOWN_EMPLOYEE.to_string())
}

pub fn request_stats(requests: &[VacationRequest], employees: &[Employee]) -> RequestStats {
    let by_id: HashMap<u64, &Employee> = employees.iter().map(|e| (e.id, e)).collect();
    let count = |status: VacationStatus| requests.iter().filter(|r| r.status == status).count();

    let recent = requests
        .iter()
        .rev()
        .take(RECENT_REQUESTS)
        .map(|r| RecentRequest {
            employee: display_name(&by_id, r.employee_id),
            start_date: r.start_date,
            days: r.days_requested,
            status: r.status,
            created: r.created_at,
        })
        .collect();

    RequestStats {
        total: requests.len(),
        pending: count(VacationStatus::Pending),
        approved: count(VacationStatus::Approved),
        denied: count(VacationStatus::Denied),
        recent,
    }
}

/// Requests per employee, most first; ties keep first-seen order.
pub fn top_requesters(requests: &[VacationRequest], employees: &[Employee]) -> Vec<TopRequester> {
    let by_id: HashMap<u64, &Employee> = employees.iter().map(|e| (e.id, e)).collect();
    let mut slots: HashMap<u64, usize> = HashMap::new();
    let mut ranking: Vec<TopRequester> = Vec::new();

    for request in requests {
        let idx = *slots.entry(request.employee_id).or_insert_with(|| {
            ranking.push(TopRequester {
                employee: display_name(&by_id, request.employee_id),
                requests: 0,
                total_days: 0,
            });
            ranking.len() - 1
        });
        ranking[idx].requests += 1;
        ranking[idx].total_days += request.days_requested;
    }

    // sort_by is stable, which preserves first-seen order among ties
    ranking.sort_by(|a, b| b.requests.cmp(&a.requests));
    ranking.truncate(TOP_REQUESTERS);
    ranking
}

async fn scoped_employees(
    store: &dyn VacationStore,
    actor: &AuthUser,
) -> Result<Vec<Employee>, AppError> {
    let employees = match scope_for(actor) {
        Scope::All => store.list_employees(&EmployeeFilter::default()).await?,
        Scope::Location(location_id) => {
            store
                .list_employees(&EmployeeFilter {
                    location_id: Some(location_id),
                })
                .await?
        }
        Scope::Own(_) | Scope::Nothing => Vec::new(),
    };
    Ok(employees)
}

pub async fn stats(store: &dyn VacationStore, actor: &AuthUser) -> Result<DashboardStats, AppError> {
    actor.require_supervisor_or_admin()?;

    let employees = scoped_employees(store, actor).await?;
    let filter = request_filter_for(store, actor, None).await?;
    let requests = store.list_vacation_requests(&filter).await?;
    let locations = store.list_locations().await?;
    let active_reasons = store.list_denial_reasons(true).await?;

    Ok(DashboardStats {
        employees: EmployeeStats {
            total: employees.len(),
            supervisors: employees
                .iter()
                .filter(|e| e.role == Role::Supervisor)
                .count(),
        },
        locations: LocationStats {
            total: locations.len(),
        },
        vacation_requests: request_stats(&requests, &employees),
        denial_reasons: DenialReasonStats {
            active: active_reasons.len(),
        },
        system: SystemStats {
            store: store.backend_name().to_string(),
            uptime_seconds: STARTED_AT.elapsed().as_secs(),
        },
    })
}

pub async fn activity(
    store: &dyn VacationStore,
    actor: &AuthUser,
) -> Result<DashboardActivity, AppError> {
    actor.require_supervisor_or_admin()?;

    // deleted requesters still count, they just render as Unknown
    let employees = scoped_employees(store, actor).await?;
    let filter = request_filter_for(store, actor, None).await?;
    let requests = store.list_vacation_requests(&filter).await?;

    Ok(DashboardActivity {
        top_requesters: top_requesters(&requests, &employees),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::vacation_request::NewVacationRequest;

    fn employee(id: u64, first: &str, role: Role) -> Employee {
        Employee {
            id,
            first_name: first.into(),
            last_name: "Doe".into(),
            email: format!("{first}@company.com"),
            password_hash: String::new(),
            role,
            location_id: Some(1),
            supervisor_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(id: u64, employee_id: u64, days: u32, status: VacationStatus) -> VacationRequest {
        let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let end = start + chrono::Days::new(u64::from(days) - 1);
        let mut r = VacationRequest::pending(
            id,
            NewVacationRequest::new(employee_id, start, end, None).unwrap(),
            Utc::now(),
        );
        r.status = status;
        r
    }

    #[test]
    fn status_breakdown_adds_up() {
        let staff = vec![employee(1, "Ann", Role::Employee)];
        let requests = vec![
            request(1, 1, 2, VacationStatus::Pending),
            request(2, 1, 3, VacationStatus::Approved),
            request(3, 1, 1, VacationStatus::Denied),
            request(4, 1, 1, VacationStatus::Pending),
        ];
        let stats = request_stats(&requests, &staff);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.pending + stats.approved + stats.denied, stats.total);
        assert_eq!(stats.pending, 2);

        let empty = request_stats(&[], &staff);
        assert_eq!(empty.pending + empty.approved + empty.denied, empty.total);
        assert!(empty.recent.is_empty());
    }

    #[test]
    fn recent_is_newest_first_and_capped() {
        let staff = vec![employee(1, "Ann", Role::Employee)];
        let requests: Vec<_> = (1..=7)
            .map(|id| request(id, 1, 1, VacationStatus::Pending))
            .collect();
        let stats = request_stats(&requests, &staff);
        assert_eq!(stats.recent.len(), 5);
        assert_eq!(stats.recent[0].employee, "Ann Doe");
    }

    #[test]
    fn top_requesters_ranks_by_count_then_first_seen() {
        let staff = vec![
            employee(1, "Ann", Role::Employee),
            employee(2, "Bob", Role::Employee),
            employee(3, "Cat", Role::Employee),
        ];
        let requests = vec![
            request(1, 2, 2, VacationStatus::Pending),
            request(2, 1, 1, VacationStatus::Pending),
            request(3, 3, 4, VacationStatus::Approved),
            request(4, 3, 1, VacationStatus::Denied),
        ];
        let top = top_requesters(&requests, &staff);
        let names: Vec<_> = top.iter().map(|t| t.employee.as_str()).collect();
        assert_eq!(names, ["Cat Doe", "Bob Doe", "Ann Doe"]);
        assert_eq!(top[0].requests, 2);
        assert_eq!(top[0].total_days, 5);
    }

    #[test]
    fn top_requesters_is_truncated_and_sorted() {
        let staff: Vec<_> = (1..=8)
            .map(|id| employee(id, &format!("E{id}"), Role::Employee))
            .collect();
        let mut requests = Vec::new();
        let mut next = 0;
        for employee_id in 1..=8u64 {
            for _ in 0..employee_id {
                next += 1;
                requests.push(request(next, employee_id, 1, VacationStatus::Pending));
            }
        }
        let top = top_requesters(&requests, &staff);
        assert_eq!(top.len(), 5);
        assert!(top.windows(2).all(|w| w[0].requests >= w[1].requests));
        assert_eq!(top[0].requests, 8);
    }

    #[test]
    fn missing_requester_renders_unknown() {
        let requests = vec![request(1, 99, 1, VacationStatus::Pending)];
        let top = top_requesters(&requests, &[]);
        assert_eq!(top[0].employee, "Unknown");
    }
}
