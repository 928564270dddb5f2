//! Vacation request workflow: filing, approval and denial.
//!
//! Runs against any `VacationStore`; the HTTP layer only translates
//! payloads and results.

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::{
    auth::{
        auth::AuthUser,
        policy::{Owner, Scope, ensure_can_access, scope_for},
    },
    error::AppError,
    model::vacation_request::{NewVacationRequest, RequestError, VacationRequest, VacationStatus},
    store::{EmployeeFilter, RequestFilter, VacationStore},
};

#[derive(Debug, Clone)]
pub struct FileRequest {
    /// Ignored for callers with the employee role.
    pub employee_id: Option<u64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

/// Translates a caller's scope into a store filter over requester ids.
pub async fn request_filter_for(
    store: &dyn VacationStore,
    actor: &AuthUser,
    status: Option<VacationStatus>,
) -> Result<RequestFilter, AppError> {
    let employee_ids = match scope_for(actor) {
        Scope::All => None,
        Scope::Own(employee_id) => Some(vec![employee_id]),
        Scope::Location(location_id) => {
            let filter = EmployeeFilter {
                location_id: Some(location_id),
            };
            Some(
                store
                    .list_employees(&filter)
                    .await?
                    .into_iter()
                    .map(|e| e.id)
                    .collect(),
            )
        }
        Scope::Nothing => Some(Vec::new()),
    };
    Ok(RequestFilter {
        employee_ids,
        status,
    })
}

pub async fn list_requests(
    store: &dyn VacationStore,
    actor: &AuthUser,
    status: Option<VacationStatus>,
) -> Result<Vec<VacationRequest>, AppError> {
    let filter = request_filter_for(store, actor, status).await?;
    Ok(store.list_vacation_requests(&filter).await?)
}

pub async fn create_request(
    store: &dyn VacationStore,
    actor: &AuthUser,
    input: FileRequest,
) -> Result<VacationRequest, AppError> {
    let employee_id = if actor.is_employee() {
        actor.user_id
    } else {
        input.employee_id.unwrap_or(actor.user_id)
    };

    let draft = NewVacationRequest::new(employee_id, input.start_date, input.end_date, input.reason)?;

    let requester = store
        .get_employee(employee_id)
        .await?
        .ok_or_else(|| AppError::validation("employee_id does not reference an existing employee"))?;
    ensure_can_access(actor, Owner::from(&requester))?;

    let created = store.insert_vacation_request(draft).await?;
    info!(
        request_id = created.id,
        employee_id,
        days = created.days_requested,
        "Vacation request filed"
    );
    Ok(created)
}

/// Loads a request and checks the caller may act on its requester.
async fn load_in_scope(
    store: &dyn VacationStore,
    actor: &AuthUser,
    request_id: u64,
) -> Result<VacationRequest, AppError> {
    let request = store
        .get_vacation_request(request_id)
        .await?
        .ok_or_else(|| AppError::not_found("Vacation request not found"))?;

    // a deleted requester has no location, so only administrators pass
    let location_id = store
        .get_employee(request.employee_id)
        .await?
        .and_then(|e| e.location_id);
    ensure_can_access(
        actor,
        Owner {
            employee_id: request.employee_id,
            location_id,
        },
    )?;
    Ok(request)
}

async fn persist(store: &dyn VacationStore, request: &VacationRequest) -> Result<(), AppError> {
    if !store.save_vacation_request(request).await? {
        return Err(AppError::not_found("Vacation request not found"));
    }
    Ok(())
}

pub async fn approve_request(
    store: &dyn VacationStore,
    actor: &AuthUser,
    request_id: u64,
) -> Result<VacationRequest, AppError> {
    actor.require_supervisor_or_admin()?;

    let mut request = load_in_scope(store, actor, request_id).await?;
    request.approve(actor.user_id, Utc::now())?;
    persist(store, &request).await?;

    info!(
        request_id,
        supervisor_id = actor.user_id,
        supervisor_email = %actor.email,
        "Vacation request approved"
    );
    Ok(request)
}

pub async fn deny_request(
    store: &dyn VacationStore,
    actor: &AuthUser,
    request_id: u64,
    denial_reason_id: u64,
    denial_comments: Option<String>,
) -> Result<VacationRequest, AppError> {
    actor.require_supervisor_or_admin()?;

    let mut request = load_in_scope(store, actor, request_id).await?;
    if request.status.is_terminal() {
        return Err(RequestError::NotPending(request.status).into());
    }

    match store.get_denial_reason(denial_reason_id).await? {
        Some(reason) if reason.active => {}
        Some(_) => return Err(AppError::validation("denial_reason_id refers to an inactive reason")),
        None => {
            return Err(AppError::validation(
                "denial_reason_id does not reference an existing denial reason",
            ));
        }
    }

    request.deny(actor.user_id, denial_reason_id, denial_comments, Utc::now())?;
    persist(store, &request).await?;

    info!(
        request_id,
        supervisor_id = actor.user_id,
        supervisor_email = %actor.email,
        denial_reason_id,
        "Vacation request denied"
    );
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        denial_reason::NewDenialReason, employee::NewEmployee, location::NewLocation, role::Role,
    };
    use crate::store::MemoryStore;

    struct Fixture {
        store: MemoryStore,
        admin: AuthUser,
        sup_a: AuthUser,
        sup_b: AuthUser,
        emp_a: AuthUser,
        emp_a2: AuthUser,
        reason_id: u64,
        retired_reason_id: u64,
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn add(store: &MemoryStore, email: &str, role: Role, location_id: Option<u64>) -> AuthUser {
        let e = store
            .insert_employee(NewEmployee {
                first_name: "First".into(),
                last_name: "Last".into(),
                email: email.into(),
                password_hash: "hash".into(),
                role,
                location_id,
                supervisor_id: None,
            })
            .await
            .unwrap();
        AuthUser {
            user_id: e.id,
            email: e.email,
            role: e.role,
            location_id: e.location_id,
        }
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let a = store
            .insert_location(NewLocation {
                name: "A".into(),
                address: None,
            })
            .await
            .unwrap();
        let b = store
            .insert_location(NewLocation {
                name: "B".into(),
                address: None,
            })
            .await
            .unwrap();
        let reason = store
            .insert_denial_reason(NewDenialReason {
                reason: "Staffing Shortage".into(),
                description: None,
                active: true,
            })
            .await
            .unwrap();
        let retired = store
            .insert_denial_reason(NewDenialReason {
                reason: "Retired".into(),
                description: None,
                active: false,
            })
            .await
            .unwrap();
        Fixture {
            admin: add(&store, "admin@c.com", Role::Administrator, None).await,
            sup_a: add(&store, "supa@c.com", Role::Supervisor, Some(a.id)).await,
            sup_b: add(&store, "supb@c.com", Role::Supervisor, Some(b.id)).await,
            emp_a: add(&store, "empa@c.com", Role::Employee, Some(a.id)).await,
            emp_a2: add(&store, "empa2@c.com", Role::Employee, Some(a.id)).await,
            reason_id: reason.id,
            retired_reason_id: retired.id,
            store,
        }
    }

    fn july(employee_id: Option<u64>) -> FileRequest {
        FileRequest {
            employee_id,
            start_date: date("2024-07-15"),
            end_date: date("2024-07-19"),
            reason: Some("Beach".into()),
        }
    }

    #[actix_web::test]
    async fn employee_files_for_themselves() {
        let f = fixture().await;
        // a foreign employee_id is overridden by the caller's own id
        let req = create_request(&f.store, &f.emp_a, july(Some(f.emp_a2.user_id)))
            .await
            .unwrap();
        assert_eq!(req.employee_id, f.emp_a.user_id);
        assert_eq!(req.status, VacationStatus::Pending);
        assert_eq!(req.days_requested, 5);
        assert!(req.supervisor_id.is_none());
    }

    #[actix_web::test]
    async fn create_validates_range_and_requester() {
        let f = fixture().await;
        let mut bad = july(None);
        bad.start_date = date("2024-07-20");
        assert!(matches!(
            create_request(&f.store, &f.emp_a, bad).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            create_request(&f.store, &f.admin, july(Some(9999))).await,
            Err(AppError::Validation(_))
        ));
    }

    #[actix_web::test]
    async fn supervisor_cannot_file_outside_location() {
        let f = fixture().await;
        assert!(matches!(
            create_request(&f.store, &f.sup_b, july(Some(f.emp_a.user_id))).await,
            Err(AppError::Authorization(_))
        ));
        assert!(create_request(&f.store, &f.sup_a, july(Some(f.emp_a.user_id)))
            .await
            .is_ok());
    }

    #[actix_web::test]
    async fn approve_records_acting_supervisor() {
        let f = fixture().await;
        let req = create_request(&f.store, &f.emp_a, july(None)).await.unwrap();
        let approved = approve_request(&f.store, &f.sup_a, req.id).await.unwrap();
        assert_eq!(approved.status, VacationStatus::Approved);
        assert_eq!(approved.supervisor_id, Some(f.sup_a.user_id));
        assert!(approved.approval_date.is_some());
        assert!(approved.denial_date.is_none());

        let stored = f.store.get_vacation_request(req.id).await.unwrap().unwrap();
        assert_eq!(stored.status, VacationStatus::Approved);
    }

    #[actix_web::test]
    async fn deny_records_reason_and_comments() {
        let f = fixture().await;
        let req = create_request(&f.store, &f.emp_a, july(None)).await.unwrap();
        let denied = deny_request(&f.store, &f.admin, req.id, f.reason_id, Some("Peak week".into()))
            .await
            .unwrap();
        assert_eq!(denied.status, VacationStatus::Denied);
        assert_eq!(denied.denial_reason_id, Some(f.reason_id));
        assert_eq!(denied.denial_comments.as_deref(), Some("Peak week"));
        assert_eq!(denied.supervisor_id, Some(f.admin.user_id));
        assert!(denied.denial_date.is_some());
        assert!(denied.approval_date.is_none());
    }

    #[actix_web::test]
    async fn deny_requires_a_usable_reason() {
        let f = fixture().await;
        let req = create_request(&f.store, &f.emp_a, july(None)).await.unwrap();
        assert!(matches!(
            deny_request(&f.store, &f.sup_a, req.id, 4242, None).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            deny_request(&f.store, &f.sup_a, req.id, f.retired_reason_id, None).await,
            Err(AppError::Validation(_))
        ));
        let stored = f.store.get_vacation_request(req.id).await.unwrap().unwrap();
        assert_eq!(stored.status, VacationStatus::Pending);
    }

    #[actix_web::test]
    async fn cross_location_supervisor_is_forbidden() {
        let f = fixture().await;
        let req = create_request(&f.store, &f.emp_a, july(None)).await.unwrap();
        assert!(matches!(
            approve_request(&f.store, &f.sup_b, req.id).await,
            Err(AppError::Authorization(_))
        ));
        assert!(matches!(
            deny_request(&f.store, &f.sup_b, req.id, f.reason_id, None).await,
            Err(AppError::Authorization(_))
        ));
        let visible = list_requests(&f.store, &f.sup_b, None).await.unwrap();
        assert!(visible.is_empty());
    }

    #[actix_web::test]
    async fn employees_cannot_decide() {
        let f = fixture().await;
        let req = create_request(&f.store, &f.emp_a, july(None)).await.unwrap();
        assert!(matches!(
            approve_request(&f.store, &f.emp_a, req.id).await,
            Err(AppError::Authorization(_))
        ));
    }

    #[actix_web::test]
    async fn unknown_request_is_not_found() {
        let f = fixture().await;
        assert!(matches!(
            approve_request(&f.store, &f.admin, 777).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_web::test]
    async fn decided_requests_are_not_overwritten() {
        let f = fixture().await;
        let req = create_request(&f.store, &f.emp_a, july(None)).await.unwrap();
        approve_request(&f.store, &f.sup_a, req.id).await.unwrap();
        assert!(matches!(
            deny_request(&f.store, &f.admin, req.id, f.reason_id, None).await,
            Err(AppError::Conflict(_))
        ));
        let stored = f.store.get_vacation_request(req.id).await.unwrap().unwrap();
        assert_eq!(stored.status, VacationStatus::Approved);
        assert!(stored.denial_reason_id.is_none());
    }

    #[actix_web::test]
    async fn decided_request_conflicts_before_reason_is_checked() {
        let f = fixture().await;
        let req = create_request(&f.store, &f.emp_a, july(None)).await.unwrap();
        approve_request(&f.store, &f.sup_a, req.id).await.unwrap();
        assert!(matches!(
            deny_request(&f.store, &f.sup_a, req.id, 4242, None).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            deny_request(&f.store, &f.sup_a, req.id, f.retired_reason_id, None).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[actix_web::test]
    async fn listing_is_scoped_by_role() {
        let f = fixture().await;
        create_request(&f.store, &f.emp_a, july(None)).await.unwrap();
        create_request(&f.store, &f.emp_a2, july(None)).await.unwrap();

        assert_eq!(list_requests(&f.store, &f.emp_a, None).await.unwrap().len(), 1);
        assert_eq!(list_requests(&f.store, &f.sup_a, None).await.unwrap().len(), 2);
        assert_eq!(list_requests(&f.store, &f.admin, None).await.unwrap().len(), 2);
        assert!(list_requests(&f.store, &f.admin, Some(VacationStatus::Denied))
            .await
            .unwrap()
            .is_empty());
    }
}
