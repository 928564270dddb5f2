use crate::{
    auth::auth::AuthUser,
    error::AppError,
    service::dashboard,
    store::VacationStore,
};
use actix_web::{HttpResponse, web};

/// Aggregate counts for the caller's scope
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 403, description = "Employees have no dashboard")
    ),
    tag = "Dashboard",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn stats(
    auth: AuthUser,
    store: web::Data<dyn VacationStore>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(dashboard::stats(store.get_ref(), &auth).await?))
}

/// Top requesters in the caller's scope
#[utoipa::path(
    get,
    path = "/api/dashboard/activity",
    responses(
        (status = 200, description = "Request activity", body = DashboardActivity),
        (status = 403, description = "Employees have no dashboard")
    ),
    tag = "Dashboard",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn activity(
    auth: AuthUser,
    store: web::Data<dyn VacationStore>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(dashboard::activity(store.get_ref(), &auth).await?))
}
