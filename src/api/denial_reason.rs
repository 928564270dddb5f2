use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::denial_reason::{DenialReasonChanges, NewDenialReason},
    store::VacationStore,
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DenialReasonQuery {
    /// Only return reasons that can still be used for denials
    pub active: Option<bool>,
}

fn clean_reason(reason: &str) -> Result<String, AppError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(AppError::validation("reason is required"));
    }
    Ok(reason.to_string())
}

/// List denial reasons
#[utoipa::path(
    get,
    path = "/api/denial-reasons",
    params(DenialReasonQuery),
    responses(
        (status = 200, description = "Denial reasons", body = [DenialReason]),
        (status = 401, description = "Unauthorized")
    ),
    tag = "DenialReason",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_denial_reasons(
    _auth: AuthUser,
    store: web::Data<dyn VacationStore>,
    query: web::Query<DenialReasonQuery>,
) -> Result<HttpResponse, AppError> {
    let active_only = query.active.unwrap_or(false);
    Ok(HttpResponse::Ok().json(store.list_denial_reasons(active_only).await?))
}

/// Create denial reason
#[utoipa::path(
    post,
    path = "/api/denial-reasons",
    request_body = NewDenialReason,
    responses(
        (status = 201, description = "Denial reason created", body = DenialReason),
        (status = 400, description = "Reason missing"),
        (status = 409, description = "Reason already exists")
    ),
    tag = "DenialReason",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_denial_reason(
    auth: AuthUser,
    store: web::Data<dyn VacationStore>,
    payload: web::Json<NewDenialReason>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let payload = payload.into_inner();

    let reason = store
        .insert_denial_reason(NewDenialReason {
            reason: clean_reason(&payload.reason)?,
            description: payload.description.map(|d| d.trim().to_string()),
            active: payload.active,
        })
        .await?;

    Ok(HttpResponse::Created().json(reason))
}

/// Update denial reason
#[utoipa::path(
    put,
    path = "/api/denial-reasons/{reason_id}",
    params(
        ("reason_id" = u64, Path, description = "Denial reason ID")
    ),
    request_body = DenialReasonChanges,
    responses(
        (status = 200, description = "Denial reason updated", body = DenialReason),
        (status = 404, description = "Denial reason not found"),
        (status = 409, description = "Reason already exists")
    ),
    tag = "DenialReason",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_denial_reason(
    auth: AuthUser,
    store: web::Data<dyn VacationStore>,
    path: web::Path<u64>,
    payload: web::Json<DenialReasonChanges>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let payload = payload.into_inner();

    let changes = DenialReasonChanges {
        reason: payload.reason.as_deref().map(clean_reason).transpose()?,
        description: payload
            .description
            .map(|d| d.map(|d| d.trim().to_string()).filter(|d| !d.is_empty())),
        active: payload.active,
    };

    let reason = store
        .update_denial_reason(path.into_inner(), &changes)
        .await?
        .ok_or_else(|| AppError::not_found("Denial reason not found"))?;

    Ok(HttpResponse::Ok().json(reason))
}

/// Delete denial reason
#[utoipa::path(
    delete,
    path = "/api/denial-reasons/{reason_id}",
    params(
        ("reason_id" = u64, Path, description = "Denial reason ID")
    ),
    responses(
        (status = 200, description = "Denial reason deleted", body = Object, example = json!({
            "message": "Denial reason deleted successfully"
        })),
        (status = 404, description = "Denial reason not found")
    ),
    tag = "DenialReason",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_denial_reason(
    auth: AuthUser,
    store: web::Data<dyn VacationStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    if !store.delete_denial_reason(path.into_inner()).await? {
        return Err(AppError::not_found("Denial reason not found"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Denial reason deleted successfully"
    })))
}
