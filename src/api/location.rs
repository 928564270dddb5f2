use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::location::{LocationChanges, NewLocation},
    store::VacationStore,
};
use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::info;

fn clean_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("name is required"));
    }
    Ok(name.to_string())
}

fn clean_address(address: Option<String>) -> Option<String> {
    address
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
}

/// List locations
#[utoipa::path(
    get,
    path = "/api/locations",
    responses(
        (status = 200, description = "All locations", body = [Location]),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Location",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_locations(
    _auth: AuthUser,
    store: web::Data<dyn VacationStore>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(store.list_locations().await?))
}

/// Create location
#[utoipa::path(
    post,
    path = "/api/locations",
    request_body = NewLocation,
    responses(
        (status = 201, description = "Location created", body = Location),
        (status = 400, description = "Name missing"),
        (status = 409, description = "Name already exists")
    ),
    tag = "Location",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_location(
    auth: AuthUser,
    store: web::Data<dyn VacationStore>,
    payload: web::Json<NewLocation>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let payload = payload.into_inner();

    let location = store
        .insert_location(NewLocation {
            name: clean_name(&payload.name)?,
            address: clean_address(payload.address),
        })
        .await?;
    info!(location_id = location.id, "Location created");

    Ok(HttpResponse::Created().json(location))
}

/// Update location
#[utoipa::path(
    put,
    path = "/api/locations/{location_id}",
    params(
        ("location_id" = u64, Path, description = "Location ID")
    ),
    request_body = LocationChanges,
    responses(
        (status = 200, description = "Location updated", body = Location),
        (status = 404, description = "Location not found"),
        (status = 409, description = "Name already exists")
    ),
    tag = "Location",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_location(
    auth: AuthUser,
    store: web::Data<dyn VacationStore>,
    path: web::Path<u64>,
    payload: web::Json<LocationChanges>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let payload = payload.into_inner();

    let changes = LocationChanges {
        name: payload.name.as_deref().map(clean_name).transpose()?,
        address: payload.address.map(clean_address),
    };

    let location = store
        .update_location(path.into_inner(), &changes)
        .await?
        .ok_or_else(|| AppError::not_found("Location not found"))?;

    Ok(HttpResponse::Ok().json(location))
}

/// Delete location
#[utoipa::path(
    delete,
    path = "/api/locations/{location_id}",
    params(
        ("location_id" = u64, Path, description = "Location ID")
    ),
    responses(
        (status = 200, description = "Location deleted", body = Object, example = json!({
            "message": "Location deleted successfully"
        })),
        (status = 404, description = "Location not found")
    ),
    tag = "Location",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_location(
    auth: AuthUser,
    store: web::Data<dyn VacationStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    if !store.delete_location(path.into_inner()).await? {
        return Err(AppError::not_found("Location not found"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Location deleted successfully"
    })))
}
