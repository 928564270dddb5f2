use crate::store::VacationStore;
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    /// name of the active store backend
    #[schema(example = "memory")]
    pub database: String,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub timestamp: chrono::DateTime<Utc>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health(store: web::Data<dyn VacationStore>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        database: store.backend_name().to_string(),
        timestamp: Utc::now(),
    })
}
