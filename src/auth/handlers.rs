use crate::{
    auth::{jwt::generate_access_token, password::verify_password},
    config::Config,
    error::AppError,
    model::{employee::normalize_email, role::Role},
    models::LoginReqDto,
    store::VacationStore,
};
use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct LoginUser {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Admin")]
    pub first_name: String,
    #[schema(example = "User")]
    pub last_name: String,
    pub role: Role,
    #[schema(example = 2, nullable = true)]
    pub location_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

/// Exchange email/password for a session token
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(store, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    store: web::Data<dyn VacationStore>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    if user.email.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return Err(AppError::validation("Email and password are required"));
    }

    debug!("Fetching employee from store");
    let employee = match store
        .find_employee_by_email(&normalize_email(&user.email))
        .await?
    {
        Some(employee) => employee,
        None => {
            info!("Invalid credentials: employee not found");
            return Err(AppError::unauthenticated("Invalid credentials"));
        }
    };

    if let Err(e) = verify_password(&user.password, &employee.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(AppError::unauthenticated("Invalid credentials"));
    }

    let token = generate_access_token(&employee, &config.jwt_secret, config.access_token_ttl)
        .map_err(|e| {
            error!(error = %e, "Failed to sign access token");
            AppError::Internal(e.to_string())
        })?;

    info!(employee_id = employee.id, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user: LoginUser {
            id: employee.id,
            first_name: employee.first_name,
            last_name: employee.last_name,
            role: employee.role,
            location_id: employee.location_id,
        },
    }))
}
