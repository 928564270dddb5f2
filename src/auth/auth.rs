use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

/// Caller identity, always re-derived from the verified session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub email: String,
    pub role: Role,
    pub location_id: Option<u64>,
}

pub(crate) fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

pub(crate) fn authenticate(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let claims =
        verify_token(token, secret).map_err(|_| AppError::unauthenticated("Invalid token"))?;

    Ok(AuthUser {
        user_id: claims.user_id,
        email: claims.sub,
        role: claims.role,
        location_id: claims.location_id,
    })
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // set by auth_middleware on protected scopes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match bearer_token(req) {
            Some(t) => t,
            None => return ready(Err(AppError::unauthenticated("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => return ready(Err(AppError::Internal("Config missing".into()))),
        };

        ready(authenticate(token, &config.jwt_secret))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == Role::Administrator {
            Ok(())
        } else {
            Err(AppError::forbidden("Administrator only"))
        }
    }

    pub fn require_supervisor_or_admin(&self) -> Result<(), AppError> {
        if matches!(self.role, Role::Administrator | Role::Supervisor) {
            Ok(())
        } else {
            Err(AppError::forbidden("Supervisor/Administrator only"))
        }
    }

    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }
}
