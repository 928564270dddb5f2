use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "admin@company.com")]
    pub email: String,
    #[schema(example = "password")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// employee email
    pub sub: String,
    pub role: Role,
    pub location_id: Option<u64>,
    pub exp: usize,
    pub jti: String,
}
