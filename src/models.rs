use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = 1)]
    pub id: u64,
    #[serde(rename = "contrasena")]
    #[schema(example = "clave123")]
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Employee id, as a string.
    pub sub: String,
    pub employee_id: u64,
    pub role: Role,
    pub superadmin: bool,
    pub exp: usize,
    pub jti: String,
}
