use crate::config::AdminAccountConfig;
use crate::utils::Claims;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin@example.com")]
    pub email: Option<String>,
    #[schema(example = "password123")]
    pub password: Option<String>,
}

/// Admin identity as exposed to the dashboard. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AdminResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<&AdminAccountConfig> for AdminResponse {
    fn from(account: &AdminAccountConfig) -> Self {
        Self {
            id: account.id.clone(),
            email: account.email.clone(),
            name: account.name.clone(),
            role: account.role.clone(),
        }
    }
}

impl From<Claims> for AdminResponse {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub expires_in: i64,
    pub user: AdminResponse,
}
