use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{UserRole, user_entity};
use crate::error::{AppError, AppResult};

/// 已认证的请求用户
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub business_id: Option<i64>,
    pub is_active: bool,
}

impl From<user_entity::Model> for AuthUser {
    fn from(m: user_entity::Model) -> Self {
        AuthUser {
            id: m.id,
            email: m.email,
            name: m.name,
            role: m.role,
            business_id: m.business_id,
            is_active: m.is_active,
        }
    }
}

impl AuthUser {
    pub fn require_role(&self, roles: &[UserRole]) -> AppResult<()> {
        if roles.contains(&self.role) {
            return Ok(());
        }
        let allowed = roles
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Err(AppError::Forbidden(format!(
            "User role must be one of: {allowed}"
        )))
    }

    pub fn require_business_id(&self) -> AppResult<i64> {
        self.business_id
            .ok_or_else(|| AppError::Forbidden("User must have a business_id".to_string()))
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
