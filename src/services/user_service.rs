use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::AuthUser;
use sea_orm::{DatabaseConnection, EntityTrait};

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 根据中间件注入的用户ID加载用户，并校验账号状态
    pub async fn authenticate(&self, user_id: Option<i64>) -> AppResult<AuthUser> {
        let user_id =
            user_id.ok_or_else(|| AppError::AuthError("Missing access token".to_string()))?;

        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("User not found".to_string()))?;

        if !user.is_active {
            return Err(AppError::AuthError("User is not active".to_string()));
        }

        Ok(user.into())
    }

    /// 可选认证：token 无效或用户不可用时按匿名处理，数据库错误照常返回
    pub async fn authenticate_optional(&self, user_id: Option<i64>) -> AppResult<Option<AuthUser>> {
        if user_id.is_none() {
            return Ok(None);
        }
        match self.authenticate(user_id).await {
            Ok(user) => Ok(Some(user)),
            Err(AppError::AuthError(reason)) => {
                log::debug!("Continuing anonymously: {reason}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
