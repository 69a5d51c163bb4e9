use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::api::dtos::{
    CreateUserRequest, Paged, ResetPasswordRequest, UpdateUserRequest, UserListQuery, UserProfile,
};
use crate::domain::{Role, User, UserStatus};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::{SessionRepository, UserRepository, UserSearchParams};
use crate::utils::hash::hash_password;

#[derive(Clone)]
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository>, session_repo: Arc<dyn SessionRepository>) -> Self {
        Self {
            user_repo,
            session_repo,
        }
    }

    pub async fn create(&self, request: CreateUserRequest) -> AppResult<UserProfile> {
        request.validate()?;

        let role = Role::parse(&request.role)
            .ok_or_else(|| AppError::BadRequest("角色无效".to_string()))?;

        let now = chrono::Utc::now();
        let user = User {
            id: 0,
            username: request.username,
            email: request.email,
            password_hash: hash_password(&request.password)?,
            real_name: request.real_name,
            phone: request.phone,
            role,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        };

        // Username uniqueness is enforced by the unique index; a race
        // surfaces as 409 through the sqlx error mapping.
        let created = self.user_repo.create(&user).await?;
        info!(user_id = created.id, "user created");
        Ok(UserProfile::from(&created))
    }

    pub async fn get(&self, id: i64) -> AppResult<UserProfile> {
        let user = self
            .user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("用户不存在".to_string()))?;
        Ok(UserProfile::from(&user))
    }

    pub async fn list(&self, query: &UserListQuery) -> AppResult<Paged<UserProfile>> {
        let params = UserSearchParams {
            search: query.search.clone().filter(|s| !s.is_empty()),
            role: match query.role.as_deref() {
                Some(value) => Some(
                    Role::parse(value)
                        .ok_or_else(|| AppError::BadRequest("角色无效".to_string()))?,
                ),
                None => None,
            },
            status: match query.status.as_deref() {
                Some("active") => Some(UserStatus::Active),
                Some("disabled") => Some(UserStatus::Disabled),
                Some(_) => return Err(AppError::BadRequest("状态无效".to_string())),
                None => None,
            },
        };

        let pagination = query.pagination();
        let (limit, offset) = pagination.limit_offset();
        let users = self.user_repo.list(&params, limit, offset).await?;
        let total = self.user_repo.count(&params).await?;

        let items = users.iter().map(UserProfile::from).collect();
        Ok(Paged::new(items, total, &pagination))
    }

    pub async fn update(&self, id: i64, request: UpdateUserRequest) -> AppResult<UserProfile> {
        request.validate()?;

        let mut user = self
            .user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("用户不存在".to_string()))?;

        if let Some(email) = request.email {
            user.email = Some(email);
        }
        if let Some(real_name) = request.real_name {
            user.real_name = Some(real_name);
        }
        if let Some(phone) = request.phone {
            user.phone = Some(phone);
        }
        if let Some(ref role) = request.role {
            user.role =
                Role::parse(role).ok_or_else(|| AppError::BadRequest("角色无效".to_string()))?;
        }
        if let Some(ref status) = request.status {
            user.status = match status.as_str() {
                "active" => UserStatus::Active,
                "disabled" => UserStatus::Disabled,
                _ => return Err(AppError::BadRequest("状态无效".to_string())),
            };
        }

        let updated = self.user_repo.update(&user).await?;

        // Disabling an account cuts off its refresh tokens immediately.
        if updated.status == UserStatus::Disabled {
            self.session_repo
                .revoke_all_for_user(updated.id, "account disabled")
                .await?;
        }

        Ok(UserProfile::from(&updated))
    }

    pub async fn reset_password(&self, id: i64, request: ResetPasswordRequest) -> AppResult<()> {
        request.validate()?;

        if self.user_repo.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("用户不存在".to_string()));
        }

        let password_hash = hash_password(&request.new_password)?;
        self.user_repo.update_password(id, &password_hash).await?;
        self.session_repo
            .revoke_all_for_user(id, "password reset")
            .await?;
        info!(user_id = id, "password reset");
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if self.user_repo.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("用户不存在".to_string()));
        }
        self.session_repo
            .revoke_all_for_user(id, "account deleted")
            .await?;
        self.user_repo.delete(id).await?;
        info!(user_id = id, "user deleted");
        Ok(())
    }
}
