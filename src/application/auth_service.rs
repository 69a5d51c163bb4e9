use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use crate::api::dtos::{LoginRequest, LoginResponse, MeResponse, UserProfile};
use crate::config::AuthConfig;
use crate::domain::{User, UserSession, UserStatus};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::{PermissionRepository, SessionRepository, UserRepository};
use crate::utils::hash::{hash_refresh_token, verify_password};
use crate::utils::jwt::create_access_token;

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    permission_repo: Arc<dyn PermissionRepository>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        permission_repo: Arc<dyn PermissionRepository>,
        config: AuthConfig,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            permission_repo,
            config,
        }
    }

    pub async fn login(&self, request: LoginRequest, ip: Option<String>) -> AppResult<LoginResponse> {
        let account = request
            .username
            .as_deref()
            .filter(|v| !v.is_empty())
            .or(request.email.as_deref().filter(|v| !v.is_empty()))
            .ok_or_else(|| AppError::MissingFields("用户名或邮箱不能为空".to_string()))?
            .to_string();

        let password = request
            .password
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::MissingFields("密码不能为空".to_string()))?;

        if let Some(ref email) = request.email {
            if !email.is_empty() && !is_plausible_email(email) {
                return Err(AppError::InvalidEmailFormat);
            }
        }
        if password.chars().count() < 6 {
            return Err(AppError::PasswordTooShort);
        }
        if let Some(ref username) = request.username {
            let len = username.chars().count();
            if len == 0 || len > 50 {
                return Err(AppError::InvalidUsernameLength);
            }
        }

        let user = if request.username.is_some() {
            self.user_repo.find_by_username(&account).await?
        } else {
            self.user_repo.find_by_email(&account).await?
        }
        .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }
        if user.status == UserStatus::Disabled {
            return Err(AppError::Forbidden("账号已被禁用".to_string()));
        }

        let (refresh_token, _session) = self
            .issue_session(&user, Uuid::new_v4(), ip)
            .await?;
        let token = create_access_token(user.id, user.role.as_str(), &self.config)?;
        let permissions = self.permission_repo.codes_for_role(user.role).await?;

        info!(user_id = user.id, "login succeeded");
        Ok(LoginResponse {
            token,
            refresh_token,
            user: UserProfile::from(&user),
            permissions,
        })
    }

    pub async fn refresh(&self, refresh_token: &str, ip: Option<String>) -> AppResult<LoginResponse> {
        let token_hash = hash_refresh_token(refresh_token);
        let now = Utc::now();

        let session = self
            .session_repo
            .find_by_token_hash(&token_hash)
            .await?
            .ok_or(AppError::Unauthorized)?;

        // A replayed token is the signature of a stolen refresh token; the
        // whole family goes down with it.
        if session.revoked_at.is_some() {
            self.session_repo
                .revoke_family(session.family_id, "refresh token replay detected")
                .await?;
            return Err(AppError::Unauthorized);
        }

        if session.expires_at <= now {
            self.session_repo
                .revoke(session.id, "refresh token expired", None)
                .await?;
            return Err(AppError::Unauthorized);
        }

        self.session_repo.touch(session.id).await?;

        let user = self
            .user_repo
            .find_by_id(session.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if user.status == UserStatus::Disabled {
            return Err(AppError::Forbidden("账号已被禁用".to_string()));
        }

        let (new_refresh_token, replacement) = self
            .issue_session(&user, session.family_id, ip)
            .await?;
        self.session_repo
            .revoke(session.id, "rotated", Some(replacement.id))
            .await?;

        let token = create_access_token(user.id, user.role.as_str(), &self.config)?;
        let permissions = self.permission_repo.codes_for_role(user.role).await?;

        Ok(LoginResponse {
            token,
            refresh_token: new_refresh_token,
            user: UserProfile::from(&user),
            permissions,
        })
    }

    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        let token_hash = hash_refresh_token(refresh_token);
        let session = self
            .session_repo
            .find_by_token_hash(&token_hash)
            .await?
            .ok_or(AppError::Unauthorized)?;

        self.session_repo
            .revoke(session.id, "logout", None)
            .await?;
        info!(user_id = session.user_id, "logout");
        Ok(())
    }

    pub async fn me(&self, user_id: i64) -> AppResult<MeResponse> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("用户不存在".to_string()))?;
        let permissions = self.permission_repo.codes_for_role(user.role).await?;

        Ok(MeResponse {
            user: UserProfile::from(&user),
            permissions,
        })
    }

    async fn issue_session(
        &self,
        user: &User,
        family_id: Uuid,
        ip: Option<String>,
    ) -> AppResult<(String, UserSession)> {
        let refresh_token = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let session = UserSession {
            id: Uuid::new_v4(),
            user_id: user.id,
            family_id,
            refresh_token_hash: hash_refresh_token(&refresh_token),
            expires_at: now + Duration::days(self.config.refresh_token_expiration_days as i64),
            revoked_at: None,
            replaced_by: None,
            revoked_reason: None,
            created_ip: ip,
            last_seen_at: Some(now),
            created_at: now,
        };
        let created = self.session_repo.create(&session).await?;
        Ok((refresh_token, created))
    }
}

fn is_plausible_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
