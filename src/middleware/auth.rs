use std::sync::Arc;

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use moka::future::Cache;

use crate::config::AuthConfig;
use crate::domain::Role;
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::PermissionRepository;
use crate::utils::jwt::validate_token;

/// Identity extracted from a verified access token. Handlers take this as an
/// extractor; a missing or bad token short-circuits with the session-expired
/// body before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub role: Role,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = std::future::Ready<AppResult<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        std::future::ready(extract_user(req))
    }
}

fn extract_user(req: &HttpRequest) -> AppResult<AuthenticatedUser> {
    let token = match req.headers().get(AUTHORIZATION) {
        Some(header) => match header.to_str() {
            Ok(value) => match value.strip_prefix("Bearer ") {
                Some(token) if !token.is_empty() => token,
                _ => return Err(AppError::LoginExpired),
            },
            Err(_) => return Err(AppError::LoginExpired),
        },
        None => return Err(AppError::LoginExpired),
    };

    let config = req
        .app_data::<web::Data<AuthConfig>>()
        .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("missing AuthConfig app data")))?;

    let claims = validate_token(token, config.get_ref()).map_err(|_| AppError::LoginExpired)?;
    let role = Role::parse(&claims.role).ok_or(AppError::LoginExpired)?;

    Ok(AuthenticatedUser {
        user_id: claims.sub,
        role,
    })
}

/// Role-to-permission-codes lookup with a short TTL over the database table,
/// so permission checks stay off the hot path.
pub struct PermissionCache {
    cache: Cache<Role, Arc<Vec<String>>>,
    permission_repo: Arc<dyn PermissionRepository>,
}

impl PermissionCache {
    pub fn new(permission_repo: Arc<dyn PermissionRepository>, ttl_secs: u64) -> Self {
        Self {
            cache: Cache::builder()
                .time_to_live(std::time::Duration::from_secs(ttl_secs))
                .max_capacity(16)
                .build(),
            permission_repo,
        }
    }

    pub async fn codes_for(&self, role: Role) -> AppResult<Arc<Vec<String>>> {
        if let Some(codes) = self.cache.get(&role).await {
            return Ok(codes);
        }
        let codes = Arc::new(self.permission_repo.codes_for_role(role).await?);
        self.cache.insert(role, codes.clone()).await;
        Ok(codes)
    }

    pub async fn require(&self, user: &AuthenticatedUser, permission: &str) -> AppResult<()> {
        // Admin bypasses the table entirely.
        if user.role == Role::Admin {
            return Ok(());
        }
        let codes = self.codes_for(user.role).await?;
        if codes.iter().any(|code| code == permission) {
            return Ok(());
        }
        Err(AppError::Forbidden("权限不足".to_string()))
    }

    pub async fn invalidate(&self, role: Role) {
        self.cache.invalidate(&role).await;
    }
}
