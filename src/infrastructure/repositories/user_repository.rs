use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::traits::{PermissionRepository, SessionRepository, UserRepository, UserSearchParams};
use super::utils::escape_like_pattern;
use crate::domain::{Role, User, UserSession};
use crate::error::AppResult;

const USER_COLUMNS: &str = "id, username, email, password_hash, real_name, phone, role, status, created_at, updated_at";

pub struct UserRepositoryImpl {
    pool: PgPool,
}

impl UserRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_user_filters(builder: &mut QueryBuilder<'_, Postgres>, params: &UserSearchParams) {
    if let Some(ref search) = params.search {
        let pattern = format!("%{}%", escape_like_pattern(search));
        builder.push(" AND (username ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR real_name ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
    if let Some(role) = params.role {
        builder.push(" AND role = ");
        builder.push_bind(role);
    }
    if let Some(status) = params.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: &User) -> AppResult<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, real_name, phone, role, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.real_name)
        .bind(&user.phone)
        .bind(user.role)
        .bind(user.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let updated = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET email = $2, real_name = $3, phone = $4, role = $5, status = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.real_name)
        .bind(&user.phone)
        .bind(user.role)
        .bind(user.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(
        &self,
        params: &UserSearchParams,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<User>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {USER_COLUMNS} FROM users WHERE 1=1"
        ));
        push_user_filters(&mut builder, params);
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let users = builder.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(users)
    }

    async fn count(&self, params: &UserSearchParams) -> AppResult<i64> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE 1=1");
        push_user_filters(&mut builder, params);

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }
}

const SESSION_COLUMNS: &str = "id, user_id, family_id, refresh_token_hash, expires_at, revoked_at, replaced_by, revoked_reason, created_ip, last_seen_at, created_at";

pub struct SessionRepositoryImpl {
    pool: PgPool,
}

impl SessionRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SessionRepositoryImpl {
    async fn create(&self, session: &UserSession) -> AppResult<UserSession> {
        let created = sqlx::query_as::<_, UserSession>(&format!(
            r#"
            INSERT INTO user_sessions (id, user_id, family_id, refresh_token_hash, expires_at, created_ip, last_seen_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(session.id)
        .bind(session.user_id)
        .bind(session.family_id)
        .bind(&session.refresh_token_hash)
        .bind(session.expires_at)
        .bind(&session.created_ip)
        .bind(session.last_seen_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<UserSession>> {
        let session = sqlx::query_as::<_, UserSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM user_sessions WHERE refresh_token_hash = $1"
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    async fn touch(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE user_sessions SET last_seen_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn revoke(&self, id: Uuid, reason: &str, replaced_by: Option<Uuid>) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE user_sessions
            SET revoked_at = $2, revoked_reason = $3, replaced_by = $4
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .bind(reason)
        .bind(replaced_by)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn revoke_family(&self, family_id: Uuid, reason: &str) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE user_sessions
            SET revoked_at = $2, revoked_reason = $3
            WHERE family_id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(family_id)
        .bind(Utc::now())
        .bind(reason)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn revoke_all_for_user(&self, user_id: i64, reason: &str) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE user_sessions
            SET revoked_at = $2, revoked_reason = $3
            WHERE user_id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(Utc::now())
        .bind(reason)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

pub struct PermissionRepositoryImpl {
    pool: PgPool,
}

impl PermissionRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for PermissionRepositoryImpl {
    async fn codes_for_role(&self, role: Role) -> AppResult<Vec<String>> {
        let codes: Vec<String> = sqlx::query_scalar(
            "SELECT permission_code FROM role_permissions WHERE role = $1 ORDER BY permission_code",
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await?;
        Ok(codes)
    }
}
