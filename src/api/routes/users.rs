use actix_web::{web, HttpResponse};

use crate::api::dtos::{
    ApiResponse, CreateUserRequest, ResetPasswordRequest, UpdateUserRequest, UserListQuery,
};
use crate::api::routes::AppState;
use crate::error::AppResult;
use crate::middleware::AuthenticatedUser;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::post().to(create_user))
            .route("", web::get().to(list_users))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}", web::put().to(update_user))
            .route("/{id}", web::delete().to(delete_user))
            .route("/{id}/reset-password", web::post().to(reset_password)),
    );
}

async fn create_user(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<CreateUserRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "user:manage").await?;
    let result = state.user_service.create(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(result, "创建成功")))
}

async fn list_users(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    query: web::Query<UserListQuery>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "user:manage").await?;
    let result = state.user_service.list(&query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn get_user(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "user:manage").await?;
    let result = state.user_service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn update_user(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let request = payload.into_inner();
    if needs_user_manage(&auth, id, &request) {
        state.permissions.require(&auth, "user:manage").await?;
    }
    let result = state.user_service.update(id, request).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "更新成功")))
}

// Anyone may edit their own profile; touching someone else's account or the
// role/status fields still takes the management permission.
fn needs_user_manage(auth: &AuthenticatedUser, target_id: i64, request: &UpdateUserRequest) -> bool {
    auth.user_id != target_id || request.role.is_some() || request.status.is_some()
}

async fn reset_password(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<ResetPasswordRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "user:manage").await?;
    state
        .user_service
        .reset_password(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new((), "密码重置成功")))
}

async fn delete_user(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "user:manage").await?;
    state.user_service.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new((), "删除成功")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn request(role: Option<&str>, status: Option<&str>) -> UpdateUserRequest {
        UpdateUserRequest {
            email: None,
            real_name: Some("李老师".to_string()),
            phone: None,
            role: role.map(String::from),
            status: status.map(String::from),
        }
    }

    #[test]
    fn own_profile_edit_skips_the_permission_check() {
        let auth = AuthenticatedUser {
            user_id: 7,
            role: Role::Teacher,
        };
        assert!(!needs_user_manage(&auth, 7, &request(None, None)));
    }

    #[test]
    fn other_accounts_and_privileged_fields_still_require_management() {
        let auth = AuthenticatedUser {
            user_id: 7,
            role: Role::Teacher,
        };
        assert!(needs_user_manage(&auth, 8, &request(None, None)));
        assert!(needs_user_manage(&auth, 7, &request(Some("admin"), None)));
        assert!(needs_user_manage(&auth, 7, &request(None, Some("disabled"))));
    }
}
