use actix_web::{web, HttpResponse};

use crate::api::dtos::{
    ApiResponse, ConfigListQuery, CreateConfigRequest, UpdateConfigRequest,
};
use crate::api::routes::AppState;
use crate::error::AppResult;
use crate::middleware::AuthenticatedUser;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/system/configs")
            .route("", web::post().to(create_config))
            .route("", web::get().to(list_configs))
            .route("/{key}", web::get().to(get_config))
            .route("/{key}", web::put().to(update_config))
            .route("/{key}", web::delete().to(delete_config)),
    );
}

async fn create_config(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<CreateConfigRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "system:manage").await?;
    let result = state
        .system_service
        .create_config(payload.into_inner(), auth.user_id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(result, "创建成功")))
}

async fn list_configs(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    query: web::Query<ConfigListQuery>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "system:manage").await?;
    let result = state.system_service.list_configs(&query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn get_config(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "system:manage").await?;
    let result = state.system_service.get_config(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn update_config(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateConfigRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "system:manage").await?;
    let result = state
        .system_service
        .update_config(&path.into_inner(), payload.into_inner(), auth.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "更新成功")))
}

async fn delete_config(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "system:manage").await?;
    state
        .system_service
        .delete_config(&path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new((), "删除成功")))
}
