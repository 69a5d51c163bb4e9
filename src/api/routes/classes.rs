use actix_web::{web, HttpResponse};

use crate::api::dtos::{ApiResponse, ClassListQuery, CreateClassRequest, UpdateClassRequest};
use crate::api::routes::AppState;
use crate::error::AppResult;
use crate::middleware::AuthenticatedUser;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/classes")
            .route("", web::post().to(create_class))
            .route("", web::get().to(list_classes))
            .route("/{id}", web::get().to(get_class))
            .route("/{id}", web::put().to(update_class))
            .route("/{id}", web::delete().to(delete_class)),
    );
}

async fn create_class(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<CreateClassRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "class:manage").await?;
    let result = state.class_service.create(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(result, "创建成功")))
}

async fn list_classes(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    query: web::Query<ClassListQuery>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "class:read").await?;
    let result = state.class_service.list(&query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn get_class(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "class:read").await?;
    let result = state.class_service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn update_class(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<UpdateClassRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "class:manage").await?;
    let result = state
        .class_service
        .update(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "更新成功")))
}

async fn delete_class(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "class:manage").await?;
    state.class_service.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new((), "删除成功")))
}
