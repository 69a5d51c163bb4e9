use actix_web::{web, HttpResponse};

use crate::api::dtos::{
    ApiResponse, CreateStudentRequest, StudentListQuery, UpdateStudentRequest,
};
use crate::api::routes::AppState;
use crate::error::AppResult;
use crate::middleware::AuthenticatedUser;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/students")
            .route("", web::post().to(create_student))
            .route("", web::get().to(list_students))
            .route("/{id}", web::get().to(get_student))
            .route("/{id}", web::put().to(update_student))
            .route("/{id}", web::delete().to(delete_student)),
    );
}

async fn create_student(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<CreateStudentRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "student:manage").await?;
    let result = state.student_service.create(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(result, "创建成功")))
}

async fn list_students(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    query: web::Query<StudentListQuery>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "student:read").await?;
    let result = state.student_service.list(&query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn get_student(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "student:read").await?;
    let result = state.student_service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn update_student(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<UpdateStudentRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "student:manage").await?;
    let result = state
        .student_service
        .update(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "更新成功")))
}

async fn delete_student(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "student:manage").await?;
    state.student_service.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new((), "删除成功")))
}
