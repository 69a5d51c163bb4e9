use actix_web::{web, HttpResponse};

use crate::api::dtos::{
    ApiResponse, ApplicationListQuery, CreateApplicationRequest, ReviewApplicationRequest,
};
use crate::api::routes::AppState;
use crate::error::AppResult;
use crate::middleware::AuthenticatedUser;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/enrollment/applications")
            .route("", web::post().to(apply))
            .route("", web::get().to(list_applications))
            .route("/stats", web::get().to(stats))
            .route("/reminders", web::post().to(send_reminders))
            .route("/{id}", web::get().to(get_application))
            .route("/{id}/review", web::post().to(review))
            .route("/{id}/student", web::post().to(create_student)),
    );
}

// Applications come from the public enrollment form; no session required.
async fn apply(
    state: web::Data<AppState>,
    payload: web::Json<CreateApplicationRequest>,
) -> AppResult<HttpResponse> {
    let result = state.enrollment_service.apply(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(result, "报名申请已提交")))
}

async fn list_applications(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    query: web::Query<ApplicationListQuery>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "enrollment:review").await?;
    let result = state.enrollment_service.list(&query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn get_application(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "enrollment:review").await?;
    let result = state.enrollment_service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn review(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<ReviewApplicationRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "enrollment:review").await?;
    let result = state
        .enrollment_service
        .review(path.into_inner(), payload.into_inner(), auth.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "审核完成")))
}

async fn create_student(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "enrollment:review").await?;
    let result = state
        .enrollment_service
        .create_student(path.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(result, "学生记录已创建")))
}

async fn stats(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "enrollment:review").await?;
    let result = state.enrollment_service.stats().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn send_reminders(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "enrollment:review").await?;
    let result = state.enrollment_service.send_reminders().await?;
    let message = if result.sent_count == 0 {
        "没有符合条件的申请"
    } else {
        "提醒已发送"
    };
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, message)))
}
