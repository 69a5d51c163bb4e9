use actix_web::{web, HttpResponse};

use crate::api::dtos::ApiResponse;
use crate::api::routes::AppState;
use crate::error::AppResult;
use crate::middleware::AuthenticatedUser;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dashboard")
            .route("", web::get().to(dashboard))
            .route("/enrollment-trend", web::get().to(enrollment_trend))
            .route("/class-occupancy", web::get().to(class_occupancy))
            .route("/activity-attendance", web::get().to(activity_attendance))
            .route("/campaign-performance", web::get().to(campaign_performance))
            .route("/overview", web::get().to(overview)),
    );
}

async fn dashboard(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "dashboard:read").await?;
    let result = state.dashboard_service.dashboard().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn enrollment_trend(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "dashboard:read").await?;
    let result = state.dashboard_service.enrollment_trend().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn class_occupancy(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "dashboard:read").await?;
    let result = state.dashboard_service.class_occupancy().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn activity_attendance(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "dashboard:read").await?;
    let result = state.dashboard_service.activity_attendance().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn campaign_performance(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "dashboard:read").await?;
    let result = state.dashboard_service.campaign_performance().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn overview(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "dashboard:read").await?;
    let result = state.dashboard_service.overview().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}
