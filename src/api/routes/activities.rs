use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::api::dtos::{
    ActivityListQuery, ApiResponse, BatchCheckInRequest, CreateActivityRequest,
    CreateEvaluationRequest, CreateRegistrationRequest, EvaluationListQuery,
    ReplyEvaluationRequest, ReviewRegistrationRequest, UpdateActivityRequest,
    UpdateEvaluationRequest,
};
use crate::api::routes::AppState;
use crate::domain::Role;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthenticatedUser;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/activities")
            .route("", web::post().to(create_activity))
            .route("", web::get().to(list_activities))
            .route("/{id}", web::get().to(get_activity))
            .route("/{id}", web::put().to(update_activity))
            .route("/{id}", web::delete().to(delete_activity))
            .route("/{id}/status", web::put().to(update_status))
            .route("/{id}/registrations", web::post().to(register))
            .route("/{id}/registrations", web::get().to(list_registrations))
            .route("/{id}/registrations/stats", web::get().to(registration_stats))
            .route("/{id}/checkins", web::post().to(check_in))
            .route("/{id}/checkins/batch", web::post().to(batch_check_in))
            .route("/{id}/checkins", web::get().to(list_check_ins))
            .route("/{id}/evaluations", web::get().to(list_evaluations))
            .route("/{id}/evaluations/stats", web::get().to(evaluation_stats)),
    )
    .service(
        web::scope("/registrations").route("/{id}", web::put().to(review_registration)),
    )
    .service(
        web::scope("/evaluations")
            .route("", web::post().to(create_evaluation))
            .route("/{id}", web::put().to(update_evaluation))
            .route("/{id}", web::delete().to(delete_evaluation))
            .route("/{id}/reply", web::post().to(reply_evaluation)),
    );
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleCheckInRequest {
    pub student_id: Option<i64>,
}

async fn create_activity(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<CreateActivityRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "activity:manage").await?;
    let result = state
        .activity_service
        .create(payload.into_inner(), auth.user_id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(result, "创建成功")))
}

async fn list_activities(
    state: web::Data<AppState>,
    _auth: AuthenticatedUser,
    query: web::Query<ActivityListQuery>,
) -> AppResult<HttpResponse> {
    let result = state.activity_service.list(&query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn get_activity(
    state: web::Data<AppState>,
    _auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let result = state.activity_service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn update_activity(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<UpdateActivityRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "activity:manage").await?;
    let result = state
        .activity_service
        .update(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "更新成功")))
}

async fn update_status(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<UpdateStatusRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "activity:manage").await?;
    let status = payload
        .status
        .as_deref()
        .ok_or_else(|| AppError::MissingFields("状态不能为空".to_string()))?;
    let result = state
        .activity_service
        .update_status(path.into_inner(), status)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "更新成功")))
}

async fn delete_activity(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "activity:manage").await?;
    state.activity_service.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new((), "删除成功")))
}

async fn register(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<CreateRegistrationRequest>,
) -> AppResult<HttpResponse> {
    let result = state
        .activity_service
        .register(path.into_inner(), payload.into_inner(), auth.user_id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(result, "报名成功")))
}

async fn review_registration(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<ReviewRegistrationRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "activity:manage").await?;
    let result = state
        .activity_service
        .review_registration(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "更新成功")))
}

async fn list_registrations(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "activity:manage").await?;
    let result = state
        .activity_service
        .list_registrations(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn registration_stats(
    state: web::Data<AppState>,
    _auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let result = state
        .activity_service
        .registration_stats(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn check_in(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<SingleCheckInRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "activity:checkin").await?;
    let student_id = payload
        .student_id
        .ok_or_else(|| AppError::MissingFields("学生ID不能为空".to_string()))?;
    let result = state
        .activity_service
        .check_in(path.into_inner(), student_id, auth.user_id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(result, "签到成功")))
}

async fn batch_check_in(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<BatchCheckInRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "activity:checkin").await?;
    let result = state
        .activity_service
        .batch_check_in(path.into_inner(), payload.into_inner(), auth.user_id)
        .await?;

    // Any failed entry downgrades the batch to 207 so the client inspects
    // the per-student details.
    let response = if result.failure_count > 0 {
        HttpResponse::MultiStatus().json(ApiResponse::new(result, "部分签到成功"))
    } else {
        HttpResponse::Ok().json(ApiResponse::new(result, "签到成功"))
    };
    Ok(response)
}

async fn list_check_ins(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "activity:checkin").await?;
    let result = state
        .activity_service
        .list_check_ins(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn create_evaluation(
    state: web::Data<AppState>,
    auth: Option<AuthenticatedUser>,
    payload: web::Json<CreateEvaluationRequest>,
) -> AppResult<HttpResponse> {
    let auth = auth.ok_or(AppError::Unauthorized)?;
    let result = state
        .activity_service
        .create_evaluation(payload.into_inner(), auth.user_id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(result, "评价成功")))
}

async fn update_evaluation(
    state: web::Data<AppState>,
    auth: Option<AuthenticatedUser>,
    path: web::Path<i64>,
    payload: web::Json<UpdateEvaluationRequest>,
) -> AppResult<HttpResponse> {
    let auth = auth.ok_or(AppError::Unauthorized)?;
    let result = state
        .activity_service
        .update_evaluation(
            path.into_inner(),
            payload.into_inner(),
            auth.user_id,
            auth.role == Role::Admin,
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "更新成功")))
}

async fn delete_evaluation(
    state: web::Data<AppState>,
    auth: Option<AuthenticatedUser>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let auth = auth.ok_or(AppError::Unauthorized)?;
    state
        .activity_service
        .delete_evaluation(path.into_inner(), auth.user_id, auth.role == Role::Admin)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new((), "删除成功")))
}

async fn reply_evaluation(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<ReplyEvaluationRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "activity:manage").await?;
    let result = state
        .activity_service
        .reply_evaluation(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "回复成功")))
}

async fn list_evaluations(
    state: web::Data<AppState>,
    _auth: AuthenticatedUser,
    path: web::Path<i64>,
    query: web::Query<EvaluationListQuery>,
) -> AppResult<HttpResponse> {
    let result = state
        .activity_service
        .list_evaluations(path.into_inner(), &query)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn evaluation_stats(
    state: web::Data<AppState>,
    _auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let result = state
        .activity_service
        .evaluation_stats(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}
