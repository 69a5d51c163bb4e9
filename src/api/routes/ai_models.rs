use actix_web::{web, HttpResponse};

use crate::api::dtos::{AiResponse, SaveAiModelRequest};
use crate::api::routes::AppState;
use crate::error::AppResult;
use crate::middleware::AuthenticatedUser;

/// The AI model configuration endpoints keep the `{code, message, data}`
/// envelope their web client already speaks.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/ai-models")
            .route("", web::post().to(create_model))
            .route("", web::get().to(list_models))
            .route("/grouped", web::get().to(grouped_models))
            .route("/{id}", web::get().to(get_model))
            .route("/{id}", web::put().to(update_model))
            .route("/{id}", web::delete().to(delete_model))
            .route("/{id}/test", web::post().to(test_model)),
    );
}

async fn create_model(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<SaveAiModelRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "system:manage").await?;
    let result = state
        .system_service
        .save_ai_model(None, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(AiResponse::new(200, "创建成功", result)))
}

async fn list_models(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "system:manage").await?;
    let result = state.system_service.list_ai_models().await?;
    Ok(HttpResponse::Ok().json(AiResponse::new(200, "ok", result)))
}

async fn grouped_models(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "system:manage").await?;
    let result = state.system_service.ai_models_by_provider().await?;
    Ok(HttpResponse::Ok().json(AiResponse::new(200, "ok", result)))
}

async fn get_model(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "system:manage").await?;
    let result = state.system_service.get_ai_model(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(AiResponse::new(200, "ok", result)))
}

async fn update_model(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<SaveAiModelRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "system:manage").await?;
    let result = state
        .system_service
        .save_ai_model(Some(path.into_inner()), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(AiResponse::new(200, "更新成功", result)))
}

async fn delete_model(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "system:manage").await?;
    state
        .system_service
        .delete_ai_model(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(AiResponse::new(200, "删除成功", ())))
}

async fn test_model(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "system:manage").await?;
    let result = state.system_service.test_ai_model(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(AiResponse::new(200, "连接正常", result)))
}
