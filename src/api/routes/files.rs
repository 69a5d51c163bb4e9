use actix_web::{web, HttpResponse};

use crate::api::dtos::{ApiResponse, FileListQuery, UploadFileRequest, UploadFilesRequest};
use crate::api::routes::AppState;
use crate::error::AppResult;
use crate::middleware::AuthenticatedUser;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/files")
            .route("", web::post().to(upload))
            .route("/batch", web::post().to(upload_batch))
            .route("", web::get().to(list_files))
            .route("/usage", web::get().to(usage))
            .route("/{id}", web::get().to(get_file))
            .route("/{id}", web::delete().to(delete_file)),
    );
}

async fn upload(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<UploadFileRequest>,
) -> AppResult<HttpResponse> {
    let result = state
        .file_service
        .upload(payload.into_inner(), auth.user_id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(result, "上传成功")))
}

async fn upload_batch(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<UploadFilesRequest>,
) -> AppResult<HttpResponse> {
    let result = state
        .file_service
        .upload_many(payload.into_inner(), auth.user_id)
        .await?;

    let response = if result.failure_count > 0 {
        HttpResponse::MultiStatus().json(ApiResponse::new(result, "部分文件上传成功"))
    } else {
        HttpResponse::Created().json(ApiResponse::new(result, "上传成功"))
    };
    Ok(response)
}

async fn list_files(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    query: web::Query<FileListQuery>,
) -> AppResult<HttpResponse> {
    let result = state.file_service.list(auth.user_id, &query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn usage(state: web::Data<AppState>, auth: AuthenticatedUser) -> AppResult<HttpResponse> {
    let result = state.file_service.usage(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn get_file(
    state: web::Data<AppState>,
    _auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let result = state.file_service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn delete_file(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state
        .file_service
        .delete(path.into_inner(), auth.user_id, auth.role)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new((), "删除成功")))
}
