use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::api::dtos::{
    AdListQuery, ApiResponse, CampaignListQuery, ConvertLeadRequest, CreateAdRequest,
    CreateCampaignRequest, CreateLeadRequest, LeadListQuery, UpdateAdRequest,
    UpdateCampaignRequest, UpdateLeadRequest,
};
use crate::api::routes::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthenticatedUser;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/marketing")
            .service(
                web::scope("/campaigns")
                    .route("", web::post().to(create_campaign))
                    .route("", web::get().to(list_campaigns))
                    .route("/stats", web::get().to(campaign_stats))
                    .route("/{id}", web::get().to(get_campaign))
                    .route("/{id}", web::put().to(update_campaign))
                    .route("/{id}", web::delete().to(delete_campaign))
                    .route("/{id}/status", web::put().to(update_campaign_status))
                    .route("/{id}/duplicate", web::post().to(duplicate_campaign)),
            )
            .service(
                web::scope("/leads")
                    .route("", web::post().to(create_lead))
                    .route("", web::get().to(list_leads))
                    .route("/{id}", web::get().to(get_lead))
                    .route("/{id}", web::put().to(update_lead))
                    .route("/{id}", web::delete().to(delete_lead))
                    .route("/{id}/convert", web::post().to(convert_lead)),
            )
            .service(
                web::scope("/ads")
                    .route("", web::post().to(create_ad))
                    .route("", web::get().to(list_ads))
                    .route("/live", web::get().to(live_ads))
                    .route("/{id}", web::put().to(update_ad))
                    .route("/{id}", web::delete().to(delete_ad)),
            ),
    );
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LiveAdsQuery {
    pub position: Option<String>,
}

async fn create_campaign(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<CreateCampaignRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "marketing:manage").await?;
    let result = state
        .marketing_service
        .create_campaign(payload.into_inner(), auth.user_id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(result, "创建成功")))
}

async fn list_campaigns(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    query: web::Query<CampaignListQuery>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "marketing:manage").await?;
    let result = state.marketing_service.list_campaigns(&query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn get_campaign(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "marketing:manage").await?;
    let result = state.marketing_service.get_campaign(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn update_campaign(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<UpdateCampaignRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "marketing:manage").await?;
    let result = state
        .marketing_service
        .update_campaign(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "更新成功")))
}

async fn update_campaign_status(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<UpdateStatusRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "marketing:manage").await?;
    let status = payload
        .status
        .as_deref()
        .ok_or_else(|| AppError::MissingFields("状态不能为空".to_string()))?;
    let result = state
        .marketing_service
        .update_campaign_status(path.into_inner(), status)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "更新成功")))
}

async fn duplicate_campaign(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "marketing:manage").await?;
    let result = state
        .marketing_service
        .duplicate_campaign(path.into_inner(), auth.user_id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(result, "复制成功")))
}

async fn delete_campaign(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "marketing:manage").await?;
    state
        .marketing_service
        .delete_campaign(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new((), "删除成功")))
}

async fn campaign_stats(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "marketing:manage").await?;
    let result = state.marketing_service.campaign_stats().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn create_lead(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<CreateLeadRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "marketing:manage").await?;
    let result = state
        .marketing_service
        .create_lead(payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(result, "创建成功")))
}

async fn list_leads(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    query: web::Query<LeadListQuery>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "marketing:manage").await?;
    let result = state.marketing_service.list_leads(&query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn get_lead(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "marketing:manage").await?;
    let result = state.marketing_service.get_lead(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn update_lead(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<UpdateLeadRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "marketing:manage").await?;
    let result = state
        .marketing_service
        .update_lead(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "更新成功")))
}

async fn convert_lead(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<ConvertLeadRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "marketing:manage").await?;
    let result = state
        .marketing_service
        .convert_lead(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "转化成功")))
}

async fn delete_lead(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "marketing:manage").await?;
    state.marketing_service.delete_lead(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new((), "删除成功")))
}

async fn create_ad(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<CreateAdRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "marketing:manage").await?;
    let result = state
        .marketing_service
        .create_ad(payload.into_inner(), auth.user_id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(result, "创建成功")))
}

async fn list_ads(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    query: web::Query<AdListQuery>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "marketing:manage").await?;
    let result = state.marketing_service.list_ads(&query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

// Public surface: the client asks for the ads live in a position right now.
async fn live_ads(
    state: web::Data<AppState>,
    query: web::Query<LiveAdsQuery>,
) -> AppResult<HttpResponse> {
    let position = query
        .position
        .as_deref()
        .ok_or_else(|| AppError::MissingFields("广告位置不能为空".to_string()))?;
    let result = state.marketing_service.live_ads(position).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

async fn update_ad(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<UpdateAdRequest>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "marketing:manage").await?;
    let result = state
        .marketing_service
        .update_ad(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "更新成功")))
}

async fn delete_ad(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.permissions.require(&auth, "marketing:manage").await?;
    state.marketing_service.delete_ad(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new((), "删除成功")))
}
