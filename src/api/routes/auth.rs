use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::api::dtos::{ApiResponse, LoginRequest, LogoutRequest, RefreshRequest};
use crate::api::routes::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthenticatedUser;
use crate::security::LoginThrottle;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh))
            .route("/logout", web::post().to(logout))
            .route("/me", web::get().to(me)),
    );
}

async fn login(
    state: web::Data<AppState>,
    request: HttpRequest,
    payload: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let payload = payload.into_inner();
    let ip = client_ip(&request);
    let account = payload
        .username
        .clone()
        .or_else(|| payload.email.clone())
        .unwrap_or_default();
    let throttle_key = LoginThrottle::key(&account, ip.as_deref());

    state.login_throttle.ensure_allowed(&throttle_key)?;

    match state.auth_service.login(payload, ip).await {
        Ok(result) => {
            state.login_throttle.record_success(&throttle_key);
            Ok(HttpResponse::Ok().json(ApiResponse::new(result, "登录成功")))
        }
        // Only credential failures feed the throttle; field validation
        // errors pass through untouched.
        Err(AppError::Unauthorized) => {
            state.metrics.record_auth_failure();
            Err(state.login_throttle.record_failure(&throttle_key))
        }
        Err(err) => Err(err),
    }
}

async fn refresh(
    state: web::Data<AppState>,
    request: HttpRequest,
    payload: web::Json<RefreshRequest>,
) -> AppResult<HttpResponse> {
    payload.validate()?;
    let ip = client_ip(&request);
    let result = state
        .auth_service
        .refresh(&payload.refresh_token, ip)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "刷新成功")))
}

async fn logout(
    state: web::Data<AppState>,
    payload: web::Json<LogoutRequest>,
) -> AppResult<HttpResponse> {
    payload.validate()?;
    state.auth_service.logout(&payload.refresh_token).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new((), "退出登录成功")))
}

async fn me(state: web::Data<AppState>, auth: AuthenticatedUser) -> AppResult<HttpResponse> {
    let result = state.auth_service.me(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(result, "ok")))
}

fn client_ip(request: &HttpRequest) -> Option<String> {
    request
        .connection_info()
        .realip_remote_addr()
        .map(|addr| addr.to_string())
}
