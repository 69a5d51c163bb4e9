use std::sync::Arc;
use std::time::Instant;

use actix_web::dev::Service as _;
use actix_web::{middleware::Logger, web, App, HttpServer};
use kindergarten_backend::api::openapi::configure_swagger_ui;
use kindergarten_backend::api::routes::{self, AppState};
use kindergarten_backend::application::{
    ActivityService, AuthService, ClassService, DashboardService, EnrollmentService, FileService,
    MarketingService, StudentService, SystemService, UserService,
};
use kindergarten_backend::config::AppConfig;
use kindergarten_backend::infrastructure::db::{migrations::run_migrations, pool::create_pool};
use kindergarten_backend::infrastructure::repositories::{
    ActivityRepositoryImpl, AdvertisementRepositoryImpl, AiModelRepositoryImpl,
    CampaignRepositoryImpl, CheckInRepositoryImpl, ClassRepositoryImpl, EnrollmentRepositoryImpl,
    EvaluationRepositoryImpl, FileRepositoryImpl, LeadRepositoryImpl, PermissionRepositoryImpl,
    RegistrationRepositoryImpl, SessionRepositoryImpl, StatsRepositoryImpl, StudentRepositoryImpl,
    SystemConfigRepositoryImpl, UserRepositoryImpl,
};
use kindergarten_backend::middleware::request_logging::{
    create_request_span, get_client_ip, get_status_class, get_user_agent,
};
use kindergarten_backend::middleware::PermissionCache;
use kindergarten_backend::observability::error_tracking::capture_unexpected_5xx;
use kindergarten_backend::observability::AppMetrics;
use kindergarten_backend::security::{cors_middleware, security_headers, LoginThrottle};
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().expect("failed to load application configuration");

    let registry = tracing_subscriber::registry().with(EnvFilter::new(config.logging.level.clone()));
    if config.logging.json_format {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .init();
    } else {
        registry.with(fmt::layer()).init();
    }

    let pool = create_pool(&config.database)
        .await
        .expect("failed to create database pool");

    run_migrations(&pool)
        .await
        .expect("database migrations failed");

    let user_repo = Arc::new(UserRepositoryImpl::new(pool.clone()));
    let session_repo = Arc::new(SessionRepositoryImpl::new(pool.clone()));
    let permission_repo = Arc::new(PermissionRepositoryImpl::new(pool.clone()));
    let student_repo = Arc::new(StudentRepositoryImpl::new(pool.clone()));
    let class_repo = Arc::new(ClassRepositoryImpl::new(pool.clone()));
    let activity_repo = Arc::new(ActivityRepositoryImpl::new(pool.clone()));
    let registration_repo = Arc::new(RegistrationRepositoryImpl::new(pool.clone()));
    let checkin_repo = Arc::new(CheckInRepositoryImpl::new(pool.clone()));
    let evaluation_repo = Arc::new(EvaluationRepositoryImpl::new(pool.clone()));
    let enrollment_repo = Arc::new(EnrollmentRepositoryImpl::new(pool.clone()));
    let campaign_repo = Arc::new(CampaignRepositoryImpl::new(pool.clone()));
    let lead_repo = Arc::new(LeadRepositoryImpl::new(pool.clone()));
    let ad_repo = Arc::new(AdvertisementRepositoryImpl::new(pool.clone()));
    let config_repo = Arc::new(SystemConfigRepositoryImpl::new(pool.clone()));
    let ai_model_repo = Arc::new(AiModelRepositoryImpl::new(pool.clone()));
    let file_repo = Arc::new(FileRepositoryImpl::new(pool.clone()));
    let stats_repo = Arc::new(StatsRepositoryImpl::new(pool.clone()));

    let state = AppState {
        auth_service: Arc::new(AuthService::new(
            user_repo.clone(),
            session_repo.clone(),
            permission_repo.clone(),
            config.auth.clone(),
        )),
        user_service: Arc::new(UserService::new(user_repo.clone(), session_repo.clone())),
        student_service: Arc::new(StudentService::new(
            student_repo.clone(),
            class_repo.clone(),
        )),
        class_service: Arc::new(ClassService::new(class_repo.clone(), student_repo.clone())),
        activity_service: Arc::new(ActivityService::new(
            activity_repo.clone(),
            registration_repo,
            checkin_repo,
            evaluation_repo,
            student_repo.clone(),
        )),
        enrollment_service: Arc::new(EnrollmentService::new(
            enrollment_repo,
            student_repo.clone(),
            class_repo.clone(),
            config_repo.clone(),
        )),
        marketing_service: Arc::new(MarketingService::new(
            campaign_repo,
            lead_repo,
            ad_repo,
            student_repo,
        )),
        system_service: Arc::new(SystemService::new(config_repo, ai_model_repo)),
        file_service: Arc::new(FileService::new(file_repo, config.storage.clone())),
        dashboard_service: Arc::new(DashboardService::new(stats_repo, activity_repo)),
        security: config.security.clone(),
        login_throttle: Arc::new(LoginThrottle::new(&config.security)),
        permissions: Arc::new(PermissionCache::new(
            permission_repo,
            config.security.permission_cache_ttl_secs,
        )),
        metrics: Arc::new(AppMetrics::default()),
        db_pool: pool.clone(),
        app_environment: config.app.environment.clone(),
    };

    let bind_host = config.app.host.clone();
    let bind_port = config.app.port;
    let security_config = config.security.clone();
    let auth_config = config.auth.clone();
    let metrics = state.metrics.clone();

    info!(host = %bind_host, port = bind_port, "starting server");

    HttpServer::new(move || {
        let metrics = metrics.clone();
        App::new()
            .wrap(Logger::default())
            .wrap_fn(move |req, srv| {
                let request_id = Uuid::new_v4().to_string();
                let path = req.path().to_string();
                let method = req.method().to_string();
                let client_ip = get_client_ip(&req);
                let user_agent = get_user_agent(&req);
                let span = create_request_span(&request_id, &method, &path, &client_ip, &user_agent);
                let metrics = metrics.clone();
                let start = Instant::now();

                let fut = tracing::Instrument::instrument(srv.call(req), span);
                async move {
                    match fut.await {
                        Ok(mut response) => {
                            response.headers_mut().insert(
                                actix_web::http::header::HeaderName::from_static("x-request-id"),
                                actix_web::http::header::HeaderValue::from_str(&request_id)
                                    .unwrap_or_else(|_| {
                                        actix_web::http::header::HeaderValue::from_static(
                                            "invalid-request-id",
                                        )
                                    }),
                            );

                            let status = response.status().as_u16();
                            let latency_ms = start.elapsed().as_millis() as u64;
                            metrics.record_request(status, latency_ms);

                            info!(
                                request_id = %request_id,
                                method = %method,
                                path = %path,
                                status = status,
                                status_class = get_status_class(status),
                                latency_ms = latency_ms,
                                "request completed"
                            );

                            if status >= 500 {
                                let _ = capture_unexpected_5xx(&path, &method, status, &request_id);
                            }
                            Ok(response)
                        }
                        Err(error) => Err(error),
                    }
                }
            })
            .wrap(cors_middleware(&security_config))
            .wrap(security_headers())
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(auth_config.clone()))
            .configure(routes::configure)
            .configure(configure_swagger_ui)
    })
    .bind((bind_host, bind_port))?
    .run()
    .await
}
