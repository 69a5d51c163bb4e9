use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::routes::health,
        crate::api::routes::ready,
    ),
    tags(
        (name = "auth", description = "Login, token refresh and session management"),
        (name = "students", description = "Student records and class assignment"),
        (name = "classes", description = "Class roster and capacity management"),
        (name = "activities", description = "Activities, registrations, check-ins and evaluations"),
        (name = "enrollment", description = "Public enrollment applications and review"),
        (name = "marketing", description = "Campaigns, leads and advertisements"),
        (name = "system", description = "System configuration and AI model settings"),
        (name = "files", description = "File uploads and storage quota"),
        (name = "dashboard", description = "Aggregated statistics and reports"),
        (name = "health", description = "Health check endpoints"),
    ),
    info(
        title = "Kindergarten Management API",
        version = "0.1.0",
        description = "Kindergarten management backend: enrollment, activities, marketing and operations",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

pub fn configure_swagger_ui(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
