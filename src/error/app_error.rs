use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    pub code: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Login expired")]
    LoginExpired,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        issues: Vec<ValidationIssue>,
    },

    #[error("Missing required fields: {0}")]
    MissingFields(String),

    #[error("Invalid email format")]
    InvalidEmailFormat,

    #[error("Password too short")]
    PasswordTooShort,

    #[error("Invalid username length")]
    InvalidUsernameLength,

    #[error("Invalid capacity: {0}")]
    InvalidCapacity(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    InternalError(#[source] anyhow::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Too many requests")]
    RateLimited,

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Insufficient storage: {0}")]
    InsufficientStorage(String),

    #[error("Service unavailable: {service}")]
    ServiceUnavailable { service: String, message: String },
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        // Session-guard failures keep the bare two-field body the web client
        // checks for before redirecting to the login page.
        if matches!(self, AppError::LoginExpired) {
            return HttpResponse::build(self.status_code()).json(serde_json::json!({
                "success": false,
                "message": self.public_message(),
            }));
        }

        let mut payload = serde_json::json!({
            "success": false,
            "error": self.error_code(),
            "message": self.public_message(),
        });

        if self.exposes_status_code() {
            payload["statusCode"] = serde_json::json!(self.status_code().as_u16());
        }

        if let Some(issues) = self.validation_issues() {
            payload["details"] =
                serde_json::to_value(issues).expect("validation issues should serialize");
        }

        HttpResponse::build(self.status_code()).json(payload)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized | AppError::LoginExpired => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::ValidationError { .. }
            | AppError::MissingFields(_)
            | AppError::InvalidEmailFormat
            | AppError::PasswordTooShort
            | AppError::InvalidUsernameLength
            | AppError::InvalidCapacity(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TokenExpired | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::InsufficientStorage(_) => StatusCode::INSUFFICIENT_STORAGE,
            AppError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DatabaseError(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized | AppError::LoginExpired => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::ValidationError { .. } => "VALIDATION_ERROR",
            AppError::MissingFields(_) => "MISSING_REQUIRED_FIELDS",
            AppError::InvalidEmailFormat => "INVALID_EMAIL_FORMAT",
            AppError::PasswordTooShort => "PASSWORD_TOO_SHORT",
            AppError::InvalidUsernameLength => "INVALID_USERNAME_LENGTH",
            AppError::InvalidCapacity(_) => "INVALID_CAPACITY",
            AppError::Conflict(_) => "CONFLICT",
            AppError::InternalError(_) => "INTERNAL_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::RateLimited => "RATE_LIMITED",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            AppError::InsufficientStorage(_) => "INSUFFICIENT_STORAGE",
            AppError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            issues: Vec::new(),
        }
    }

    // The auth endpoints emit their field-check errors without a statusCode
    // field; everything routed through the shared error helper carries it.
    fn exposes_status_code(&self) -> bool {
        !matches!(
            self,
            AppError::MissingFields(_)
                | AppError::InvalidEmailFormat
                | AppError::PasswordTooShort
                | AppError::InvalidUsernameLength
        )
    }

    pub fn public_message(&self) -> String {
        match self {
            AppError::DatabaseError(_) | AppError::InternalError(_) => {
                "服务器内部错误".to_string()
            }
            AppError::NotFound(message)
            | AppError::Forbidden(message)
            | AppError::Conflict(message)
            | AppError::BadRequest(message)
            | AppError::MissingFields(message)
            | AppError::InvalidCapacity(message)
            | AppError::PayloadTooLarge(message)
            | AppError::UnsupportedMediaType(message)
            | AppError::InsufficientStorage(message) => message.clone(),
            AppError::ValidationError { message, .. } => message.clone(),
            AppError::Unauthorized => "未授权的访问".to_string(),
            AppError::LoginExpired => "未登录或登录已过期".to_string(),
            AppError::InvalidEmailFormat => "邮箱格式无效".to_string(),
            AppError::PasswordTooShort => "密码至少6位".to_string(),
            AppError::InvalidUsernameLength => "用户名长度必须在1-50字符之间".to_string(),
            AppError::TokenExpired => "登录已过期，请重新登录".to_string(),
            AppError::InvalidToken => "无效的访问令牌".to_string(),
            AppError::RateLimited => "请求过于频繁，请稍后再试".to_string(),
            AppError::ServiceUnavailable { message, .. } => message.clone(),
        }
    }

    fn validation_issues(&self) -> Option<&[ValidationIssue]> {
        match self {
            AppError::ValidationError { issues, .. } if !issues.is_empty() => Some(issues),
            _ => None,
        }
    }
}

impl From<crate::domain::DomainError> for AppError {
    fn from(err: crate::domain::DomainError) -> Self {
        match err {
            crate::domain::DomainError::NotFound(msg) => AppError::NotFound(msg),
            crate::domain::DomainError::ValidationError(msg) => AppError::validation_error(msg),
            crate::domain::DomainError::BusinessRuleViolation(msg) => AppError::BadRequest(msg),
            crate::domain::DomainError::Conflict(msg) => AppError::Conflict(msg),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_) => AppError::ServiceUnavailable {
                service: "database".to_string(),
                message: "数据库连接失败，请稍后重试".to_string(),
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => AppError::ServiceUnavailable {
                service: "database".to_string(),
                message: "服务暂时不可用，请稍后重试".to_string(),
            },
            sqlx::Error::Database(database_error) => {
                if let Some(mapped) =
                    map_database_error(database_error.code().as_deref(), database_error.constraint())
                {
                    mapped
                } else {
                    AppError::DatabaseError(sqlx::Error::Database(database_error))
                }
            }
            other => AppError::DatabaseError(other),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut issues = Vec::new();
        collect_validation_issues(None, &err, &mut issues);
        issues.sort_by(|left, right| {
            left.field
                .cmp(&right.field)
                .then(left.code.cmp(&right.code))
        });

        let message = match issues.as_slice() {
            [issue] => issue.message.clone(),
            _ => "请求参数验证失败".to_string(),
        };

        AppError::ValidationError { message, issues }
    }
}

fn collect_validation_issues(
    prefix: Option<String>,
    errors: &ValidationErrors,
    out: &mut Vec<ValidationIssue>,
) {
    for (field, kind) in errors.errors() {
        let path = match &prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(std::borrow::Cow::to_string)
                        .unwrap_or_else(|| format!("{path} is invalid"));
                    out.push(ValidationIssue {
                        field: path.clone(),
                        message,
                        code: error.code.to_string(),
                    });
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_validation_issues(Some(path), nested, out);
            }
            ValidationErrorsKind::List(nested_items) => {
                for (index, nested) in nested_items {
                    collect_validation_issues(Some(format!("{path}[{index}]")), nested, out);
                }
            }
        }
    }
}

fn map_database_error(code: Option<&str>, constraint: Option<&str>) -> Option<AppError> {
    match code {
        Some("23505") => Some(AppError::Conflict(
            conflict_message_from_constraint(constraint).to_string(),
        )),
        Some("23503") => Some(AppError::BadRequest("引用的资源不存在".to_string())),
        Some("23502") => Some(AppError::validation_error("缺少必填字段")),
        Some("23514") => Some(AppError::validation_error("请求数据违反校验规则")),
        Some("22P02") => Some(AppError::validation_error("输入格式无效")),
        Some("08001") | Some("08006") => Some(AppError::ServiceUnavailable {
            service: "database".to_string(),
            message: "数据库连接失败，请稍后重试".to_string(),
        }),
        Some("53300") => Some(AppError::ServiceUnavailable {
            service: "database".to_string(),
            message: "服务暂时不可用，请稍后重试".to_string(),
        }),
        _ => None,
    }
}

fn conflict_message_from_constraint(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_username_key") => "用户名已存在",
        Some("users_email_key") => "邮箱已被注册",
        Some("classes_name_key") => "班级名称已存在",
        Some("system_configs_config_key_key") => "配置键已存在",
        Some("activity_checkins_activity_id_student_id_key") => "该学生已签到",
        Some("activity_registrations_activity_id_student_id_key") => "该学生已报名此活动",
        Some("activity_evaluations_activity_id_created_by_key") => "您已评价过该活动",
        Some("enrollment_applications_student_name_parent_phone_key") => "该学生已提交报名申请",
        _ => "资源已存在",
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use serde_json::Value;
    use validator::Validate;

    async fn body_json(response: HttpResponse) -> Value {
        let body = to_bytes(response.into_body())
            .await
            .expect("response body should be readable");
        serde_json::from_slice(&body).expect("response body should be valid json")
    }

    #[derive(Debug, Validate)]
    struct CapacityValidation {
        #[validate(range(min = 1, max = 50, message = "班级容量必须在1-50之间"))]
        capacity: i32,
    }

    #[actix_web::test]
    async fn validation_error_response_includes_field_details() {
        let error: AppError = CapacityValidation { capacity: 80 }
            .validate()
            .expect_err("validation should fail")
            .into();

        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "班级容量必须在1-50之间");
        assert_eq!(json["statusCode"], 400);
        assert_eq!(json["details"][0]["field"], "capacity");
        assert_eq!(json["details"][0]["code"], "range");
    }

    #[actix_web::test]
    async fn missing_fields_response_has_no_status_code_field() {
        let response = AppError::MissingFields("密码不能为空".to_string()).error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "MISSING_REQUIRED_FIELDS");
        assert_eq!(json["message"], "密码不能为空");
        assert!(json.get("statusCode").is_none());
    }

    #[actix_web::test]
    async fn login_expired_response_is_bare_two_field_body() {
        let response = AppError::LoginExpired.error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "未登录或登录已过期");
        assert!(json.get("error").is_none());
        assert!(json.get("statusCode").is_none());
    }

    #[actix_web::test]
    async fn unauthorized_response_carries_code_and_status() {
        let response = AppError::Unauthorized.error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let json = body_json(response).await;
        assert_eq!(json["error"], "UNAUTHORIZED");
        assert_eq!(json["message"], "未授权的访问");
        assert_eq!(json["statusCode"], 401);
    }

    #[actix_web::test]
    async fn bad_request_response_includes_status_code() {
        let response = AppError::BadRequest("总体评分必须在1-5之间".to_string()).error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "BAD_REQUEST");
        assert_eq!(json["message"], "总体评分必须在1-5之间");
        assert_eq!(json["statusCode"], 400);
    }

    #[test]
    fn maps_unique_constraint_violation_to_conflict_message() {
        let mapped = map_database_error(Some("23505"), Some("classes_name_key"));
        assert!(matches!(
            mapped,
            Some(AppError::Conflict(message)) if message == "班级名称已存在"
        ));
    }

    #[test]
    fn maps_checkin_constraint_to_duplicate_checkin() {
        let mapped = map_database_error(
            Some("23505"),
            Some("activity_checkins_activity_id_student_id_key"),
        );
        assert!(matches!(
            mapped,
            Some(AppError::Conflict(message)) if message == "该学生已签到"
        ));
    }

    #[test]
    fn maps_connection_error_to_service_unavailable() {
        let mapped = map_database_error(Some("08006"), None);
        assert!(matches!(
            mapped,
            Some(AppError::ServiceUnavailable { service, .. }) if service == "database"
        ));
    }

    #[test]
    fn unknown_sqlstate_maps_to_none() {
        assert!(map_database_error(Some("99999"), None).is_none());
        assert!(map_database_error(None, None).is_none());
    }

    #[test]
    fn error_code_and_status_code_cover_all_variants() {
        let cases = vec![
            (
                AppError::DatabaseError(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
            ),
            (
                AppError::NotFound("学生不存在".to_string()),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                AppError::Unauthorized,
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
            ),
            (
                AppError::LoginExpired,
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
            ),
            (
                AppError::Forbidden("权限不足".to_string()),
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
            ),
            (
                AppError::MissingFields("活动ID不能为空".to_string()),
                StatusCode::BAD_REQUEST,
                "MISSING_REQUIRED_FIELDS",
            ),
            (
                AppError::InvalidEmailFormat,
                StatusCode::BAD_REQUEST,
                "INVALID_EMAIL_FORMAT",
            ),
            (
                AppError::PasswordTooShort,
                StatusCode::BAD_REQUEST,
                "PASSWORD_TOO_SHORT",
            ),
            (
                AppError::InvalidUsernameLength,
                StatusCode::BAD_REQUEST,
                "INVALID_USERNAME_LENGTH",
            ),
            (
                AppError::InvalidCapacity("班级容量必须在1-50之间".to_string()),
                StatusCode::BAD_REQUEST,
                "INVALID_CAPACITY",
            ),
            (
                AppError::Conflict("配置键已存在".to_string()),
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                AppError::InternalError(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
            (
                AppError::BadRequest("无效的参数".to_string()),
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
            ),
            (
                AppError::TokenExpired,
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
            ),
            (
                AppError::InvalidToken,
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
            ),
            (
                AppError::RateLimited,
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
            ),
            (
                AppError::PayloadTooLarge("文件大小超出限制".to_string()),
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
            ),
            (
                AppError::UnsupportedMediaType("不支持的文件类型".to_string()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
            ),
            (
                AppError::InsufficientStorage("存储空间不足".to_string()),
                StatusCode::INSUFFICIENT_STORAGE,
                "INSUFFICIENT_STORAGE",
            ),
            (
                AppError::ServiceUnavailable {
                    service: "database".to_string(),
                    message: "down".to_string(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
            ),
        ];

        for (error, status, code) in cases {
            assert_eq!(error.status_code(), status);
            assert_eq!(error.error_code(), code);
        }
    }

    #[test]
    fn public_message_hides_internal_errors() {
        let internal_db = AppError::DatabaseError(sqlx::Error::RowNotFound);
        assert_eq!(internal_db.public_message(), "服务器内部错误");

        let internal_anyhow = AppError::InternalError(anyhow::anyhow!("sensitive details"));
        assert_eq!(internal_anyhow.public_message(), "服务器内部错误");
    }

    #[test]
    fn from_domain_error_maps_all_variants() {
        let not_found: AppError =
            crate::domain::DomainError::NotFound("学生不存在".to_string()).into();
        assert!(matches!(not_found, AppError::NotFound(message) if message == "学生不存在"));

        let validation: AppError =
            crate::domain::DomainError::ValidationError("无效".to_string()).into();
        assert!(matches!(
            validation,
            AppError::ValidationError { message, .. } if message == "无效"
        ));

        let business: AppError =
            crate::domain::DomainError::BusinessRuleViolation("名额已满".to_string()).into();
        assert!(matches!(business, AppError::BadRequest(message) if message == "名额已满"));

        let conflict: AppError = crate::domain::DomainError::Conflict("重复".to_string()).into();
        assert!(matches!(conflict, AppError::Conflict(message) if message == "重复"));
    }

    #[test]
    fn from_jsonwebtoken_error_maps_expired_and_non_expired() {
        let expired =
            jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::ExpiredSignature);
        assert!(matches!(AppError::from(expired), AppError::TokenExpired));

        let invalid =
            jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::InvalidSignature);
        assert!(matches!(AppError::from(invalid), AppError::InvalidToken));
    }
}
