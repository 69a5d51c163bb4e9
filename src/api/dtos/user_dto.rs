use serde::Deserialize;
use validator::Validate;

use super::common::{default_page, default_page_size, PaginationParams};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 50, message = "用户名长度必须在1-50字符之间"))]
    pub username: String,
    #[validate(length(min = 6, message = "密码至少6位"))]
    pub password: String,
    #[validate(email(message = "邮箱格式无效"))]
    pub email: Option<String>,
    pub real_name: Option<String>,
    pub phone: Option<String>,
    pub role: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email(message = "邮箱格式无效"))]
    pub email: Option<String>,
    pub real_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6, message = "密码至少6位"))]
    pub new_password: String,
}

// Query strings cannot use serde(flatten); pagination fields are inlined.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub search: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

impl UserListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}
